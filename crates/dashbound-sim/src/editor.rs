use dashbound_core::TileId;
use dashbound_core::tiles::{BOXES, TileBox};

use crate::error::SimError;
use crate::simulation::Simulation;

/// The box a tile belongs to, if any.
fn box_of(tile: Option<TileId>) -> Option<&'static TileBox> {
    let tile = tile?;
    BOXES.iter().copied().find(|b| b.contains(tile))
}

/// In-game level editing state. The simulation is paused while editing.
#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    enabled: bool,
    selected: Option<TileId>,
    active_box: Option<&'static TileBox>,
}

impl EditorSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip editing on or off, pausing or resuming `sim` to match.
    pub fn toggle(&mut self, sim: &mut Simulation) -> bool {
        self.enabled = !self.enabled;
        if self.enabled {
            sim.pause();
        } else {
            sim.resume();
        }
        tracing::info!(enabled = self.enabled, "editor toggled");
        self.enabled
    }

    /// Choose the brush. `None` erases. Picking a box member makes that box
    /// the active one; other tiles leave the active box unchanged.
    pub fn select_tile(&mut self, tile: Option<TileId>) {
        self.selected = tile;
        if let Some(tile_box) = box_of(tile) {
            self.active_box = Some(tile_box);
        }
    }

    pub fn selected_tile(&self) -> Option<TileId> {
        self.selected
    }

    pub fn active_box(&self) -> Option<&'static TileBox> {
        self.active_box
    }

    /// Paint the selected tile at `(x, y)` and re-tile the affected boxes.
    ///
    /// Painting a box member writes the box's fill tile; auto-tiling then
    /// picks the right edge variant. Does nothing while the editor is off.
    pub fn paint(&self, sim: &mut Simulation, x: u32, y: u32) -> Result<bool, SimError> {
        if !self.enabled {
            return Ok(false);
        }

        let new_box = box_of(self.selected);
        let tile = new_box.map(|b| b.fill).or(self.selected);
        let previous = sim.edit_tile(x, y, tile)?;

        let painted = new_box.or(self.active_box);
        if let Some(b) = painted {
            sim.auto_tile_box(b);
        }
        match box_of(previous) {
            Some(old) if painted.is_none_or(|b| b.name != old.name) => {
                sim.auto_tile_box(old);
            },
            _ => {},
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use dashbound_core::Level;
    use dashbound_core::tiles::{DEFAULT_BOX, HAZARD_BOX};

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default(), Level::empty(8, 8).unwrap())
    }

    #[test]
    fn toggle_pauses_simulation() {
        let mut s = sim();
        let mut editor = EditorSession::new();
        assert!(editor.toggle(&mut s));
        assert!(s.is_paused());
        assert_eq!(s.step(1000.0), 0);
        assert!(!editor.toggle(&mut s));
        assert!(!s.is_paused());
    }

    #[test]
    fn paint_is_ignored_when_disabled() {
        let mut s = sim();
        let mut editor = EditorSession::new();
        editor.select_tile(Some(TileId::BOUNCE_PAD));
        assert!(!editor.paint(&mut s, 1, 1).unwrap());
        assert_eq!(s.level().tile_at(1, 1), None);
    }

    #[test]
    fn select_tracks_active_box() {
        let mut editor = EditorSession::new();
        editor.select_tile(Some(HAZARD_BOX.top));
        assert_eq!(editor.active_box().map(|b| b.name), Some("hazard"));
        editor.select_tile(Some(TileId::BOUNCE_PAD));
        assert_eq!(editor.active_box().map(|b| b.name), Some("hazard"));
        editor.select_tile(None);
        assert_eq!(editor.selected_tile(), None);
    }

    #[test]
    fn painting_box_tiles_auto_tiles_edges() {
        let mut s = sim();
        let mut editor = EditorSession::new();
        editor.toggle(&mut s);
        editor.select_tile(Some(DEFAULT_BOX.fill));
        for x in 2..5 {
            for y in 2..5 {
                assert!(editor.paint(&mut s, x, y).unwrap());
            }
        }
        let level = s.level();
        assert_eq!(level.tile_at(3, 3), Some(DEFAULT_BOX.fill));
        assert_eq!(level.tile_at(3, 2), Some(DEFAULT_BOX.top));
        assert_eq!(level.tile_at(2, 2), Some(DEFAULT_BOX.corner_top_left));
        assert_eq!(level.tile_at(4, 4), Some(DEFAULT_BOX.corner_bottom_right));
    }

    #[test]
    fn erasing_retiles_the_old_box() {
        let mut s = sim();
        let mut editor = EditorSession::new();
        editor.toggle(&mut s);
        editor.select_tile(Some(DEFAULT_BOX.fill));
        for x in 2..5 {
            for y in 2..5 {
                editor.paint(&mut s, x, y).unwrap();
            }
        }
        // Removing the top row turns the middle row into the new top.
        editor.select_tile(None);
        for x in 2..5 {
            editor.paint(&mut s, x, 2).unwrap();
        }
        assert_eq!(s.level().tile_at(3, 3), Some(DEFAULT_BOX.top));
        assert_eq!(s.level().tile_at(2, 3), Some(DEFAULT_BOX.corner_top_left));
    }

    #[test]
    fn paint_out_of_bounds_is_an_error() {
        let mut s = sim();
        let mut editor = EditorSession::new();
        editor.toggle(&mut s);
        editor.select_tile(Some(TileId::BOUNCE_PAD));
        assert!(editor.paint(&mut s, 99, 0).is_err());
    }
}
