use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::tiles::{DEFAULT_BOX, TileBox, TileId, TileType};

/// Width of the built-in level, in tiles.
pub const DEFAULT_LEVEL_WIDTH: u32 = 200;
/// Height of the built-in level, in tiles.
pub const DEFAULT_LEVEL_HEIGHT: u32 = 50;
/// Where the player appears in the built-in level (top-left of its box, tile units).
pub const DEFAULT_SPAWN: (f64, f64) = (20.0, 2.0);

/// One scrolling background layer. Rendering-only; the core stores and
/// returns it untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxLayer {
    pub sprite_offset: (u32, u32),
    /// 0.0 = fixed to the screen, 1.0 = moves with the tiles.
    pub scroll_factor: f64,
}

/// Background colour and parallax layers drawn behind the tile grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Backdrop {
    pub color: [u8; 3],
    pub parallax: Vec<ParallaxLayer>,
}

impl Default for Backdrop {
    fn default() -> Self {
        Self {
            color: [28, 24, 44],
            parallax: Vec::new(),
        }
    }
}

/// A grid of optional tile references, stored column-major
/// (`x * height + y`), plus backdrop metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LevelData", into = "LevelData")]
pub struct Level {
    width: u32,
    height: u32,
    cells: Vec<Option<TileId>>,
    backdrop: Backdrop,
}

/// Persisted shape of a level: one vector per column.
#[derive(Serialize, Deserialize)]
struct LevelData {
    columns: Vec<Vec<Option<TileId>>>,
    #[serde(default)]
    backdrop: Backdrop,
}

impl TryFrom<LevelData> for Level {
    type Error = CoreError;

    fn try_from(data: LevelData) -> Result<Self, Self::Error> {
        let mut level = Level::from_columns(data.columns)?;
        level.backdrop = data.backdrop;
        Ok(level)
    }
}

impl From<Level> for LevelData {
    fn from(level: Level) -> Self {
        LevelData {
            columns: level.columns().map(<[_]>::to_vec).collect(),
            backdrop: level.backdrop,
        }
    }
}

impl Level {
    /// A level with every cell empty.
    pub fn empty(width: u32, height: u32) -> Result<Self, CoreError> {
        Self::filled(width, height, None)
    }

    /// A level with every cell set to `tile`. Both dimensions must be
    /// non-zero.
    pub fn filled(width: u32, height: u32, tile: Option<TileId>) -> Result<Self, CoreError> {
        if width == 0 || height == 0 {
            return Err(CoreError::EmptyGrid);
        }
        Ok(Self::blank(width, height, tile))
    }

    /// Caller guarantees non-zero dimensions.
    fn blank(width: u32, height: u32, tile: Option<TileId>) -> Self {
        Self {
            width,
            height,
            cells: vec![tile; width as usize * height as usize],
            backdrop: Backdrop::default(),
        }
    }

    /// Build a level from column vectors (`columns[x][y]`). Every column must
    /// have the same, non-zero height.
    pub fn from_columns(columns: Vec<Vec<Option<TileId>>>) -> Result<Self, CoreError> {
        let height = columns.first().map_or(0, Vec::len);
        if height == 0 {
            return Err(CoreError::EmptyGrid);
        }
        if let Some((column, found)) = columns
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != height)
        {
            return Err(CoreError::RaggedGrid {
                column,
                expected: height,
                found,
            });
        }

        Ok(Self {
            width: columns.len() as u32,
            height: height as u32,
            cells: columns.into_iter().flatten().collect(),
            backdrop: Backdrop::default(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn set_backdrop(&mut self, backdrop: Backdrop) {
        self.backdrop = backdrop;
    }

    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    fn index(&self, x: u32, y: u32) -> usize {
        x as usize * self.height as usize + y as usize
    }

    /// The tile at a cell, or `None` for empty and off-grid cells.
    pub fn tile_at(&self, x: i64, y: i64) -> Option<TileId> {
        if !self.contains(x, y) {
            return None;
        }
        self.cells[self.index(x as u32, y as u32)]
    }

    /// Collision view of a cell: off-grid cells are an implicit wall.
    pub fn collision_type_at(&self, x: i64, y: i64) -> TileType {
        if !self.contains(x, y) {
            return TileType::Blocking;
        }
        crate::tiles::classify(self.cells[self.index(x as u32, y as u32)])
    }

    /// Replace a cell, returning what was there before.
    pub fn set_tile(
        &mut self,
        x: u32,
        y: u32,
        tile: Option<TileId>,
    ) -> Result<Option<TileId>, CoreError> {
        if x >= self.width || y >= self.height {
            return Err(CoreError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width: self.width,
                height: self.height,
            });
        }
        let idx = self.index(x, y);
        Ok(std::mem::replace(&mut self.cells[idx], tile))
    }

    /// Columns in x order, each `height` cells tall.
    pub fn columns(&self) -> impl Iterator<Item = &[Option<TileId>]> {
        self.cells.chunks(self.height.max(1) as usize)
    }

    /// Cells of row `y` in x order. Empty when `y` is off the grid.
    pub fn row(&self, y: u32) -> impl Iterator<Item = Option<TileId>> + '_ {
        let width = if y < self.height { self.width } else { 0 };
        (0..width).map(move |x| self.cells[self.index(x, y)])
    }

    /// Fill a rectangle with `tile_box.fill`, clipped to the grid. Run
    /// [`Level::auto_tile_box`] afterwards to fix up edges.
    pub fn fill_box(&mut self, tile_box: &TileBox, x: u32, y: u32, width: u32, height: u32) {
        let x_end = x.saturating_add(width).min(self.width);
        let y_end = y.saturating_add(height).min(self.height);
        for cx in x..x_end {
            for cy in y..y_end {
                let idx = self.index(cx, cy);
                self.cells[idx] = Some(tile_box.fill);
            }
        }
    }

    /// Per-cell membership mask for `tile_box`, same layout as `cells`.
    fn box_mask(&self, tile_box: &TileBox) -> Vec<bool> {
        self.cells
            .iter()
            .map(|cell| cell.is_some_and(|id| tile_box.contains(id)))
            .collect()
    }

    /// Coordinates of every cell holding a member of `tile_box`, x-major.
    pub fn cells_of_box<'a>(
        &'a self,
        tile_box: &'a TileBox,
    ) -> impl Iterator<Item = (u32, u32)> + 'a {
        let height = self.height.max(1);
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.is_some_and(|id| tile_box.contains(id))
                .then(|| (idx as u32 / height, idx as u32 % height))
        })
    }

    /// Number of cells currently holding a member of `tile_box`.
    pub fn count_box_cells(&self, tile_box: &TileBox) -> usize {
        self.cells_of_box(tile_box).count()
    }

    /// Recompute the edge/corner variant of every cell belonging to
    /// `tile_box`. Membership is taken from the grid as it is now; every
    /// variant is itself a member, so re-running without edits is a no-op.
    ///
    /// Returns the number of cells whose tile changed.
    pub fn auto_tile_box(&mut self, tile_box: &TileBox) -> usize {
        let mask = self.box_mask(tile_box);
        let (width, height) = (self.width as i64, self.height as i64);
        let is_member = |x: i64, y: i64| {
            x >= 0 && y >= 0 && x < width && y < height && mask[(x * height + y) as usize]
        };

        let mut changed = 0;
        for x in 0..width {
            for y in 0..height {
                if !is_member(x, y) {
                    continue;
                }
                let variant = tile_box.select_variant(|dx, dy| is_member(x + dx, y + dy));
                let idx = (x * height + y) as usize;
                if self.cells[idx] != Some(variant) {
                    self.cells[idx] = Some(variant);
                    changed += 1;
                }
            }
        }

        tracing::debug!(tile_box = tile_box.name, changed, "auto-tiled box");
        changed
    }
}

/// The built-in 200x50 level: background everywhere, nine default-box
/// platforms, edges auto-tiled.
pub fn default_level() -> Level {
    let mut level = Level::blank(
        DEFAULT_LEVEL_WIDTH,
        DEFAULT_LEVEL_HEIGHT,
        Some(TileId::BACKGROUND),
    );

    const PLATFORMS: [(u32, u32, u32, u32); 9] = [
        (20, 40, 14, 3),
        (24, 36, 6, 10),
        (22, 33, 6, 3),
        (36, 28, 4, 3),
        (40, 26, 6, 6),
        (52, 44, 12, 3),
        (60, 12, 6, 3),
        (75, 30, 22, 3),
        (107, 10, 4, 35),
    ];
    for (x, y, w, h) in PLATFORMS {
        level.fill_box(&DEFAULT_BOX, x, y, w, h);
    }
    level.auto_tile_box(&DEFAULT_BOX);
    level
}
