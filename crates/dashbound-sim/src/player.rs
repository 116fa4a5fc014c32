use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Facing {
    Left,
    #[default]
    Right,
}

impl Facing {
    /// -1.0 for left, 1.0 for right.
    pub fn sign(self) -> f64 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    /// Facing implied by a horizontal component, if it has one.
    pub fn from_x(x: f64) -> Option<Self> {
        if x < 0.0 {
            Some(Facing::Left)
        } else if x > 0.0 {
            Some(Facing::Right)
        } else {
            None
        }
    }
}

/// What the player is doing this tick. Walking, airborne and wall contact
/// are all `Free`; they differ only in contact counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Motion {
    Free,
    /// Mid-dash. `ticks_left == 1` on the final dash tick.
    Dashing { ticks_left: u32 },
    /// Death animation running; respawn once `progress` reaches 1.
    Dead { progress: f64 },
}

impl Motion {
    /// Start-of-tick countdown: a dash whose counter runs out becomes `Free`.
    pub fn begin_tick(self) -> Self {
        match self {
            Motion::Dashing { ticks_left } if ticks_left <= 1 => Motion::Free,
            Motion::Dashing { ticks_left } => Motion::Dashing {
                ticks_left: ticks_left - 1,
            },
            other => other,
        }
    }

    /// Advance the death animation. `None` once it has finished.
    pub fn advance_death(self, increment: f64) -> Option<Self> {
        match self {
            Motion::Dead { progress } => {
                let progress = progress + increment;
                (progress < 1.0).then_some(Motion::Dead { progress })
            },
            other => Some(other),
        }
    }
}

/// One decorative afterimage left behind by a dash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrailSample {
    pub facing: Facing,
    pub position: DVec2,
    pub opacity: f64,
}

/// Simulation state of the player. Owned by the simulation; renderers get
/// it through `&Player`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Top-left of the collision box, tile units.
    pub position: DVec2,
    /// Tiles per tick.
    pub velocity: DVec2,
    pub facing: Facing,
    pub motion: Motion,
    pub has_dash_ability: bool,
    pub dash_trail: Vec<TrailSample>,
    pub jump_ticks_remaining: u32,
    pub ticks_touching_floor: u32,
    pub wall_contact_ticks_left: u32,
    pub wall_contact_ticks_right: u32,
}

impl Player {
    /// Fresh player at `position`: at rest, facing right, dash available.
    pub fn spawn(position: DVec2) -> Self {
        Self {
            position,
            velocity: DVec2::ZERO,
            facing: Facing::Right,
            motion: Motion::Free,
            has_dash_ability: true,
            dash_trail: Vec::new(),
            jump_ticks_remaining: 0,
            ticks_touching_floor: 0,
            wall_contact_ticks_left: 0,
            wall_contact_ticks_right: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        matches!(self.motion, Motion::Dead { .. })
    }

    pub fn is_dashing(&self) -> bool {
        matches!(self.motion, Motion::Dashing { .. })
    }

    /// 0.0 while alive.
    pub fn death_progress(&self) -> f64 {
        match self.motion {
            Motion::Dead { progress } => progress,
            _ => 0.0,
        }
    }

    pub fn dash_ticks_remaining(&self) -> u32 {
        match self.motion {
            Motion::Dashing { ticks_left } => ticks_left,
            _ => 0,
        }
    }

    pub fn on_floor(&self) -> bool {
        self.ticks_touching_floor > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_is_at_rest_with_dash() {
        let p = Player::spawn(DVec2::new(20.0, 2.0));
        assert_eq!(p.velocity, DVec2::ZERO);
        assert!(p.has_dash_ability);
        assert!(!p.is_dead());
        assert_eq!(p.death_progress(), 0.0);
        assert_eq!(p.dash_ticks_remaining(), 0);
    }

    #[test]
    fn dash_countdown_ends_free() {
        let m = Motion::Dashing { ticks_left: 2 }.begin_tick();
        assert_eq!(m, Motion::Dashing { ticks_left: 1 });
        assert_eq!(m.begin_tick(), Motion::Free);
        assert_eq!(Motion::Free.begin_tick(), Motion::Free);
    }

    #[test]
    fn death_advances_until_done() {
        let m = Motion::Dead { progress: 0.5 };
        assert_eq!(m.begin_tick(), m);
        assert_eq!(m.advance_death(0.25), Some(Motion::Dead { progress: 0.75 }));
        assert_eq!(m.advance_death(0.5), None);
        assert_eq!(Motion::Free.advance_death(0.5), Some(Motion::Free));
    }

    #[test]
    fn facing_from_x() {
        assert_eq!(Facing::from_x(-0.1), Some(Facing::Left));
        assert_eq!(Facing::from_x(0.0), None);
        assert_eq!(Facing::Left.sign(), -1.0);
    }
}
