use glam::DVec2;

use dashbound_core::{Level, TileType};

use crate::config::PhysicsConfig;
use crate::player::Player;

/// Sampling offset past the leading edge so that flush contact counts as contact.
const TOUCH: f64 = 1e-9;
/// Lateral samples sit this far inside the box corners, so resting on a
/// floor does not register as touching a wall and vice versa.
const SAMPLE_INSET: f64 = 1e-3;

/// What the player ran into during one movement resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contacts {
    pub left: bool,
    pub right: bool,
    pub floor: bool,
    pub ceiling: bool,
    /// A `Death` sample was hit; resolution stopped at that sub-step.
    pub death: bool,
    /// A `Jump` sample launched the player.
    pub bounced: bool,
}

fn cell(v: f64) -> i64 {
    v.floor() as i64
}

/// Sample coordinates along one box edge spanning `[start, start + len]`,
/// at most one tile apart and inset from both corners.
fn edge_samples(start: f64, len: f64) -> impl Iterator<Item = f64> {
    let first = start + SAMPLE_INSET;
    let span = (len - 2.0 * SAMPLE_INSET).max(0.0);
    let gaps = (span.ceil() as u32).max(1);
    (0..=gaps).map(move |i| first + span * i as f64 / gaps as f64)
}

#[derive(Default)]
struct Touched {
    blocking: bool,
    death: bool,
    jump: bool,
}

impl Touched {
    fn record(&mut self, tile: TileType) {
        match tile {
            TileType::Blocking => self.blocking = true,
            TileType::Death => self.death = true,
            TileType::Jump => self.jump = true,
            TileType::None | TileType::Background => {},
        }
    }
}

/// Move the player by its velocity, split into sub-steps no longer than
/// `movement_step` so nothing thinner than a tile can be skipped.
///
/// Each sub-step moves x first, then y from the resolved x. A blocked axis
/// leaves the box flush against the blocking cell. Velocity is only touched
/// by bounce pads here; zeroing after wall/floor hits is the caller's job.
pub fn resolve_movement(player: &mut Player, level: &Level, cfg: &PhysicsConfig) -> Contacts {
    let mut contacts = Contacts::default();
    let speed = player.velocity.length();
    if speed == 0.0 || !speed.is_finite() {
        return contacts;
    }

    let max_step = if cfg.movement_step > 0.0 {
        cfg.movement_step
    } else {
        crate::config::MOVEMENT_STEP
    };
    let steps = ((speed / max_step).ceil() as u64).max(1);
    let (w, h) = (cfg.player_width, cfg.player_height);

    for _ in 0..steps {
        let delta: DVec2 = player.velocity / steps as f64;
        let mut sub_step = Touched::default();

        if delta.x != 0.0 {
            let old_x = player.position.x;
            let new_x = old_x + delta.x;
            let column = if delta.x > 0.0 {
                cell(new_x + w)
            } else {
                cell(new_x - TOUCH)
            };

            let mut axis = Touched::default();
            for sy in edge_samples(player.position.y, h) {
                axis.record(level.collision_type_at(column, cell(sy)));
            }

            if axis.blocking {
                if delta.x > 0.0 {
                    player.position.x = (column as f64 - w).clamp(old_x, new_x);
                    contacts.right = true;
                } else {
                    player.position.x = ((column + 1) as f64).clamp(new_x, old_x);
                    contacts.left = true;
                }
            } else {
                player.position.x = new_x;
            }
            sub_step.death |= axis.death;
            sub_step.jump |= axis.jump;
        }

        if delta.y != 0.0 {
            let old_y = player.position.y;
            let new_y = old_y + delta.y;
            let row = if delta.y > 0.0 {
                cell(new_y + h)
            } else {
                cell(new_y - TOUCH)
            };

            let mut axis = Touched::default();
            for sx in edge_samples(player.position.x, w) {
                axis.record(level.collision_type_at(cell(sx), row));
            }

            if axis.blocking {
                if delta.y > 0.0 {
                    player.position.y = (row as f64 - h).clamp(old_y, new_y);
                    contacts.floor = true;
                } else {
                    player.position.y = ((row + 1) as f64).clamp(new_y, old_y);
                    contacts.ceiling = true;
                }
            } else {
                player.position.y = new_y;
            }
            sub_step.death |= axis.death;
            sub_step.jump |= axis.jump;
        }

        if sub_step.death {
            contacts.death = true;
            break;
        }
        if sub_step.jump {
            player.velocity.y = player.velocity.y.min(-cfg.bounce_velocity);
            player.has_dash_ability = true;
            contacts.bounced = true;
        }
    }

    contacts
}
