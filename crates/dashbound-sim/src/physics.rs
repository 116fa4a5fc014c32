use glam::DVec2;
use serde::{Deserialize, Serialize};

use dashbound_core::{BufferedInput, Level};

use crate::collision::{Contacts, resolve_movement};
use crate::config::PhysicsConfig;
use crate::player::{Facing, Motion, Player, TrailSample};

/// Which surface a jump pushed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JumpKind {
    Floor,
    /// Off a wall on the player's left, kicking right.
    WallLeft,
    /// Off a wall on the player's right, kicking left.
    WallRight,
}

/// Notable transitions produced by a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TickEvent {
    Jumped(JumpKind),
    Dashed { direction: DVec2 },
    Bounced,
    DashRestored,
    Died { position: DVec2 },
    Respawned,
}

/// Advance the player by one fixed tick.
///
/// Consumes buffered jump/dash presses that fire; the caller is responsible
/// for `input.tick()` afterwards.
pub fn tick_player(
    player: &mut Player,
    input: &mut BufferedInput,
    level: &Level,
    cfg: &PhysicsConfig,
    spawn: DVec2,
) -> Vec<TickEvent> {
    let mut events = Vec::new();

    if !player.velocity.is_finite() {
        player.velocity = DVec2::ZERO;
    }

    player.motion = player.motion.begin_tick();
    player.jump_ticks_remaining = player.jump_ticks_remaining.saturating_sub(1);

    if player.is_dead() {
        match player.motion.advance_death(cfg.death_progress_per_tick) {
            Some(motion) => player.motion = motion,
            None => {
                *player = Player::spawn(spawn);
                events.push(TickEvent::Respawned);
            },
        }
        return events;
    }

    let axis = input.horizontal_axis();

    if !player.is_dashing() {
        walk(player, axis, cfg);
    }

    if input.dash_pressed() && player.has_dash_ability && !player.is_dashing() {
        let direction = start_dash(player, input, cfg);
        events.push(TickEvent::Dashed { direction });
    }

    if input.jump_pressed() && player.jump_ticks_remaining == 0 {
        if let Some(kind) = try_jump(player, axis, cfg) {
            input.consume_jump();
            events.push(TickEvent::Jumped(kind));
        }
    }

    update_dash_trail(player, cfg);

    if !player.is_dashing() {
        apply_friction(player, axis, cfg);
        player.velocity.y += cfg.gravity;
    }

    let had_dash = player.has_dash_ability;
    let contacts = resolve_movement(player, level, cfg);

    if contacts.death {
        player.motion = Motion::Dead { progress: 0.0 };
        events.push(TickEvent::Died {
            position: player.position,
        });
        return events;
    }
    if contacts.bounced {
        events.push(TickEvent::Bounced);
    }

    settle_contacts(player, &contacts, axis, cfg);

    if player.has_dash_ability && !had_dash {
        events.push(TickEvent::DashRestored);
    }

    events
}

fn walk(player: &mut Player, axis: f64, cfg: &PhysicsConfig) {
    let vx = &mut player.velocity.x;
    if axis > 0.0 && *vx < cfg.max_walk_velocity {
        *vx = (*vx + cfg.walk_acceleration).min(cfg.max_walk_velocity);
    } else if axis < 0.0 && *vx > -cfg.max_walk_velocity {
        *vx = (*vx - cfg.walk_acceleration).max(-cfg.max_walk_velocity);
    }
    if let Some(facing) = Facing::from_x(axis) {
        player.facing = facing;
    }
}

fn start_dash(player: &mut Player, input: &mut BufferedInput, cfg: &PhysicsConfig) -> DVec2 {
    let direction = if input.has_direction() {
        input.direction_vector()
    } else {
        DVec2::new(player.facing.sign(), 0.0)
    };

    player.velocity = direction * cfg.dash_speed;
    if let Some(facing) = Facing::from_x(direction.x) {
        player.facing = facing;
    }
    player.has_dash_ability = false;
    player.motion = Motion::Dashing {
        ticks_left: cfg.dash_ticks.max(1),
    };
    // Lingering floor contact must not hand the dash straight back.
    player.ticks_touching_floor = 0;
    input.consume_dash();

    direction
}

/// Floor jump first, then the left wall, then the right wall.
fn try_jump(player: &mut Player, axis: f64, cfg: &PhysicsConfig) -> Option<JumpKind> {
    let kind = if player.on_floor() {
        player.velocity.y = -cfg.jump_velocity;
        JumpKind::Floor
    } else if player.wall_contact_ticks_left > 0 {
        let kick = if axis < 0.0 {
            cfg.wall_jump_toward_wall
        } else {
            cfg.wall_jump_neutral
        };
        player.velocity = DVec2::new(kick.x, -kick.y);
        player.facing = Facing::Right;
        JumpKind::WallLeft
    } else if player.wall_contact_ticks_right > 0 {
        let kick = if axis > 0.0 {
            cfg.wall_jump_toward_wall
        } else {
            cfg.wall_jump_neutral
        };
        player.velocity = DVec2::new(-kick.x, -kick.y);
        player.facing = Facing::Left;
        JumpKind::WallRight
    } else {
        return None;
    };

    if kind != JumpKind::Floor {
        player.wall_contact_ticks_left = 0;
        player.wall_contact_ticks_right = 0;
    }
    player.jump_ticks_remaining = cfg.jump_lockout_ticks;
    Some(kind)
}

fn update_dash_trail(player: &mut Player, cfg: &PhysicsConfig) {
    if let Motion::Dashing { ticks_left } = player.motion {
        let moved = player
            .dash_trail
            .last()
            .is_none_or(|s| s.position != player.position);
        if moved {
            player.dash_trail.push(TrailSample {
                facing: player.facing,
                position: player.position,
                opacity: 1.0,
            });
        }
        if ticks_left == 1 {
            player.velocity.x *= cfg.dash_end_damping_x;
            player.velocity.y *= cfg.dash_end_damping_y;
        }
    }

    for sample in &mut player.dash_trail {
        sample.opacity -= cfg.trail_fade_per_tick;
    }
    player.dash_trail.retain(|s| s.opacity > 0.0);
}

/// Held input in the direction of travel, at or under the walk cap, keeps
/// its speed. Overspeed always bleeds off.
fn apply_friction(player: &mut Player, axis: f64, cfg: &PhysicsConfig) {
    let vx = player.velocity.x;
    if axis * vx > 0.0 && vx.abs() <= cfg.max_walk_velocity {
        return;
    }
    let slowdown = cfg.friction.min(vx.abs());
    player.velocity.x = vx - slowdown * vx.signum();
}

fn settle_contacts(player: &mut Player, contacts: &Contacts, axis: f64, cfg: &PhysicsConfig) {
    let v = &mut player.velocity;
    if (contacts.left && v.x < 0.0) || (contacts.right && v.x > 0.0) {
        v.x = 0.0;
    }
    if (contacts.floor && v.y > 0.0) || (contacts.ceiling && v.y < 0.0) {
        v.y = 0.0;
    }

    if contacts.floor {
        player.ticks_touching_floor = player.ticks_touching_floor.saturating_add(1);
        if player.ticks_touching_floor > cfg.dash_restore_delay_ticks {
            player.has_dash_ability = true;
        }
    } else {
        player.ticks_touching_floor = 0;
    }

    player.wall_contact_ticks_left = wall_buffer(
        player.wall_contact_ticks_left,
        contacts.left,
        axis,
        cfg.wall_contact_buffer_ticks,
    );
    player.wall_contact_ticks_right = wall_buffer(
        player.wall_contact_ticks_right,
        contacts.right,
        axis,
        cfg.wall_contact_buffer_ticks,
    );
}

/// Refill on contact; otherwise any horizontal input drops the buffer and
/// neutral input lets it decay.
fn wall_buffer(current: u32, touching: bool, axis: f64, full: u32) -> u32 {
    if touching {
        full
    } else if axis != 0.0 {
        0
    } else {
        current.saturating_sub(1)
    }
}
