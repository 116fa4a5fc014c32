use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;

use dashbound_sim::{JumpKind, SimHooks, Simulation};

use crate::config::ScriptSegment;

/// Event counts gathered while a script plays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub jumps: u32,
    pub wall_jumps: u32,
    pub dashes: u32,
    pub bounces: u32,
    pub deaths: u32,
    pub respawns: u32,
}

/// Hooks that count events into a shared [`Tally`].
#[derive(Debug, Default, Clone)]
pub struct TallyHooks {
    tally: Rc<RefCell<Tally>>,
}

impl TallyHooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for reading the counts after the hooks move into a simulation.
    pub fn handle(&self) -> Rc<RefCell<Tally>> {
        Rc::clone(&self.tally)
    }
}

impl SimHooks for TallyHooks {
    fn on_jump(&mut self, kind: JumpKind) {
        let mut t = self.tally.borrow_mut();
        match kind {
            JumpKind::Floor => t.jumps += 1,
            JumpKind::WallLeft | JumpKind::WallRight => t.wall_jumps += 1,
        }
    }

    fn on_dash(&mut self, _direction: DVec2) {
        self.tally.borrow_mut().dashes += 1;
    }

    fn on_bounce(&mut self) {
        self.tally.borrow_mut().bounces += 1;
    }

    fn on_death(&mut self, _position: DVec2) {
        self.tally.borrow_mut().deaths += 1;
    }

    fn on_respawn(&mut self) {
        self.tally.borrow_mut().respawns += 1;
    }
}

/// Play `script` frame by frame. Returns the number of ticks run.
pub fn run_script(
    sim: &mut Simulation,
    script: &[ScriptSegment],
    frame_ms: f64,
    log_every_frames: u32,
) -> u64 {
    let mut frame: u64 = 0;
    let mut ticks = 0;
    for segment in script {
        for _ in 0..segment.frames {
            sim.set_intent(segment.intent);
            ticks += sim.step(frame_ms);
            frame += 1;

            if log_every_frames > 0 && frame % u64::from(log_every_frames) == 0 {
                let p = sim.player();
                tracing::info!(
                    frame,
                    tick = sim.tick_count(),
                    x = p.position.x,
                    y = p.position.y,
                    vx = p.velocity.x,
                    vy = p.velocity.y,
                    dashing = p.is_dashing(),
                    dead = p.is_dead(),
                    "player state"
                );
            }
        }
    }
    ticks
}
