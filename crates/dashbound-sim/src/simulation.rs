use glam::DVec2;
use serde::{Deserialize, Serialize};

use dashbound_core::{BufferedInput, Level, RawIntent, TileBox, TileId};

use crate::config::SimConfig;
use crate::error::SimError;
use crate::physics::{JumpKind, TickEvent, tick_player};
use crate::player::Player;

/// Callbacks for presentation side effects (sound, particles, UI).
///
/// Every method defaults to a no-op so implementors only override what they
/// care about. Hooks run synchronously inside `step`, after the tick that
/// produced the event.
pub trait SimHooks {
    fn on_jump(&mut self, _kind: JumpKind) {}
    fn on_dash(&mut self, _direction: DVec2) {}
    fn on_bounce(&mut self) {}
    fn on_dash_restored(&mut self) {}
    fn on_death(&mut self, _position: DVec2) {}
    fn on_respawn(&mut self) {}
    fn on_level_edited(&mut self, _x: u32, _y: u32) {}
}

/// Hooks that ignore everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHooks;

impl SimHooks for NoHooks {}

/// Read-only view of the simulation handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimSnapshot {
    pub tick: u64,
    pub player: Player,
}

/// Fixed-timestep driver owning one player and one level.
pub struct Simulation {
    config: SimConfig,
    level: Level,
    player: Player,
    input: BufferedInput,
    accumulator_ms: f64,
    tick: u64,
    paused: bool,
    hooks: Box<dyn SimHooks>,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.tick)
            .field("paused", &self.paused)
            .field("accumulator_ms", &self.accumulator_ms)
            .field("player", &self.player)
            .finish_non_exhaustive()
    }
}

impl Simulation {
    pub fn new(config: SimConfig, level: Level) -> Self {
        Self::with_hooks(config, level, Box::new(NoHooks))
    }

    /// An invalid `config` is replaced by the defaults so the tick loop
    /// always has a positive tick length.
    pub fn with_hooks(config: SimConfig, level: Level, hooks: Box<dyn SimHooks>) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Invalid sim config: {e}, using defaults");
                SimConfig::default()
            },
        };
        let player = Player::spawn(config.spawn);
        let input = BufferedInput::new(config.input_buffer_ticks);
        Self {
            config,
            level,
            player,
            input,
            accumulator_ms: 0.0,
            tick: 0,
            paused: false,
            hooks,
        }
    }

    /// Record this frame's input. Call once per frame, before `step`.
    pub fn set_intent(&mut self, intent: RawIntent) {
        self.input.update(intent);
    }

    /// Advance by `elapsed_ms` of wall-clock time. Runs as many whole ticks
    /// as fit and carries the remainder into the next call. Returns the
    /// number of ticks run.
    ///
    /// There is no cap on catch-up: a long gap produces a long burst.
    pub fn step(&mut self, elapsed_ms: f64) -> u64 {
        if self.paused {
            return 0;
        }
        // Also rejects NaN.
        if elapsed_ms > 0.0 {
            self.accumulator_ms += elapsed_ms;
        }

        let tick_ms = self.config.tick_duration_ms();
        let mut ran = 0;
        while self.accumulator_ms >= tick_ms {
            self.accumulator_ms -= tick_ms;
            self.tick_once();
            ran += 1;
        }
        ran
    }

    /// Run exactly one tick regardless of the accumulator or pause state.
    pub fn tick_once(&mut self) {
        let events = tick_player(
            &mut self.player,
            &mut self.input,
            &self.level,
            &self.config.physics,
            self.config.spawn,
        );
        self.input.tick();
        self.tick += 1;

        for event in events {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: TickEvent) {
        let tick = self.tick;
        match event {
            TickEvent::Jumped(kind) => {
                tracing::debug!(tick, ?kind, "player jumped");
                self.hooks.on_jump(kind);
            },
            TickEvent::Dashed { direction } => {
                tracing::debug!(tick, dx = direction.x, dy = direction.y, "player dashed");
                self.hooks.on_dash(direction);
            },
            TickEvent::Bounced => {
                tracing::debug!(tick, "player bounced");
                self.hooks.on_bounce();
            },
            TickEvent::DashRestored => {
                tracing::debug!(tick, "dash restored");
                self.hooks.on_dash_restored();
            },
            TickEvent::Died { position } => {
                tracing::debug!(tick, x = position.x, y = position.y, "player died");
                self.hooks.on_death(position);
            },
            TickEvent::Respawned => {
                tracing::debug!(tick, "player respawned");
                self.hooks.on_respawn();
            },
        }
    }

    /// Replace the level and respawn the player. Pending time is dropped.
    pub fn load_level(&mut self, level: Level) {
        tracing::info!(width = level.width(), height = level.height(), "level loaded");
        self.level = level;
        self.accumulator_ms = 0.0;
        self.respawn();
    }

    /// Set one cell, returning what was there before.
    pub fn edit_tile(
        &mut self,
        x: u32,
        y: u32,
        tile: Option<TileId>,
    ) -> Result<Option<TileId>, SimError> {
        let previous = self.level.set_tile(x, y, tile)?;
        self.hooks.on_level_edited(x, y);
        Ok(previous)
    }

    /// Re-run edge selection for every cell of `tile_box`.
    pub fn auto_tile_box(&mut self, tile_box: &TileBox) -> usize {
        self.level.auto_tile_box(tile_box)
    }

    /// Stop `step` from running ticks. Time passed while paused is discarded.
    pub fn pause(&mut self) {
        self.paused = true;
        self.accumulator_ms = 0.0;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Put a fresh player at the spawn point.
    pub fn respawn(&mut self) {
        self.player = Player::spawn(self.config.spawn);
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Ticks run since construction.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Time carried over to the next `step`, in milliseconds.
    pub fn pending_ms(&self) -> f64 {
        self.accumulator_ms
    }

    pub fn snapshot(&self) -> SimSnapshot {
        SimSnapshot {
            tick: self.tick,
            player: self.player.clone(),
        }
    }

    /// MessagePack-encoded [`SimSnapshot`].
    pub fn encode_snapshot(&self) -> Result<Vec<u8>, SimError> {
        rmp_serde::to_vec(&self.snapshot()).map_err(|e| SimError::Encode(e.to_string()))
    }
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<SimSnapshot, SimError> {
    rmp_serde::from_slice(bytes).map_err(|e| SimError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashbound_core::test_helpers::{flat_floor_level, level_from_ascii};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sim() -> Simulation {
        Simulation::new(SimConfig::default(), flat_floor_level(60, 12, 10))
    }

    fn tick_ms() -> f64 {
        SimConfig::default().tick_duration_ms()
    }

    #[test]
    fn step_runs_whole_ticks_and_keeps_remainder() {
        let mut s = sim();
        assert_eq!(s.step(tick_ms() * 2.5), 2);
        assert!((s.pending_ms() - tick_ms() * 0.5).abs() < 1e-9);
        assert_eq!(s.step(tick_ms() * 0.6), 1);
        assert_eq!(s.tick_count(), 3);
    }

    #[test]
    fn small_frames_accumulate() {
        let mut s = sim();
        let frame = tick_ms() / 4.0;
        let ran: u64 = (0..40).map(|_| s.step(frame)).sum();
        assert!((9..=10).contains(&ran), "ran {ran}");
    }

    #[test]
    fn invalid_config_falls_back_to_defaults() {
        for ticks_per_second in [-360.0, 0.0, f64::NAN] {
            let cfg = SimConfig {
                ticks_per_second,
                ..SimConfig::default()
            };
            let mut s = Simulation::new(cfg, flat_floor_level(60, 12, 10));
            assert_eq!(*s.config(), SimConfig::default());
            assert_eq!(s.step(16.0), (16.0 / tick_ms()) as u64);
        }
    }

    #[test]
    fn negative_and_nan_elapsed_add_nothing() {
        let mut s = sim();
        assert_eq!(s.step(-100.0), 0);
        assert_eq!(s.step(f64::NAN), 0);
        assert_eq!(s.pending_ms(), 0.0);
    }

    #[test]
    fn sixty_hz_frame_runs_six_ticks() {
        let mut s = sim();
        let ran: u64 = (0..60).map(|_| s.step(1000.0 / 60.0)).sum();
        assert!((359..=360).contains(&ran), "ran {ran}");
    }

    #[test]
    fn pause_discards_time() {
        let mut s = sim();
        s.step(tick_ms() * 0.9);
        s.pause();
        assert!(s.is_paused());
        assert_eq!(s.step(1000.0), 0);
        assert_eq!(s.pending_ms(), 0.0);
        s.resume();
        assert_eq!(s.step(tick_ms() * 0.5), 0);
        assert_eq!(s.step(tick_ms() * 0.5), 1);
    }

    #[test]
    fn edit_tile_reports_previous_and_bounds() {
        let mut s = sim();
        let prev = s.edit_tile(3, 3, Some(TileId::BOUNCE_PAD)).unwrap();
        assert_eq!(prev, None);
        assert_eq!(s.level().tile_at(3, 3), Some(TileId::BOUNCE_PAD));
        assert!(matches!(s.edit_tile(600, 3, None), Err(SimError::Core(_))));
    }

    #[test]
    fn load_level_respawns() {
        let mut s = sim();
        s.set_intent(RawIntent {
            right: true,
            ..Default::default()
        });
        s.step(500.0);
        assert_ne!(s.player().position, s.config().spawn);
        s.load_level(flat_floor_level(40, 12, 10));
        assert_eq!(*s.player(), Player::spawn(s.config().spawn));
        assert_eq!(s.pending_ms(), 0.0);
    }

    #[test]
    fn snapshot_roundtrips_through_msgpack() {
        let mut s = sim();
        s.step(100.0);
        let bytes = s.encode_snapshot().unwrap();
        let decoded = decode_snapshot(&bytes).unwrap();
        assert_eq!(decoded, s.snapshot());
        assert!(matches!(decode_snapshot(&[0xc1]), Err(SimError::Decode(_))));
    }

    #[derive(Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<String>>>,
    }

    impl SimHooks for Recorder {
        fn on_jump(&mut self, kind: JumpKind) {
            self.log.borrow_mut().push(format!("jump {kind:?}"));
        }
        fn on_death(&mut self, _position: DVec2) {
            self.log.borrow_mut().push("death".into());
        }
        fn on_respawn(&mut self) {
            self.log.borrow_mut().push("respawn".into());
        }
        fn on_level_edited(&mut self, x: u32, y: u32) {
            self.log.borrow_mut().push(format!("edit {x},{y}"));
        }
    }

    #[test]
    fn hooks_receive_events() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = Recorder { log: Rc::clone(&log) };
        let mut config = SimConfig::default();
        config.spawn = DVec2::new(2.0, 0.5);
        let level = level_from_ascii(&["......", "......", "xxxxxx"]);
        let mut s = Simulation::with_hooks(config, level, Box::new(recorder));

        s.step(3000.0);
        s.edit_tile(0, 0, None).unwrap();

        let log = log.borrow();
        assert_eq!(log.first().map(String::as_str), Some("death"));
        assert!(log.iter().any(|e| e == "respawn"));
        assert_eq!(log.last().map(String::as_str), Some("edit 0,0"));
    }
}
