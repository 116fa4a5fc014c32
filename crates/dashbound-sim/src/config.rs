use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use dashbound_core::input::INPUT_BUFFER_TICKS;
use dashbound_core::level::DEFAULT_SPAWN;

use crate::error::SimError;

// All velocities are tiles/tick and accelerations tiles/tick^2 at the
// default 360 Hz cadence. y grows downward.

/// Logical simulation ticks per second.
pub const TICKS_PER_SECOND: f64 = 360.0;
/// Downward acceleration applied on every non-dash tick.
pub const GRAVITY: f64 = 0.00046;
/// Horizontal acceleration toward the held direction.
pub const PLAYER_WALK_ACCELERATION: f64 = 0.0016;
/// Walking cannot accelerate the player past this speed.
pub const PLAYER_MAX_WALK_VELOCITY: f64 = 0.025;
/// Per-tick horizontal speed loss on non-dash ticks.
pub const PLAYER_FRICTION: f64 = 0.0009;
/// Upward speed of a floor jump (about 3.5 tiles of height).
pub const JUMP_VELOCITY: f64 = 0.057;
/// Ticks after a jump before another jump may fire.
pub const JUMP_LOCKOUT_TICKS: u32 = 36;
/// Upward speed imparted by a bounce pad.
pub const BOUNCE_VELOCITY: f64 = 0.08;
pub const DASH_SPEED: f64 = 0.074;
pub const DASH_TICKS: u32 = 54;
/// Velocity multipliers applied on the final dash tick.
pub const DASH_END_DAMPING_X: f64 = 0.35;
pub const DASH_END_DAMPING_Y: f64 = 0.2;
/// Floor ticks needed before the dash comes back.
pub const DASH_RESTORE_DELAY_TICKS: u32 = 6;
/// Ticks a wall stays jumpable after the player stops touching it.
pub const WALL_CONTACT_BUFFER_TICKS: u32 = 36;
/// Wall-jump kick with neutral input: 45 degrees away from the wall.
pub const WALL_JUMP_NEUTRAL: DVec2 = DVec2::new(0.0424, 0.0424);
/// Wall-jump kick while holding toward the wall: flatter.
pub const WALL_JUMP_TOWARD_WALL: DVec2 = DVec2::new(0.05, 0.03);
/// Largest distance a single movement sub-step may cover (one sprite pixel).
pub const MOVEMENT_STEP: f64 = 1.0 / 16.0;
pub const TRAIL_FADE_PER_TICK: f64 = 1.0 / 90.0;
/// Death animation length is `1 / DEATH_PROGRESS_PER_TICK` ticks.
pub const DEATH_PROGRESS_PER_TICK: f64 = 1.0 / 180.0;
pub const PLAYER_WIDTH: f64 = 0.75;
pub const PLAYER_HEIGHT: f64 = 0.9375;

/// Tunable player physics, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f64,
    pub walk_acceleration: f64,
    pub max_walk_velocity: f64,
    pub friction: f64,
    pub jump_velocity: f64,
    pub jump_lockout_ticks: u32,
    pub bounce_velocity: f64,
    pub dash_speed: f64,
    pub dash_ticks: u32,
    pub dash_end_damping_x: f64,
    pub dash_end_damping_y: f64,
    pub dash_restore_delay_ticks: u32,
    pub wall_contact_buffer_ticks: u32,
    /// (away from wall, upward) speeds.
    pub wall_jump_neutral: DVec2,
    pub wall_jump_toward_wall: DVec2,
    pub movement_step: f64,
    pub trail_fade_per_tick: f64,
    pub death_progress_per_tick: f64,
    pub player_width: f64,
    pub player_height: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            walk_acceleration: PLAYER_WALK_ACCELERATION,
            max_walk_velocity: PLAYER_MAX_WALK_VELOCITY,
            friction: PLAYER_FRICTION,
            jump_velocity: JUMP_VELOCITY,
            jump_lockout_ticks: JUMP_LOCKOUT_TICKS,
            bounce_velocity: BOUNCE_VELOCITY,
            dash_speed: DASH_SPEED,
            dash_ticks: DASH_TICKS,
            dash_end_damping_x: DASH_END_DAMPING_X,
            dash_end_damping_y: DASH_END_DAMPING_Y,
            dash_restore_delay_ticks: DASH_RESTORE_DELAY_TICKS,
            wall_contact_buffer_ticks: WALL_CONTACT_BUFFER_TICKS,
            wall_jump_neutral: WALL_JUMP_NEUTRAL,
            wall_jump_toward_wall: WALL_JUMP_TOWARD_WALL,
            movement_step: MOVEMENT_STEP,
            trail_fade_per_tick: TRAIL_FADE_PER_TICK,
            death_progress_per_tick: DEATH_PROGRESS_PER_TICK,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
        }
    }
}

impl PhysicsConfig {
    /// Every value must be finite; divisors and box sizes must also be
    /// positive.
    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("movement_step", self.movement_step),
            ("trail_fade_per_tick", self.trail_fade_per_tick),
            ("death_progress_per_tick", self.death_progress_per_tick),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::Config(format!(
                    "physics.{name} must be positive and finite, got {value}"
                )));
            }
        }

        let finite = [
            ("gravity", self.gravity),
            ("walk_acceleration", self.walk_acceleration),
            ("max_walk_velocity", self.max_walk_velocity),
            ("friction", self.friction),
            ("jump_velocity", self.jump_velocity),
            ("bounce_velocity", self.bounce_velocity),
            ("dash_speed", self.dash_speed),
            ("dash_end_damping_x", self.dash_end_damping_x),
            ("dash_end_damping_y", self.dash_end_damping_y),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::Config(format!("physics.{name} must be finite, got {value}")));
            }
        }
        if !self.wall_jump_neutral.is_finite() || !self.wall_jump_toward_wall.is_finite() {
            return Err(SimError::Config("physics wall jump kicks must be finite".to_string()));
        }
        Ok(())
    }
}

/// Top-level simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub physics: PhysicsConfig,
    pub ticks_per_second: f64,
    pub input_buffer_ticks: u32,
    /// Top-left of the player box at level start, tile units.
    pub spawn: DVec2,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            ticks_per_second: TICKS_PER_SECOND,
            input_buffer_ticks: INPUT_BUFFER_TICKS,
            spawn: DVec2::new(DEFAULT_SPAWN.0, DEFAULT_SPAWN.1),
        }
    }
}

impl SimConfig {
    /// Load config from `$DASHBOUND_SIM_CONFIG` or `config/sim.toml`.
    pub fn load() -> Self {
        let path = std::env::var("DASHBOUND_SIM_CONFIG")
            .unwrap_or_else(|_| "config/sim.toml".to_string());
        Self::load_from(path)
    }

    /// Load config from `path`. Falls back to defaults if the file is
    /// missing, unparseable or fails [`SimConfig::validate`].
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded sim config from {}", path.display());
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to load {}: {e}, using defaults", path.display());
                    SimConfig::default()
                },
            },
            Err(_) => SimConfig::default(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, SimError> {
        let cfg: Self = toml::from_str(content).map_err(|e| SimError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.ticks_per_second.is_finite() && self.ticks_per_second > 0.0) {
            return Err(SimError::Config(format!(
                "ticks_per_second must be positive and finite, got {}",
                self.ticks_per_second
            )));
        }
        if !self.spawn.is_finite() {
            return Err(SimError::Config(format!("spawn must be finite, got {}", self.spawn)));
        }
        self.physics.validate()
    }

    /// Milliseconds of wall-clock time per simulation tick.
    pub fn tick_duration_ms(&self) -> f64 {
        1000.0 / self.ticks_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tick_is_360hz() {
        let cfg = SimConfig::default();
        assert!((cfg.tick_duration_ms() - 1000.0 / 360.0).abs() < 1e-12);
        assert_eq!(cfg.input_buffer_ticks, 30);
        assert_eq!(cfg.spawn, DVec2::new(20.0, 2.0));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = SimConfig::from_toml_str(
            r#"
            ticks_per_second = 120.0

            [physics]
            gravity = 0.001
            wall_jump_neutral = [0.05, 0.05]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.ticks_per_second, 120.0);
        assert_eq!(cfg.physics.gravity, 0.001);
        assert_eq!(cfg.physics.wall_jump_neutral, DVec2::new(0.05, 0.05));
        assert_eq!(cfg.physics.dash_ticks, DASH_TICKS);
        assert_eq!(cfg.spawn, SimConfig::default().spawn);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        assert!(SimConfig::from_toml_str("ticks_per_second = \"fast\"").is_err());
    }

    #[test]
    fn defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        for doc in [
            "ticks_per_second = 0.0",
            "ticks_per_second = -360.0",
            "ticks_per_second = nan",
            "[physics]\nmovement_step = 0.0",
            "[physics]\nmovement_step = -0.0625",
            "[physics]\ntrail_fade_per_tick = 0.0",
            "[physics]\ndeath_progress_per_tick = -1.0",
            "[physics]\nplayer_width = 0.0",
            "[physics]\nplayer_height = inf",
        ] {
            let err = SimConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, SimError::Config(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn non_finite_values_are_rejected() {
        for doc in [
            "spawn = [nan, 2.0]",
            "[physics]\ngravity = inf",
            "[physics]\ndash_speed = nan",
            "[physics]\nwall_jump_neutral = [inf, 0.04]",
        ] {
            assert!(SimConfig::from_toml_str(doc).is_err(), "{doc}");
        }
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SimConfig::load_from(dir.path().join("absent.toml"));
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn load_from_reads_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sim.toml");
        std::fs::write(&path, "ticks_per_second = 240.0\n\n[physics]\ndash_ticks = 30\n").unwrap();
        let cfg = SimConfig::load_from(&path);
        assert_eq!(cfg.ticks_per_second, 240.0);
        assert_eq!(cfg.physics.dash_ticks, 30);
    }

    #[test]
    fn load_from_bad_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let malformed = dir.path().join("malformed.toml");
        std::fs::write(&malformed, "ticks_per_second = \"fast\"").unwrap();
        assert_eq!(SimConfig::load_from(&malformed), SimConfig::default());

        let invalid = dir.path().join("invalid.toml");
        std::fs::write(&invalid, "ticks_per_second = -1.0").unwrap();
        assert_eq!(SimConfig::load_from(&invalid), SimConfig::default());
    }

    #[test]
    fn shipped_sim_toml_is_valid() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/sim.toml");
        let content = std::fs::read_to_string(path).unwrap();
        SimConfig::from_toml_str(&content).unwrap();
    }

    #[test]
    fn json_roundtrip_keeps_vectors_as_pairs() {
        let cfg = SimConfig::default();
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(value["spawn"], serde_json::json!([20.0, 2.0]));
        let back: SimConfig = serde_json::from_value(value).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn bounce_beats_jump() {
        let cfg = PhysicsConfig::default();
        assert!(cfg.bounce_velocity > cfg.jump_velocity);
        assert!(cfg.walk_acceleration > cfg.friction);
        assert!(cfg.movement_step < 1.0);
    }
}
