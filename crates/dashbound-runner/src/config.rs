use std::path::Path;

use serde::Deserialize;

use dashbound_core::RawIntent;
use dashbound_sim::SimConfig;

/// One stretch of held input, applied for `frames` consecutive frames.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScriptSegment {
    pub frames: u32,
    #[serde(default)]
    pub intent: RawIntent,
}

impl ScriptSegment {
    fn new(frames: u32, intent: RawIntent) -> Self {
        Self { frames, intent }
    }
}

/// Runner configuration, loaded from `config/runner.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Inline simulation settings. When absent, `SimConfig::load` supplies
    /// them from `config/sim.toml`.
    pub sim: Option<SimConfig>,
    /// Wall-clock milliseconds fed to `step` per frame.
    pub frame_ms: f64,
    /// Log the player state every this many frames; 0 disables.
    pub log_every_frames: u32,
    pub script: Vec<ScriptSegment>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            sim: None,
            frame_ms: 1000.0 / 60.0,
            log_every_frames: 30,
            script: default_script(),
        }
    }
}

/// Fall to the first platform, run right, jump, then dash up-right.
fn default_script() -> Vec<ScriptSegment> {
    let right = RawIntent {
        right: true,
        ..Default::default()
    };
    vec![
        ScriptSegment::new(120, RawIntent::default()),
        ScriptSegment::new(60, right),
        ScriptSegment::new(20, RawIntent {
            jump: true,
            ..right
        }),
        ScriptSegment::new(10, RawIntent {
            up: true,
            dash: true,
            ..right
        }),
        ScriptSegment::new(120, RawIntent::default()),
    ]
}

impl RunnerConfig {
    pub fn load() -> Self {
        let path = std::env::var("DASHBOUND_RUNNER_CONFIG")
            .unwrap_or_else(|_| "config/runner.toml".to_string());
        let mut config = Self::load_from(path);

        if let Ok(val) = std::env::var("DASHBOUND_FRAME_MS")
            && let Ok(ms) = val.parse::<f64>()
            && ms > 0.0
        {
            config.frame_ms = ms;
        }

        config
    }

    /// Read `path`, falling back to defaults when it is missing or
    /// unparseable. An invalid `[sim]` section is dropped.
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let mut config = match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<RunnerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {}", path.display());
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {e}, using defaults", path.display());
                    RunnerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {} found, using defaults", path.display());
                RunnerConfig::default()
            },
        };

        if let Some(sim) = &config.sim
            && let Err(e) = sim.validate()
        {
            tracing::warn!("Ignoring [sim] in {}: {e}", path.display());
            config.sim = None;
        }

        config
    }

    /// The simulation config to run with.
    pub fn sim_config(&self) -> SimConfig {
        self.sim.clone().unwrap_or_else(SimConfig::load)
    }

    pub fn total_frames(&self) -> u64 {
        self.script.iter().map(|s| u64::from(s.frames)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RunnerConfig::default();
        assert!((cfg.frame_ms - 1000.0 / 60.0).abs() < 1e-12);
        assert_eq!(cfg.total_frames(), 330);
        assert_eq!(cfg.sim, None);
    }

    #[test]
    fn parse_script_toml() {
        let toml_str = r#"
frame_ms = 8.0

[sim]
ticks_per_second = 240.0

[[script]]
frames = 10

[[script]]
frames = 5
intent = { right = true, jump = true }
"#;
        let cfg: RunnerConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.frame_ms, 8.0);
        assert_eq!(cfg.sim_config().ticks_per_second, 240.0);
        assert_eq!(cfg.log_every_frames, 30);
        assert_eq!(cfg.script.len(), 2);
        assert_eq!(cfg.script[0].intent, RawIntent::default());
        assert!(cfg.script[1].intent.right && cfg.script[1].intent.jump);
        assert_eq!(cfg.total_frames(), 15);
    }

    #[test]
    fn load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = RunnerConfig::load_from(dir.path().join("absent.toml"));
        assert_eq!(cfg.sim, None);
        assert_eq!(cfg.script, default_script());
    }

    #[test]
    fn load_from_keeps_valid_sim_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, "frame_ms = 10.0\n\n[sim.physics]\ndash_ticks = 20\n").unwrap();
        let cfg = RunnerConfig::load_from(&path);
        assert_eq!(cfg.frame_ms, 10.0);
        let sim = cfg.sim_config();
        assert_eq!(sim.physics.dash_ticks, 20);
        assert_eq!(sim.ticks_per_second, SimConfig::default().ticks_per_second);
    }

    #[test]
    fn load_from_drops_invalid_sim_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.toml");
        std::fs::write(&path, "frame_ms = 10.0\n\n[sim]\nticks_per_second = -5.0\n").unwrap();
        let cfg = RunnerConfig::load_from(&path);
        assert_eq!(cfg.frame_ms, 10.0);
        assert_eq!(cfg.sim, None);
    }

    #[test]
    fn shipped_runner_toml_defers_to_sim_toml() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/runner.toml");
        let cfg = RunnerConfig::load_from(path);
        assert_eq!(cfg.sim, None);
        assert_eq!(cfg.total_frames(), 330);
    }
}
