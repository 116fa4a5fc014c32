use tracing_subscriber::EnvFilter;

use dashbound_core::level::default_level;
use dashbound_sim::Simulation;

mod config;
mod script;

use config::RunnerConfig;
use script::{TallyHooks, run_script};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Dashbound runner starting");

    let config = RunnerConfig::load();
    let hooks = TallyHooks::new();
    let tally = hooks.handle();
    let mut sim = Simulation::with_hooks(config.sim_config(), default_level(), Box::new(hooks));

    tracing::info!(
        frames = config.total_frames(),
        frame_ms = config.frame_ms,
        ticks_per_second = sim.config().ticks_per_second,
        "Playing input script"
    );
    let ticks = run_script(&mut sim, &config.script, config.frame_ms, config.log_every_frames);

    let p = sim.player();
    let t = *tally.borrow();
    tracing::info!(
        ticks,
        x = p.position.x,
        y = p.position.y,
        has_dash = p.has_dash_ability,
        jumps = t.jumps,
        wall_jumps = t.wall_jumps,
        dashes = t.dashes,
        bounces = t.bounces,
        deaths = t.deaths,
        respawns = t.respawns,
        "Script finished"
    );

    match sim.encode_snapshot() {
        Ok(bytes) => tracing::info!(bytes = bytes.len(), "Encoded final snapshot"),
        Err(e) => tracing::error!("Failed to encode snapshot: {e}"),
    }
}
