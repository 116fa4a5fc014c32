pub mod collision;
pub mod config;
pub mod editor;
pub mod error;
pub mod physics;
pub mod player;
pub mod simulation;

pub use config::{PhysicsConfig, SimConfig};
pub use editor::EditorSession;
pub use error::SimError;
pub use physics::{JumpKind, TickEvent, tick_player};
pub use player::{Facing, Motion, Player, TrailSample};
pub use simulation::{NoHooks, SimHooks, SimSnapshot, Simulation, decode_snapshot};
