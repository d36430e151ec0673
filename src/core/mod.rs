//! Core types: player identity and model, RNG, room settings, control
//! signals.

pub mod config;
pub mod player;
pub mod rng;
pub mod signal;

pub use config::RoomSettings;
pub use player::{Phase, Player, PlayerId, SkillArea};
pub use rng::GameRng;
pub use signal::{ControlSignal, GameResult};
