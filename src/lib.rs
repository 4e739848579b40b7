pub mod analytics;
pub mod career;
pub mod clutch;
pub mod config;
pub mod consistency;
pub mod engine;
pub mod h2h;
pub mod luck;
pub mod model;
pub mod normalize;
pub mod owners;
pub mod records;
pub mod schedule_strength;

pub use config::{CoOwnerTable, EngineConfig};
pub use engine::{HistoryEngine, LeagueHistory};
