mod aggregator;
mod config;
mod engine;
mod error;
mod peer_source;
mod scheduler;

pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use peer_source::PeerSource;
pub use scheduler::{current_round, round_deadline};
