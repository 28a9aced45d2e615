//! Multi-transport randomness client: fetch, watch, and verify rounds from
//! one or more providers of a single beacon chain (spec §4.5).

mod cache;
mod client;
mod error;
mod http;
mod optimising;
mod stats;
mod transport;
mod verify;
mod watch;

pub use client::{default_grace_period, ClientCore};
pub use error::ClientError;
pub use http::HttpTransport;
pub use transport::Transport;
