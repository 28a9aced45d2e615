use chainbeacon_types::Round;
use thiserror::Error;

/// Client-side error taxonomy (spec §4.5, §7).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("round {0} not found on any configured transport")]
    NotFound(Round),

    #[error("record for round {round} failed verification: {reason}")]
    Verification { round: Round, reason: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transport's chain hash does not match the configured one")]
    ChainHashMismatch,

    #[error("client is closed")]
    ClientClosed,

    #[error("operation was cancelled")]
    Cancelled,
}
