use chainbeacon_types::Round;
use thiserror::Error;

/// Chain-store error taxonomy (spec §4.2, §7).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("round {0} not found")]
    NotFound(Round),

    #[error("store is empty")]
    Empty,

    #[error("round {round} is already occupied by a different record")]
    RoundOccupied { round: Round },

    #[error("backend error: {0}")]
    Backend(String),
}

impl PartialEq for StoreError {
    fn eq(&self, other: &Self) -> bool {
        use StoreError::*;
        match (self, other) {
            (NotFound(a), NotFound(b)) => a == b,
            (Empty, Empty) => true,
            (RoundOccupied { round: a }, RoundOccupied { round: b }) => a == b,
            (Backend(a), Backend(b)) => a == b,
            _ => false,
        }
    }
}
