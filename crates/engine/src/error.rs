use chainbeacon_store::StoreError;
use chainbeacon_types::Round;
use thiserror::Error;

/// Engine error taxonomy (spec §4.4, §7).
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("persisted signature at round {round} disagrees with the locally recovered one")]
    ChainFork { round: Round },

    #[error("fewer than the threshold of valid partials were collected for round {round}")]
    InsufficientShares { round: Round },

    #[error("partial from signer {signer_index} failed its per-index verification")]
    InvalidPartial { signer_index: u16 },

    #[error("recovered signature for round {round} does not verify under the group public key")]
    InvalidSignature { round: Round },

    #[error("catch-up record for round {round} failed verification")]
    CatchUpVerification { round: Round },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("engine was cancelled")]
    Cancelled,
}
