use thiserror::Error;

/// Crypto-layer error taxonomy (spec §7: verification failures and
/// insufficient-shares are data-integrity errors, never silently coerced).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CryptoError {
    #[error("unknown signature scheme: {0}")]
    UnknownScheme(String),

    #[error("signature does not verify under the given public key")]
    InvalidSignature,

    #[error("insufficient shares: need {needed}, have {have}")]
    InsufficientShares { needed: usize, have: usize },

    #[error("share at index {0} failed its per-index public-key check")]
    InvalidShare(u16),

    #[error("malformed key, share, or point encoding")]
    Encoding,
}
