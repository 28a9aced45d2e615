use thiserror::Error;

/// DKG/resharing error taxonomy (spec §4.3, §7).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DkgError {
    #[error("fewer than the required number of dealers were qualified")]
    InsufficientQualified,

    #[error("duplicate packet for dealer {dealer}, verifier {verifier} after a decision was made")]
    DuplicatePacket { dealer: u16, verifier: u16 },

    #[error("justification from dealer {0} does not match its published commitments")]
    InvalidJustification(u16),

    #[error("deal from dealer {0} is malformed or fails its commitment check")]
    InvalidDeal(u16),

    #[error("operation invalid in the current state")]
    WrongState,

    #[error("packet addressed to recipient {expected}, this node is {actual}")]
    WrongRecipient { expected: u16, actual: u16 },
}
