use chainbeacon_types::Share;

use crate::error::DkgError;

/// A node's local view of the protocol (spec §4.3). Transitions are driven
/// by `Dkg::handle_*` and `Dkg::finalize`, never by a timer directly — the
/// caller decides when a timeout has elapsed and calls `handle_timeout`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DkgState {
    Fresh,
    DealsIssued,
    ResponsesCollected,
    Justified,
    Finalized,
    Aborted,
}

/// Output of a completed run: the group's public key, this node's combined
/// long-term share, and which dealers ended up qualified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DkgResult {
    pub group_public_key: Vec<u8>,
    pub share: Share,
    pub qualified: Vec<u16>,
}

pub type DkgOutcome = Result<DkgResult, DkgError>;
