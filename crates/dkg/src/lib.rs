//! Pedersen DKG and resharing state machine (spec §4.3). One `Dkg` value
//! models a single node's local view of the protocol; the caller is
//! responsible for transporting deals/responses/justifications between
//! nodes and for detecting timeouts.

mod dkg;
mod error;
mod state;

pub use dkg::{Dkg, DkgConfig};
pub use error::DkgError;
pub use state::{DkgOutcome, DkgResult, DkgState};
