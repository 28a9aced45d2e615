use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, Round};

use crate::error::EngineError;

/// A source of already-signed rounds for catch-up (spec §4.4.3). Wire
/// framing is a spec Non-goal, so this crate only names the seam; a
/// concrete implementation lives in `chainbeacon-client`.
#[async_trait]
pub trait PeerSource: Send + Sync {
    async fn fetch_round(&self, round: Round) -> Result<BeaconRecord, EngineError>;
}
