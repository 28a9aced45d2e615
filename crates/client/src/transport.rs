use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, ChainInfo, Round};

use crate::error::ClientError;

/// Contract shared by every provider of rounds for a beacon (spec §4.5
/// "transport clients"). `Round::GENESIS_SENTINEL` means "latest available".
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, round: Round) -> Result<BeaconRecord, ClientError>;

    async fn info(&self) -> Result<ChainInfo, ClientError>;

    /// Human-readable label used in logs and RTT-stats reporting.
    fn name(&self) -> &str;
}
