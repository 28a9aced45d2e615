use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, Round};

use crate::error::StoreError;

/// Per-beacon persistence of round records with deterministic ascending
/// iteration (spec §4.2). Implementors must make an acknowledged `put`
/// durable across a process restart.
#[async_trait]
pub trait ChainStore: Send + Sync {
    /// Idempotent write: re-putting an identical record is a no-op;
    /// writing a different record at an occupied round fails.
    async fn put(&self, record: BeaconRecord) -> Result<(), StoreError>;

    async fn get(&self, round: Round) -> Result<BeaconRecord, StoreError>;

    async fn last(&self) -> Result<BeaconRecord, StoreError>;

    async fn len(&self) -> Result<u64, StoreError>;

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }

    /// Test-only: production callers should not delete rounds.
    async fn del(&self, round: Round) -> Result<(), StoreError>;

    async fn cursor(&self) -> Box<dyn Cursor + '_>;
}

/// A snapshot-positioned walk over a store's rounds in strictly ascending
/// order (spec §4.2).
#[async_trait]
pub trait Cursor: Send + Sync {
    async fn first(&mut self) -> Result<BeaconRecord, StoreError>;

    /// Returns `NotFound` once past the last record.
    async fn next(&mut self) -> Result<BeaconRecord, StoreError>;

    /// Positions the cursor so the following `next` returns the smallest
    /// record with `round >= target`.
    async fn seek(&mut self, target: Round) -> Result<BeaconRecord, StoreError>;

    async fn last(&mut self) -> Result<BeaconRecord, StoreError>;
}
