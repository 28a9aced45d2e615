use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, Round};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::traits::{ChainStore, Cursor};

/// A thread-safe in-memory backend, for tests and single-process
/// deployments that don't need crash-safety (spec §4.2).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: Arc<RwLock<BTreeMap<u64, BeaconRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChainStore for MemoryStore {
    async fn put(&self, record: BeaconRecord) -> Result<(), StoreError> {
        let mut guard = self.records.write();
        match guard.get(&record.round.0) {
            Some(existing) if existing == &record => Ok(()),
            Some(_) => Err(StoreError::RoundOccupied {
                round: record.round,
            }),
            None => {
                guard.insert(record.round.0, record);
                Ok(())
            }
        }
    }

    async fn get(&self, round: Round) -> Result<BeaconRecord, StoreError> {
        self.records
            .read()
            .get(&round.0)
            .cloned()
            .ok_or(StoreError::NotFound(round))
    }

    async fn last(&self) -> Result<BeaconRecord, StoreError> {
        self.records
            .read()
            .values()
            .next_back()
            .cloned()
            .ok_or(StoreError::Empty)
    }

    async fn len(&self) -> Result<u64, StoreError> {
        Ok(self.records.read().len() as u64)
    }

    async fn del(&self, round: Round) -> Result<(), StoreError> {
        self.records
            .write()
            .remove(&round.0)
            .map(|_| ())
            .ok_or(StoreError::NotFound(round))
    }

    async fn cursor(&self) -> Box<dyn Cursor + '_> {
        Box::new(MemoryCursor {
            records: self.records.read().clone(),
            position: None,
        })
    }
}

/// A snapshot of the map taken at cursor construction; later writes are not
/// visible to an in-flight walk, which keeps iteration monotonic per spec.
struct MemoryCursor {
    records: BTreeMap<u64, BeaconRecord>,
    position: Option<u64>,
}

#[async_trait]
impl Cursor for MemoryCursor {
    async fn first(&mut self) -> Result<BeaconRecord, StoreError> {
        let (round, record) = self.records.iter().next().ok_or(StoreError::Empty)?;
        self.position = Some(*round);
        Ok(record.clone())
    }

    async fn next(&mut self) -> Result<BeaconRecord, StoreError> {
        let after = self.position.map(|p| p + 1).unwrap_or(0);
        let (round, record) = self
            .records
            .range(after..)
            .next()
            .ok_or(StoreError::NotFound(Round(after)))?;
        self.position = Some(*round);
        Ok(record.clone())
    }

    async fn seek(&mut self, target: Round) -> Result<BeaconRecord, StoreError> {
        let (round, record) = self
            .records
            .range(target.0..)
            .next()
            .ok_or(StoreError::NotFound(target))?;
        self.position = Some(*round);
        Ok(record.clone())
    }

    async fn last(&mut self) -> Result<BeaconRecord, StoreError> {
        let (round, record) = self.records.iter().next_back().ok_or(StoreError::Empty)?;
        self.position = Some(*round);
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(round: u64, sig: u8) -> BeaconRecord {
        BeaconRecord {
            round: Round(round),
            previous_signature: vec![sig.wrapping_sub(1)],
            signature: vec![sig],
        }
    }

    #[tokio::test]
    async fn put_is_idempotent_and_rejects_conflicting_overwrite() {
        let store = MemoryStore::new();
        store.put(record(1, 10)).await.unwrap();
        store.put(record(1, 10)).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        let err = store.put(record(1, 99)).await.unwrap_err();
        assert_eq!(err, StoreError::RoundOccupied { round: Round(1) });
    }

    #[tokio::test]
    async fn get_last_len_reflect_contents() {
        let store = MemoryStore::new();
        assert_eq!(store.last().await.unwrap_err(), StoreError::Empty);

        store.put(record(1, 1)).await.unwrap();
        store.put(record(2, 2)).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 2);
        assert_eq!(store.last().await.unwrap(), record(2, 2));
        assert_eq!(store.get(Round(1)).await.unwrap(), record(1, 1));
        assert_eq!(
            store.get(Round(5)).await.unwrap_err(),
            StoreError::NotFound(Round(5))
        );
    }

    #[tokio::test]
    async fn cursor_walks_strictly_ascending_and_exhausts() {
        let store = MemoryStore::new();
        for r in [1, 3, 7] {
            store.put(record(r, r as u8)).await.unwrap();
        }
        let mut cursor = store.cursor().await;
        assert_eq!(cursor.first().await.unwrap().round, Round(1));
        assert_eq!(cursor.next().await.unwrap().round, Round(3));
        assert_eq!(cursor.next().await.unwrap().round, Round(7));
        assert!(cursor.next().await.is_err());
    }

    #[tokio::test]
    async fn cursor_seek_lands_on_smallest_round_at_or_above_target() {
        let store = MemoryStore::new();
        for r in [1, 3, 7] {
            store.put(record(r, r as u8)).await.unwrap();
        }
        let mut cursor = store.cursor().await;
        assert_eq!(cursor.seek(Round(4)).await.unwrap().round, Round(7));
        assert_eq!(cursor.next().await.unwrap_err(), StoreError::NotFound(Round(8)));
    }

    #[tokio::test]
    async fn del_removes_round_for_test_use() {
        let store = MemoryStore::new();
        store.put(record(1, 1)).await.unwrap();
        store.del(Round(1)).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 0);
    }
}
