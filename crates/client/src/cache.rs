use chainbeacon_types::{BeaconRecord, Round};
use hashlink::LruCache;
use parking_lot::Mutex;

/// Verified-only round cache (spec §4.5 step 2). `round = 0` ("latest")
/// always bypasses the cache; only already-verified records are inserted.
pub struct RecordCache {
    inner: Mutex<LruCache<u64, BeaconRecord>>,
}

impl RecordCache {
    pub fn new(capacity: usize) -> Self {
        RecordCache { inner: Mutex::new(LruCache::new(capacity)) }
    }

    pub fn get(&self, round: Round) -> Option<BeaconRecord> {
        if round.is_genesis() {
            return None;
        }
        self.inner.lock().get(&round.0).cloned()
    }

    pub fn insert(&self, record: BeaconRecord) {
        if record.round.is_genesis() {
            return;
        }
        self.inner.lock().insert(record.round.0, record);
    }
}
