use std::time::{Duration, Instant};

use parking_lot::RwLock;

/// Per-transport health, protected by one read-write mutex (spec §5
/// "the optimising client's stats table is protected by a single
/// read-write mutex").
#[derive(Clone, Debug)]
pub struct TransportStats {
    pub rtt: Duration,
    pub last_success: Option<Instant>,
    /// Set once and never cleared: wrong chain hash (spec §4.5 failure
    /// semantics, scenario S5).
    pub disabled: bool,
    /// Cleared the next time the transport answers inside `grace_period`.
    pub deprioritized: bool,
}

impl Default for TransportStats {
    fn default() -> Self {
        TransportStats { rtt: Duration::from_secs(3600), last_success: None, disabled: false, deprioritized: false }
    }
}

pub struct StatsTable {
    inner: RwLock<Vec<TransportStats>>,
}

impl StatsTable {
    pub fn new(len: usize) -> Self {
        StatsTable { inner: RwLock::new(vec![TransportStats::default(); len]) }
    }

    /// Ascending-RTT order, disabled transports excluded, deprioritised
    /// ones pushed after every healthy one (spec §4.5 step 4).
    pub fn ordered_indices(&self) -> Vec<usize> {
        let stats = self.inner.read();
        let mut healthy: Vec<usize> = (0..stats.len()).filter(|&i| !stats[i].disabled && !stats[i].deprioritized).collect();
        healthy.sort_by_key(|&i| stats[i].rtt);
        let mut deprioritized: Vec<usize> = (0..stats.len()).filter(|&i| !stats[i].disabled && stats[i].deprioritized).collect();
        deprioritized.sort_by_key(|&i| stats[i].rtt);
        healthy.extend(deprioritized);
        healthy
    }

    pub fn record_success(&self, idx: usize, rtt: Duration) {
        let mut stats = self.inner.write();
        stats[idx].rtt = rtt;
        stats[idx].last_success = Some(Instant::now());
        stats[idx].deprioritized = false;
    }

    pub fn record_failure(&self, idx: usize, grace_period: Duration) {
        let mut stats = self.inner.write();
        let stale = stats[idx].last_success.map(|t| t.elapsed() > grace_period).unwrap_or(true);
        if stale {
            stats[idx].deprioritized = true;
        }
    }

    pub fn disable(&self, idx: usize) {
        self.inner.write()[idx].disabled = true;
    }

    pub fn is_disabled(&self, idx: usize) -> bool {
        self.inner.read()[idx].disabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_ascending_rtt() {
        let table = StatsTable::new(3);
        table.record_success(0, Duration::from_millis(50));
        table.record_success(1, Duration::from_millis(10));
        table.record_success(2, Duration::from_millis(30));
        assert_eq!(table.ordered_indices(), vec![1, 2, 0]);
    }

    #[test]
    fn disabled_transports_are_excluded() {
        let table = StatsTable::new(2);
        table.disable(0);
        assert_eq!(table.ordered_indices(), vec![1]);
    }
}
