use std::sync::Arc;
use std::time::{Duration, Instant};

use chainbeacon_types::{BeaconRecord, ChainInfo, Round};

use crate::error::ClientError;
use crate::stats::StatsTable;
use crate::transport::Transport;

/// Dispatches requests to the fastest transports first, fanning out
/// `concurrency` candidates at a time and falling through on failure
/// (spec §4.5 step 4).
pub struct OptimisingClient {
    transports: Vec<Arc<dyn Transport>>,
    stats: StatsTable,
    concurrency: usize,
    grace_period: Duration,
}

impl OptimisingClient {
    pub fn new(transports: Vec<Arc<dyn Transport>>, grace_period: Duration) -> Self {
        let stats = StatsTable::new(transports.len());
        OptimisingClient { transports, stats, concurrency: 2, grace_period }
    }

    /// One `get` to every transport, seeding the RTT table (spec §4.5
    /// step 4 "seeded by an initial speed test").
    pub async fn speed_test(&self, probe_round: Round) {
        let mut set = tokio::task::JoinSet::new();
        for (idx, transport) in self.transports.iter().cloned().enumerate() {
            set.spawn(async move {
                let started = Instant::now();
                let result = transport.get(probe_round).await;
                (idx, started.elapsed(), result.is_ok())
            });
        }
        while let Some(joined) = set.join_next().await {
            if let Ok((idx, elapsed, ok)) = joined {
                if ok {
                    self.stats.record_success(idx, elapsed);
                } else {
                    self.stats.record_failure(idx, self.grace_period);
                }
            }
        }
    }

    /// Verifies every transport's chain hash against `expected`, permanently
    /// disabling any that disagree (spec §4.5 failure semantics, S5).
    pub async fn verify_chain_hashes(&self, expected: [u8; 32]) {
        for (idx, transport) in self.transports.iter().enumerate() {
            if self.stats.is_disabled(idx) {
                continue;
            }
            match transport.info().await {
                Ok(info) if info.chain_hash() == expected => {}
                Ok(_) => self.stats.disable(idx),
                Err(_) => self.stats.record_failure(idx, self.grace_period),
            }
        }
    }

    pub async fn info(&self) -> Result<ChainInfo, ClientError> {
        let mut last_err = None;
        for idx in self.stats.ordered_indices() {
            match self.transports[idx].info().await {
                Ok(info) => return Ok(info),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| ClientError::Transport("no transports configured".into())))
    }

    /// Raw (unverified) fetch with failover. Returns the index of the
    /// transport that answered so the caller can penalize it separately if
    /// the record turns out to fail verification.
    pub async fn get_raw(&self, round: Round) -> Result<(usize, BeaconRecord), ClientError> {
        let order = self.stats.ordered_indices();
        if order.is_empty() {
            return Err(ClientError::NotFound(round));
        }
        for batch in order.chunks(self.concurrency) {
            let mut set = tokio::task::JoinSet::new();
            for &idx in batch {
                let transport = self.transports[idx].clone();
                set.spawn(async move {
                    let started = Instant::now();
                    let result = transport.get(round).await;
                    (idx, started.elapsed(), result)
                });
            }
            while let Some(joined) = set.join_next().await {
                let (idx, elapsed, result) = joined.map_err(|e| ClientError::Transport(e.to_string()))?;
                match result {
                    Ok(record) => {
                        self.stats.record_success(idx, elapsed);
                        return Ok((idx, record));
                    }
                    Err(ClientError::NotFound(_)) => self.stats.record_success(idx, elapsed),
                    Err(_) => self.stats.record_failure(idx, self.grace_period),
                }
            }
        }
        Err(ClientError::NotFound(round))
    }

    pub fn penalize(&self, idx: usize) {
        self.stats.record_failure(idx, self.grace_period);
    }
}
