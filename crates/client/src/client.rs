use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, ChainInfo, Round};
use tokio::sync::mpsc;

use crate::cache::RecordCache;
use crate::error::ClientError;
use crate::optimising::OptimisingClient;
use crate::transport::Transport;
use crate::verify::Verifier;
use crate::watch::{RoundSource, WatchAggregator};

const MAX_VERIFICATION_ATTEMPTS: u32 = 3;

/// `max(period, 1s)`, the default window before a silent transport is
/// deprioritised (spec §4.5 failure semantics leave the exact default
/// implementation-defined).
pub fn default_grace_period(period: Duration) -> Duration {
    period.max(Duration::from_secs(1))
}

struct Inner {
    verifier: Verifier,
    cache: RecordCache,
    optimising: OptimisingClient,
}

async fn fetch_and_verify(inner: &Inner, round: Round) -> Result<BeaconRecord, ClientError> {
    if !round.is_genesis() {
        if let Some(cached) = inner.cache.get(round) {
            return Ok(cached);
        }
    }
    for attempt in 1..=MAX_VERIFICATION_ATTEMPTS {
        let (idx, record) = inner.optimising.get_raw(round).await?;
        let previous = record.round.previous().and_then(|p| inner.cache.get(p));
        match inner.verifier.verify(previous.as_ref(), &record) {
            Ok(()) => {
                inner.cache.insert(record.clone());
                return Ok(record);
            }
            Err(err) => {
                inner.optimising.penalize(idx);
                if attempt == MAX_VERIFICATION_ATTEMPTS {
                    return Err(err);
                }
            }
        }
    }
    unreachable!("loop returns before exhausting MAX_VERIFICATION_ATTEMPTS")
}

#[async_trait]
impl RoundSource for Inner {
    async fn poll_next(&self, after: Round) -> Result<Option<BeaconRecord>, ClientError> {
        match fetch_and_verify(self, after.next()).await {
            Ok(record) => Ok(Some(record)),
            Err(_) => Ok(None),
        }
    }
}

/// Top-level client (spec §4.5): owns the transports, the verifying cache,
/// and the watch aggregator. A `Verifier` only borrows the chain info it
/// needs, so it never needs to reach back into the transports (spec §9
/// "cyclic reference" note).
pub struct ClientCore {
    inner: Arc<Inner>,
    watch_aggregator: Arc<WatchAggregator>,
    closed: AtomicBool,
}

impl ClientCore {
    pub fn new(
        transports: Vec<Arc<dyn Transport>>,
        chain_info: ChainInfo,
        grace_period: Duration,
        cache_capacity: usize,
        poll_interval: Duration,
        auto_watch: bool,
    ) -> Arc<Self> {
        let inner = Arc::new(Inner {
            verifier: Verifier::new(chain_info),
            cache: RecordCache::new(cache_capacity),
            optimising: OptimisingClient::new(transports, grace_period),
        });
        let source: Arc<dyn RoundSource> = inner.clone();
        let watch_aggregator = WatchAggregator::new(source, poll_interval, auto_watch);
        Arc::new(ClientCore { inner, watch_aggregator, closed: AtomicBool::new(false) })
    }

    /// Runs the initial speed test and chain-hash check against every
    /// transport. Not required before the first `get`, but recommended so
    /// the first real request already benefits from RTT ordering.
    pub async fn bootstrap(&self) {
        self.inner.optimising.speed_test(Round::GENESIS_SENTINEL).await;
        let expected = self.inner.verifier.chain_info().chain_hash();
        self.inner.optimising.verify_chain_hashes(expected).await;
    }

    pub async fn get(&self, round: Round) -> Result<BeaconRecord, ClientError> {
        self.ensure_open()?;
        fetch_and_verify(&self.inner, round).await
    }

    pub fn watch(self: &Arc<Self>) -> mpsc::Receiver<BeaconRecord> {
        self.watch_aggregator.subscribe()
    }

    pub fn info(&self) -> Result<ChainInfo, ClientError> {
        self.ensure_open()?;
        Ok(self.inner.verifier.chain_info().clone())
    }

    /// `round = ((t - genesis_time) / period) + 1`, the same formula the
    /// engine's scheduler uses to decide what round is currently due.
    /// Period math is done in milliseconds so sub-second periods don't
    /// truncate to zero and divide by zero.
    pub fn round_at(&self, at: SystemTime) -> Round {
        let info = self.inner.verifier.chain_info();
        let now_ms = at.duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64;
        let genesis_ms = info.genesis_time.saturating_mul(1000);
        let period_ms = info.period.as_millis() as u64;
        if now_ms < genesis_ms || period_ms == 0 {
            return Round::GENESIS_SENTINEL;
        }
        Round((now_ms - genesis_ms) / period_ms + 1)
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn ensure_open(&self) -> Result<(), ClientError> {
        if self.closed.load(Ordering::SeqCst) {
            Err(ClientError::ClientClosed)
        } else {
            Ok(())
        }
    }
}
