use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainbeacon_types::{BeaconRecord, Round};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::ClientError;

/// Supplies the next round after `after`, or `None` if it isn't available
/// yet. Implemented by `ClientCore`; errors (including verification
/// failures) are swallowed into `None` so a watch never terminates on a
/// single bad source (spec §4.5 step 5, §7 propagation policy).
#[async_trait]
pub trait RoundSource: Send + Sync {
    async fn poll_next(&self, after: Round) -> Result<Option<BeaconRecord>, ClientError>;
}

struct WatchState {
    subscribers: Vec<mpsc::Sender<BeaconRecord>>,
    task: Option<JoinHandle<()>>,
    last_delivered: Round,
}

/// Multiplexes one upstream poll loop to many subscribers (spec §4.5
/// step 3). The loop starts with the first subscriber and stops with the
/// last, unless `auto_watch` keeps it running for the client's lifetime.
pub struct WatchAggregator {
    source: Arc<dyn RoundSource>,
    poll_interval: Duration,
    auto_watch: bool,
    state: Mutex<WatchState>,
}

impl WatchAggregator {
    pub fn new(source: Arc<dyn RoundSource>, poll_interval: Duration, auto_watch: bool) -> Arc<Self> {
        let aggregator = Arc::new(WatchAggregator {
            source,
            poll_interval,
            auto_watch,
            state: Mutex::new(WatchState { subscribers: Vec::new(), task: None, last_delivered: Round::GENESIS_SENTINEL }),
        });
        if auto_watch {
            aggregator.clone().ensure_running();
        }
        aggregator
    }

    pub fn subscribe(self: &Arc<Self>) -> mpsc::Receiver<BeaconRecord> {
        let (tx, rx) = mpsc::channel(32);
        self.state.lock().subscribers.push(tx);
        self.clone().ensure_running();
        rx
    }

    fn ensure_running(self: Arc<Self>) {
        let mut state = self.state.lock();
        if state.task.is_none() {
            let aggregator = self.clone();
            state.task = Some(tokio::spawn(async move { aggregator.run().await }));
        }
    }

    async fn run(self: Arc<Self>) {
        loop {
            let after = self.state.lock().last_delivered;
            match self.source.poll_next(after).await {
                Ok(Some(record)) => {
                    let mut state = self.state.lock();
                    state.last_delivered = record.round;
                    state.subscribers.retain(|tx| match tx.try_send(record.clone()) {
                        Ok(()) => true,
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            tracing::warn!("watch subscriber too slow, dropping it");
                            false
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => false,
                    });
                    if state.subscribers.is_empty() && !self.auto_watch {
                        state.task = None;
                        return;
                    }
                }
                Ok(None) | Err(_) => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}
