use std::collections::HashMap;
use std::sync::Arc;

use chainbeacon_crypto::poly::PubPoly;
use chainbeacon_crypto::{bls, threshold, CryptoError, Scheme};
use chainbeacon_store::{ChainStore, StoreError};
use chainbeacon_types::{BeaconRecord, Group, PartialSignature, Round, Share};
use tokio::sync::{broadcast, Mutex};

use crate::aggregator::RoundAggregator;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::peer_source::PeerSource;

fn pub_poly_from_group(group: &Group) -> Result<PubPoly, EngineError> {
    let commits: Vec<[u8; 48]> = group
        .public_polynomial_commits
        .iter()
        .map(|c| c.as_slice().try_into().map_err(|_| CryptoError::Encoding))
        .collect::<Result<_, _>>()
        .map_err(|_| EngineError::InvalidPartial { signer_index: 0 })?;
    PubPoly::from_compressed(&commits).ok_or(EngineError::InvalidPartial { signer_index: 0 })
}

/// Drives the periodic round protocol for one beacon and persists the
/// result (spec §4.4). Networking is the caller's concern: `sign_round`
/// produces the partial to broadcast, `ingest_partial` consumes partials
/// received from peers, and `catch_up` pulls already-finalized rounds
/// through a `PeerSource`.
pub struct Engine {
    store: Arc<dyn ChainStore>,
    group: Group,
    share: Share,
    scheme: Scheme,
    config: EngineConfig,
    aggregators: Mutex<HashMap<u64, RoundAggregator>>,
    future_buffer: Mutex<HashMap<u64, Vec<PartialSignature>>>,
    notifier: broadcast::Sender<BeaconRecord>,
}

impl Engine {
    pub fn new(store: Arc<dyn ChainStore>, group: Group, share: Share, scheme: Scheme, config: EngineConfig) -> Self {
        let (notifier, _) = broadcast::channel(64);
        Engine {
            store,
            group,
            share,
            scheme,
            config,
            aggregators: Mutex::new(HashMap::new()),
            future_buffer: Mutex::new(HashMap::new()),
            notifier,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BeaconRecord> {
        self.notifier.subscribe()
    }

    async fn previous_signature_for(&self, round: Round) -> Result<Vec<u8>, EngineError> {
        match round.previous() {
            None => Ok(self.group.chain_info.genesis_seed.clone()),
            Some(prev) if prev.is_genesis() => Ok(self.group.chain_info.genesis_seed.clone()),
            Some(prev) => Ok(self.store.get(prev).await?.signature),
        }
    }

    async fn last_known(&self) -> Result<(Round, Vec<u8>), EngineError> {
        match self.store.last().await {
            Ok(record) => Ok((record.round, record.signature)),
            Err(StoreError::Empty) => Ok((Round::GENESIS_SENTINEL, self.group.chain_info.genesis_seed.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Sign `round` with the local share (spec §4.4.2 steps 1-2).
    pub async fn sign_round(&self, round: Round) -> Result<PartialSignature, EngineError> {
        let previous_signature = self.previous_signature_for(round).await?;
        let message = self.scheme.canonical_message(&previous_signature, round.0);
        let scalar = self
            .share
            .scalar()
            .map_err(|_| EngineError::InvalidPartial { signer_index: self.share.index })?;
        let point = threshold::sign_share(scalar, &message);
        Ok(PartialSignature {
            signer_index: self.share.index,
            value: threshold::g2_to_bytes(&point).to_vec(),
        })
    }

    /// Consume a partial received from a peer (spec §4.4.2 steps 4-7).
    /// `current_round` is the scheduler's present round, used to decide
    /// whether to process, buffer, or discard.
    pub async fn ingest_partial(
        &self,
        current_round: Round,
        round: Round,
        partial: PartialSignature,
    ) -> Result<Option<BeaconRecord>, EngineError> {
        let (last_round, _) = self.last_known().await?;
        if round.0 <= last_round.0 {
            tracing::debug!(round = round.0, "partial for an already-finalized round, ignoring");
            return Ok(None);
        }
        if round.0 > current_round.0 + 1 + self.config.max_future {
            tracing::debug!(round = round.0, "partial too far in the future, discarding");
            return Ok(None);
        }
        if round.0 > current_round.0 + 1 {
            self.future_buffer.lock().await.entry(round.0).or_default().push(partial);
            return Ok(None);
        }

        let outcome = self.process_partial(round, partial).await?;
        if outcome.is_some() {
            self.drain_future_buffer(round.next()).await;
        }
        Ok(outcome)
    }

    async fn drain_future_buffer(&self, round: Round) {
        let pending = self.future_buffer.lock().await.remove(&round.0);
        if let Some(partials) = pending {
            for partial in partials {
                let _ = Box::pin(self.process_partial(round, partial)).await;
            }
        }
    }

    async fn process_partial(
        &self,
        round: Round,
        partial: PartialSignature,
    ) -> Result<Option<BeaconRecord>, EngineError> {
        let pub_poly = pub_poly_from_group(&self.group)?;
        let point = threshold::g2_from_bytes(&partial.value)
            .map_err(|_| EngineError::InvalidPartial { signer_index: partial.signer_index })?;
        let previous_signature = self.previous_signature_for(round).await?;
        let message = self.scheme.canonical_message(&previous_signature, round.0);
        let pk_share = pub_poly.eval(partial.signer_index as u64);
        if !threshold::verify_partial(pk_share, &message, point) {
            return Err(EngineError::InvalidPartial { signer_index: partial.signer_index });
        }

        let recovered = {
            let mut aggregators = self.aggregators.lock().await;
            let agg = aggregators.entry(round.0).or_default();
            agg.insert(partial.signer_index, point);
            if !agg.ready(self.group.threshold) {
                return Ok(None);
            }
            let recovered = agg.recover(self.group.threshold).map_err(|_| EngineError::InsufficientShares { round })?;
            aggregators.remove(&round.0);
            recovered
        };

        let signature = threshold::g2_to_bytes(&recovered).to_vec();
        bls::verify_beacon(self.scheme, &self.group.chain_info.public_key, &previous_signature, round.0, &signature)
            .map_err(|_| EngineError::InvalidSignature { round })?;

        let record = BeaconRecord { round, previous_signature, signature };
        match self.store.put(record.clone()).await {
            Ok(()) => {
                let _ = self.notifier.send(record.clone());
                Ok(Some(record))
            }
            Err(StoreError::RoundOccupied { round }) => Err(EngineError::ChainFork { round }),
            Err(e) => Err(e.into()),
        }
    }

    /// Pull and verify missing rounds ascending until caught up (spec
    /// §4.4.3). Aborts at the first verification failure; the caller is
    /// expected to retry against a different `PeerSource`.
    pub async fn catch_up(&self, peer: &dyn PeerSource, current_round: Round) -> Result<(), EngineError> {
        loop {
            let (last_round, last_signature) = self.last_known().await?;
            if last_round.0 + 1 >= current_round.0 {
                return Ok(());
            }
            let next_round = last_round.next();
            let record = peer
                .fetch_round(next_round)
                .await
                .map_err(|_| EngineError::CatchUpVerification { round: next_round })?;
            if record.previous_signature != last_signature {
                return Err(EngineError::CatchUpVerification { round: next_round });
            }
            bls::verify_beacon(
                self.scheme,
                &self.group.chain_info.public_key,
                &record.previous_signature,
                next_round.0,
                &record.signature,
            )
            .map_err(|_| EngineError::CatchUpVerification { round: next_round })?;
            self.store.put(record).await?;
        }
    }
}
