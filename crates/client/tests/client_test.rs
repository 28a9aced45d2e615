use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chainbeacon_client::{ClientCore, ClientError, Transport};
use bls_signatures::Serialize as _;
use chainbeacon_crypto::{bls, Scheme};
use chainbeacon_types::{BeaconRecord, ChainInfo, Round};

struct FailingTransport {
    calls: AtomicUsize,
}

#[async_trait]
impl Transport for FailingTransport {
    async fn get(&self, _round: Round) -> Result<BeaconRecord, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ClientError::Transport("connection refused".into()))
    }

    async fn info(&self) -> Result<ChainInfo, ClientError> {
        Err(ClientError::Transport("connection refused".into()))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

struct StaticTransport {
    record: BeaconRecord,
    chain_info: ChainInfo,
}

#[async_trait]
impl Transport for StaticTransport {
    async fn get(&self, round: Round) -> Result<BeaconRecord, ClientError> {
        if round.is_genesis() || round == self.record.round {
            Ok(self.record.clone())
        } else {
            Err(ClientError::NotFound(round))
        }
    }

    async fn info(&self) -> Result<ChainInfo, ClientError> {
        Ok(self.chain_info.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

fn signed_round(round: u64, previous_signature: Vec<u8>, private_key: &bls_signatures::PrivateKey) -> BeaconRecord {
    use sha2::{Digest, Sha256};
    let mut msg = previous_signature.clone();
    msg.extend_from_slice(&round.to_be_bytes());
    let digest = Sha256::digest(&msg);
    let signature = bls::sign(&private_key.as_bytes(), &digest).unwrap();
    BeaconRecord { round: Round(round), previous_signature, signature }
}

fn chain_info(public_key: Vec<u8>) -> ChainInfo {
    ChainInfo {
        public_key,
        period: Duration::from_secs(1),
        genesis_time: 0,
        genesis_seed: vec![0xDE, 0xAD],
        scheme: Scheme::PedersenBlsChained,
        beacon_id: "default".into(),
    }
}

#[tokio::test]
async fn failover_skips_broken_transport() {
    use bls_signatures::{PrivateKey, Serialize};
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(7);
    let sk = PrivateKey::generate(&mut rng);
    let info = chain_info(sk.public_key().as_bytes());
    let record = signed_round(1, info.genesis_seed.clone(), &sk);

    let failing = Arc::new(FailingTransport { calls: AtomicUsize::new(0) });
    let good = Arc::new(StaticTransport { record: record.clone(), chain_info: info.clone() });

    let client = ClientCore::new(
        vec![failing.clone(), good.clone()],
        info,
        Duration::from_secs(5),
        16,
        Duration::from_millis(10),
        false,
    );

    let got = client.get(Round(1)).await.unwrap();
    assert_eq!(got, record);
    assert!(failing.calls.load(Ordering::SeqCst) > 0, "the broken transport should have been tried");
}

#[tokio::test]
async fn closed_client_rejects_requests() {
    use bls_signatures::{PrivateKey, Serialize};
    use rand::SeedableRng;

    let mut rng = rand::rngs::StdRng::seed_from_u64(8);
    let sk = PrivateKey::generate(&mut rng);
    let info = chain_info(sk.public_key().as_bytes());
    let record = signed_round(1, info.genesis_seed.clone(), &sk);
    let transport = Arc::new(StaticTransport { record, chain_info: info.clone() });

    let client = ClientCore::new(vec![transport], info, Duration::from_secs(5), 16, Duration::from_millis(10), false);
    client.close();
    let err = client.get(Round(1)).await.unwrap_err();
    assert!(matches!(err, ClientError::ClientClosed));
}
