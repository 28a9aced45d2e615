use chainbeacon_crypto::bls;
use chainbeacon_types::{BeaconRecord, ChainInfo};

use crate::error::ClientError;

/// Verifies records against one chain's public key before they reach a
/// caller (spec §4.5 step 5). Chain-link verification only runs when the
/// caller has the previous record on hand (e.g. from the cache).
pub struct Verifier {
    chain_info: ChainInfo,
}

impl Verifier {
    pub fn new(chain_info: ChainInfo) -> Self {
        Verifier { chain_info }
    }

    pub fn chain_info(&self) -> &ChainInfo {
        &self.chain_info
    }

    pub fn verify(&self, previous: Option<&BeaconRecord>, record: &BeaconRecord) -> Result<(), ClientError> {
        if let Some(previous) = previous {
            if previous.signature != record.previous_signature {
                return Err(ClientError::Verification {
                    round: record.round,
                    reason: "previous_signature does not chain to the cached prior record".into(),
                });
            }
        }
        bls::verify_beacon(
            self.chain_info.scheme,
            &self.chain_info.public_key,
            &record.previous_signature,
            record.round.0,
            &record.signature,
        )
        .map_err(|e| ClientError::Verification { round: record.round, reason: e.to_string() })
    }
}
