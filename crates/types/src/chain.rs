use std::time::Duration;

use sha2::{Digest, Sha256};

use chainbeacon_crypto::Scheme;

use crate::identity::Identity;

/// Everything a client needs to verify signatures from one beacon chain
/// without contacting a node first (spec §3, §6 `/info`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChainInfo {
    #[serde(with = "hex::serde")]
    pub public_key: Vec<u8>,
    pub period: Duration,
    pub genesis_time: u64,
    #[serde(with = "hex::serde")]
    pub genesis_seed: Vec<u8>,
    pub scheme: Scheme,
    pub beacon_id: String,
}

impl ChainInfo {
    /// The chain hash identifies a chain independent of which node serves
    /// it; two nodes with the same hash are interchangeable for a client.
    /// Bit-exact: `sha256(scheme_name ‖ beacon_id ‖ period_ms_be_u64 ‖
    /// genesis_time_be_u64 ‖ genesis_seed ‖ public_key)` (spec §6).
    pub fn chain_hash(&self) -> [u8; 32] {
        let period_ms: u64 = self.period.as_millis() as u64;
        let mut hasher = Sha256::new();
        hasher.update(self.scheme.name().as_bytes());
        hasher.update(self.beacon_id.as_bytes());
        hasher.update(period_ms.to_be_bytes());
        hasher.update(self.genesis_time.to_be_bytes());
        hasher.update(&self.genesis_seed);
        hasher.update(&self.public_key);
        hasher.finalize().into()
    }
}

/// The working set of a beacon chain: who signs, how many signatures are
/// required, and the chain identity they jointly produce (spec §3).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Group {
    pub nodes: Vec<Identity>,
    pub threshold: u16,
    pub chain_info: ChainInfo,
    pub transition_time: Option<u64>,
    /// The DKG's combined public polynomial commitments (one per
    /// coefficient, 48-byte compressed G1 points). The engine evaluates
    /// this at a signer's index to get the per-index public key share it
    /// verifies partial signatures against (spec §4.4.2 step 4); absent
    /// `chainbeacon_dkg::DkgResult::share::public_commits` field of any
    /// member is the same vector.
    #[serde(default)]
    pub public_polynomial_commits: Vec<Vec<u8>>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GroupError {
    #[error("threshold {threshold} is below the minimum {minimum} for {n} nodes")]
    ThresholdTooLow {
        threshold: u16,
        minimum: u16,
        n: usize,
    },
    #[error("group has no nodes")]
    Empty,
}

impl Group {
    /// `floor(n/2) + 1`, the smallest threshold under which a single
    /// network partition could see two disjoint quorums sign conflicting
    /// rounds.
    pub fn minimum_threshold(n: usize) -> u16 {
        (n / 2 + 1) as u16
    }

    pub fn validate(&self) -> Result<(), GroupError> {
        if self.nodes.is_empty() {
            return Err(GroupError::Empty);
        }
        let minimum = Self::minimum_threshold(self.nodes.len());
        if self.threshold < minimum {
            return Err(GroupError::ThresholdTooLow {
                threshold: self.threshold,
                minimum,
                n: self.nodes.len(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_chain_info() -> ChainInfo {
        ChainInfo {
            public_key: vec![1, 2, 3],
            period: Duration::from_secs(3),
            genesis_time: 1_600_000_000,
            genesis_seed: vec![9, 9],
            scheme: Scheme::PedersenBlsChained,
            beacon_id: "default".into(),
        }
    }

    #[test]
    fn chain_hash_is_sensitive_to_every_field() {
        let base = sample_chain_info();
        let mut other = base.clone();
        other.genesis_time += 1;
        assert_ne!(base.chain_hash(), other.chain_hash());
    }

    #[test]
    fn minimum_threshold_matches_majority_rule() {
        assert_eq!(Group::minimum_threshold(5), 3);
        assert_eq!(Group::minimum_threshold(4), 3);
        assert_eq!(Group::minimum_threshold(1), 1);
    }

    #[test]
    fn validate_rejects_low_threshold() {
        let g = Group {
            nodes: vec![
                Identity::new("a", vec![1], false),
                Identity::new("b", vec![2], false),
                Identity::new("c", vec![3], false),
            ],
            threshold: 1,
            chain_info: sample_chain_info(),
            transition_time: None,
            public_polynomial_commits: Vec::new(),
        };
        assert_eq!(
            g.validate(),
            Err(GroupError::ThresholdTooLow {
                threshold: 1,
                minimum: 2,
                n: 3
            })
        );
    }
}
