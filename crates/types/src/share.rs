use chainbeacon_crypto::threshold;
use chainbeacon_crypto::{CryptoError, Scalar};

/// One signer's contribution to a round signature, before aggregation
/// (spec §3).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PartialSignature {
    pub signer_index: u16,
    #[serde(with = "hex::serde")]
    pub value: Vec<u8>,
}

/// A node's long-lived threshold key material: its private polynomial
/// share and the public commitments needed to verify any signature it
/// produces (spec §3). Stored as raw bytes so the type round-trips through
/// serde without exposing the curve crate at the call site.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Share {
    pub index: u16,
    #[serde(with = "hex::serde")]
    private: Vec<u8>,
    #[serde(with = "crate::hex_commits")]
    pub public_commits: Vec<[u8; 48]>,
}

impl Share {
    pub fn from_scalar(index: u16, private: Scalar, public_commits: Vec<[u8; 48]>) -> Self {
        Share {
            index,
            private: threshold::scalar_to_bytes(&private).to_vec(),
            public_commits,
        }
    }

    pub fn scalar(&self) -> Result<Scalar, CryptoError> {
        let arr: [u8; 32] = self.private.clone().try_into().map_err(|_| CryptoError::Encoding)?;
        threshold::scalar_from_bytes(&arr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainbeacon_crypto::poly::Poly;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn share_round_trips_through_json() {
        let mut rng = StdRng::seed_from_u64(1);
        let poly = Poly::random(2, &mut rng);
        let scalar = poly.eval(3);
        let commits = poly.commit().commits_compressed();
        let share = Share::from_scalar(3, scalar, commits);

        let json = serde_json::to_string(&share).unwrap();
        let restored: Share = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.scalar().unwrap(), scalar);
        assert_eq!(restored.public_commits, share.public_commits);
    }
}
