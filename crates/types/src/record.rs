use crate::round::Round;

/// One signed round of a beacon chain (spec §3, §6 `/public/{round}`).
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct BeaconRecord {
    pub round: Round,
    #[serde(with = "hex::serde")]
    pub previous_signature: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub signature: Vec<u8>,
}

impl BeaconRecord {
    pub fn genesis(seed: Vec<u8>) -> Self {
        BeaconRecord {
            round: Round::GENESIS_SENTINEL,
            previous_signature: Vec::new(),
            signature: seed,
        }
    }
}
