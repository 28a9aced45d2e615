use serde::{de::Error as _, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Named signature scheme registry (spec §6's `SCHEME_ID` values). A node
/// recognises exactly this enumerated set and refuses to operate on any
/// other scheme name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Each round's message is chained to the previous signature.
    PedersenBlsChained,
    /// Each round's message depends only on the round number.
    PedersenBlsUnchained,
    /// RFC 9380 hash-to-curve variant, unchained.
    BlsUnchainedG1Rfc9380,
}

impl Scheme {
    const PEDERSEN_BLS_CHAINED: &'static str = "pedersen-bls-chained";
    const PEDERSEN_BLS_UNCHAINED: &'static str = "pedersen-bls-unchained";
    const BLS_UNCHAINED_G1_RFC9380: &'static str = "bls-unchained-g1-rfc9380";

    /// Stable scheme name, used in the chain hash (spec §6).
    pub fn name(&self) -> &'static str {
        match self {
            Scheme::PedersenBlsChained => Self::PEDERSEN_BLS_CHAINED,
            Scheme::PedersenBlsUnchained => Self::PEDERSEN_BLS_UNCHAINED,
            Scheme::BlsUnchainedG1Rfc9380 => Self::BLS_UNCHAINED_G1_RFC9380,
        }
    }

    /// Looks a scheme up by its registry name; `None` for anything not in
    /// the enumerated set (the core refuses to operate on unknown schemes).
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            Self::PEDERSEN_BLS_CHAINED => Some(Scheme::PedersenBlsChained),
            Self::PEDERSEN_BLS_UNCHAINED => Some(Scheme::PedersenBlsUnchained),
            Self::BLS_UNCHAINED_G1_RFC9380 => Some(Scheme::BlsUnchainedG1Rfc9380),
            _ => None,
        }
    }

    /// Reads the `SCHEME_ID` environment variable (spec §6), falling back to
    /// the chained Pedersen scheme when unset.
    pub fn from_env() -> Self {
        std::env::var("SCHEME_ID")
            .ok()
            .and_then(|s| Self::from_name(&s))
            .unwrap_or(Scheme::PedersenBlsChained)
    }

    /// Whether this scheme folds `previous_signature` into the round
    /// message. Derived from the scheme, never hard-coded by a caller
    /// (spec §9 Open Question).
    pub fn is_chained(&self) -> bool {
        matches!(self, Scheme::PedersenBlsChained)
    }

    /// The canonical per-round message: `H(previous_signature || round_be)`
    /// when chained, `H(round_be)` otherwise. Genesis uses the chain's
    /// `genesis_seed` as `previous_signature`.
    pub fn canonical_message(&self, previous_signature: &[u8], round: u64) -> [u8; 32] {
        let mut hasher = Sha256::new();
        if self.is_chained() {
            hasher.update(previous_signature);
        }
        hasher.update(round.to_be_bytes());
        hasher.finalize().into()
    }
}

impl Serialize for Scheme {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Scheme {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Scheme::from_name(&name).ok_or_else(|| D::Error::custom(format!("unknown scheme: {name}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_registry_names() {
        for s in [
            Scheme::PedersenBlsChained,
            Scheme::PedersenBlsUnchained,
            Scheme::BlsUnchainedG1Rfc9380,
        ] {
            assert_eq!(Scheme::from_name(s.name()), Some(s));
        }
        assert_eq!(Scheme::from_name("not-a-scheme"), None);
    }

    #[test]
    fn chained_message_depends_on_previous_signature() {
        let scheme = Scheme::PedersenBlsChained;
        let m1 = scheme.canonical_message(b"sig-a", 7);
        let m2 = scheme.canonical_message(b"sig-b", 7);
        assert_ne!(m1, m2);
    }

    #[test]
    fn unchained_message_ignores_previous_signature() {
        let scheme = Scheme::PedersenBlsUnchained;
        let m1 = scheme.canonical_message(b"sig-a", 7);
        let m2 = scheme.canonical_message(b"sig-b", 7);
        assert_eq!(m1, m2);
    }

    #[test]
    fn serializes_as_its_registry_name() {
        let json = serde_json::to_string(&Scheme::BlsUnchainedG1Rfc9380).unwrap();
        assert_eq!(json, "\"bls-unchained-g1-rfc9380\"");
        let back: Scheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Scheme::BlsUnchainedG1Rfc9380);
    }
}
