use std::fmt;

/// A 1-based round number; `Round(0)` is the genesis sentinel and is never
/// assigned a real signature (spec §3).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct Round(pub u64);

impl Round {
    pub const GENESIS_SENTINEL: Round = Round(0);

    pub fn next(self) -> Round {
        Round(self.0 + 1)
    }

    pub fn previous(self) -> Option<Round> {
        self.0.checked_sub(1).map(Round)
    }

    pub fn is_genesis(self) -> bool {
        self == Self::GENESIS_SENTINEL
    }
}

impl From<u64> for Round {
    fn from(v: u64) -> Self {
        Round(v)
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn genesis_has_no_previous() {
        assert_eq!(Round::GENESIS_SENTINEL.previous(), None);
        assert!(Round::GENESIS_SENTINEL.is_genesis());
    }

    #[test]
    fn next_increments() {
        assert_eq!(Round(5).next(), Round(6));
        assert_eq!(Round(6).previous(), Some(Round(5)));
    }
}
