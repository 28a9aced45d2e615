use std::collections::BTreeMap;

use chainbeacon_crypto::threshold;
use chainbeacon_crypto::G2Projective;

/// Accumulates valid, deduplicated partials for one round until the
/// threshold is reached (spec §4.4.2 step 4). Verification of each partial
/// happens before it is offered here; the aggregator only tracks identity.
#[derive(Default)]
pub struct RoundAggregator {
    valid: BTreeMap<u16, G2Projective>,
}

impl RoundAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a verified partial; returns `false` if `signer_index` already
    /// contributed (silently ignored per spec's dedup rule).
    pub fn insert(&mut self, signer_index: u16, point: G2Projective) -> bool {
        if self.valid.contains_key(&signer_index) {
            false
        } else {
            self.valid.insert(signer_index, point);
            true
        }
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    pub fn ready(&self, threshold_count: u16) -> bool {
        self.valid.len() >= threshold_count as usize
    }

    pub fn recover(&self, threshold_count: u16) -> Result<G2Projective, chainbeacon_crypto::CryptoError> {
        let partials: Vec<(u16, G2Projective)> = self.valid.iter().map(|(i, p)| (*i, *p)).collect();
        threshold::threshold_recover(&partials, threshold_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use group::Group as _;

    #[test]
    fn dedups_by_signer_index() {
        let mut agg = RoundAggregator::new();
        let p = G2Projective::generator();
        assert!(agg.insert(1, p));
        assert!(!agg.insert(1, p));
        assert_eq!(agg.len(), 1);
    }

    #[test]
    fn ready_once_threshold_reached() {
        let mut agg = RoundAggregator::new();
        let p = G2Projective::generator();
        agg.insert(1, p);
        agg.insert(2, p);
        assert!(!agg.ready(3));
        agg.insert(3, p);
        assert!(agg.ready(3));
    }
}
