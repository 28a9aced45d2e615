use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use chainbeacon_crypto::poly::{lagrange_coefficients, Poly, PubPoly};
use chainbeacon_crypto::{threshold, G1Projective, Scalar};
use chainbeacon_types::{Deal, Justification, Response, ResponseStatus, Share};
use rand::RngCore;

use crate::error::DkgError;
use crate::state::{DkgResult, DkgState};

/// Parameters of a run (spec §4.3: `DkgConfig` is ambient, not spec.md
/// itself, but the fields it drives — `threshold`, `old_threshold`,
/// `timeout` — are spec.md's own).
#[derive(Clone, Debug)]
pub struct DkgConfig {
    pub n: u16,
    pub threshold: u16,
    pub old_threshold: Option<u16>,
    pub timeout: Duration,
}

struct DealRecord {
    commits: PubPoly,
    share_from_dealer: Scalar,
}

/// One node's local state machine for a fresh DKG or a resharing (spec
/// §4.3). Dealer indices are the run's own node numbering for a fresh DKG,
/// or the *old* group's indices for a resharing — `old_pub_poly` is `Some`
/// exactly when this is a resharing.
pub struct Dkg {
    config: DkgConfig,
    own_index: u16,
    old_pub_poly: Option<PubPoly>,
    state: DkgState,
    deals: BTreeMap<u16, DealRecord>,
    responses: BTreeMap<u16, BTreeMap<u16, ResponseStatus>>,
    decided: BTreeSet<u16>,
    excluded: BTreeSet<u16>,
    result: Option<DkgResult>,
}

impl Dkg {
    /// Start a fresh DKG run.
    pub fn fresh(config: DkgConfig, own_index: u16) -> Self {
        Dkg {
            config,
            own_index,
            old_pub_poly: None,
            state: DkgState::Fresh,
            deals: BTreeMap::new(),
            responses: BTreeMap::new(),
            decided: BTreeSet::new(),
            excluded: BTreeSet::new(),
            result: None,
        }
    }

    /// Start a resharing run; `old_pub_poly` is the old group's public
    /// polynomial, used to bind each dealer's offered sub-share to its
    /// already-verified old share (spec §4.3 resharing variant).
    pub fn resharing(config: DkgConfig, own_index: u16, old_pub_poly: PubPoly) -> Self {
        Dkg {
            config,
            own_index,
            old_pub_poly: Some(old_pub_poly),
            state: DkgState::Fresh,
            deals: BTreeMap::new(),
            responses: BTreeMap::new(),
            decided: BTreeSet::new(),
            excluded: BTreeSet::new(),
            result: None,
        }
    }

    pub fn state(&self) -> &DkgState {
        &self.state
    }

    /// Generate this node's own deal: a fresh degree-`t-1` polynomial (its
    /// constant term is `secret`, or a random secret when `secret` is
    /// `None`) split into one deal per recipient (spec §4.3 step 1).
    pub fn deal(
        &mut self,
        dealer_index: u16,
        secret: Option<Scalar>,
        recipients: &[u16],
        rng: &mut impl RngCore,
    ) -> Vec<Deal> {
        let degree = self.config.threshold as usize - 1;
        let poly = match secret {
            Some(s) => Poly::with_secret(degree, s, rng),
            None => Poly::random(degree, rng),
        };
        let commits = poly.commit().commits_compressed();
        self.state = DkgState::DealsIssued;
        recipients
            .iter()
            .map(|&recipient_index| Deal {
                dealer_index,
                recipient_index,
                commits: commits.clone(),
                encrypted_share: threshold::scalar_to_bytes(&poly.eval(recipient_index as u64)).to_vec(),
            })
            .collect()
    }

    /// Process an inbound deal addressed to this node, returning the
    /// response to broadcast (spec §4.3 step 2).
    pub fn handle_deal(&mut self, deal: Deal) -> Result<Response, DkgError> {
        if deal.recipient_index != self.own_index {
            return Err(DkgError::WrongRecipient {
                expected: deal.recipient_index,
                actual: self.own_index,
            });
        }
        if self.deals.contains_key(&deal.dealer_index) {
            return Err(DkgError::DuplicatePacket {
                dealer: deal.dealer_index,
                verifier: self.own_index,
            });
        }

        let commits = PubPoly::from_compressed(&deal.commits).ok_or(DkgError::InvalidDeal(deal.dealer_index))?;
        let share_bytes: [u8; 32] = deal
            .encrypted_share
            .clone()
            .try_into()
            .map_err(|_| DkgError::InvalidDeal(deal.dealer_index))?;
        let share = threshold::scalar_from_bytes(&share_bytes).map_err(|_| DkgError::InvalidDeal(deal.dealer_index))?;

        let share_valid = commits.verify_share(self.own_index as u64, share);
        let binding_valid = match &self.old_pub_poly {
            Some(old) => old.eval(deal.dealer_index as u64) == commits.public_key(),
            None => true,
        };

        let status = if share_valid && binding_valid {
            self.deals.insert(
                deal.dealer_index,
                DealRecord {
                    commits,
                    share_from_dealer: share,
                },
            );
            ResponseStatus::Approval
        } else {
            ResponseStatus::Complaint
        };

        Ok(Response {
            dealer_index: deal.dealer_index,
            responder_index: self.own_index,
            status,
        })
    }

    /// Record a response broadcast by some other node about some dealer
    /// (spec §4.3 step 2/determinism clause).
    pub fn handle_response(&mut self, response: Response) -> Result<(), DkgError> {
        if self.decided.contains(&response.dealer_index) {
            return Err(DkgError::DuplicatePacket {
                dealer: response.dealer_index,
                verifier: response.responder_index,
            });
        }
        let entry = self.responses.entry(response.dealer_index).or_default();
        if entry.contains_key(&response.responder_index) {
            return Err(DkgError::DuplicatePacket {
                dealer: response.dealer_index,
                verifier: response.responder_index,
            });
        }
        entry.insert(response.responder_index, response.status);
        self.state = DkgState::ResponsesCollected;
        Ok(())
    }

    /// A dealer publishes the plaintext sub-share in answer to a complaint
    /// (spec §4.3 step 3); every node verifies it independently.
    pub fn handle_justification(&mut self, justification: Justification) -> Result<(), DkgError> {
        let share_bytes: [u8; 32] = justification
            .share
            .clone()
            .try_into()
            .map_err(|_| DkgError::InvalidJustification(justification.dealer_index))?;
        let share = threshold::scalar_from_bytes(&share_bytes)
            .map_err(|_| DkgError::InvalidJustification(justification.dealer_index))?;

        let valid = match self.deals.get(&justification.dealer_index) {
            Some(record) => record.commits.verify_share(justification.recipient_index as u64, share),
            None => false,
        };

        if valid {
            if let Some(responses) = self.responses.get_mut(&justification.dealer_index) {
                responses.insert(justification.recipient_index, ResponseStatus::Approval);
            }
            self.state = DkgState::Justified;
            Ok(())
        } else {
            self.excluded.insert(justification.dealer_index);
            Err(DkgError::InvalidJustification(justification.dealer_index))
        }
    }

    /// A verifier that received no deal from `dealer_index` before timeout
    /// records an implicit complaint (spec §4.3 failure semantics).
    pub fn handle_timeout(&mut self, dealer_index: u16) {
        if !self.deals.contains_key(&dealer_index) {
            self.excluded.insert(dealer_index);
        }
    }

    fn qualified_set(&self) -> Vec<u16> {
        let required = self.config.old_threshold.unwrap_or(self.config.threshold);
        self.deals
            .keys()
            .filter(|dealer| {
                if self.excluded.contains(dealer) {
                    return false;
                }
                match self.responses.get(dealer) {
                    Some(votes) => {
                        let approvals = votes.values().filter(|s| **s == ResponseStatus::Approval).count();
                        let complaints_unresolved = votes
                            .values()
                            .filter(|s| **s == ResponseStatus::Complaint)
                            .count();
                        approvals as u16 >= required || complaints_unresolved == 0
                    }
                    None => true,
                }
            })
            .copied()
            .collect()
    }

    /// Combine qualified dealers' contributions into the final share and
    /// group public key (spec §4.3 step 4 and the resharing combination
    /// rule). Fresh runs sum contributions unweighted; resharing runs
    /// weight each dealer's contribution by its Lagrange coefficient over
    /// the old group's indices, which reconstructs the same secret.
    pub fn finalize(&mut self) -> Result<DkgResult, DkgError> {
        let qualified = self.qualified_set();
        let required = self.config.old_threshold.unwrap_or(self.config.threshold);
        if (qualified.len() as u16) < required {
            self.state = DkgState::Aborted;
            return Err(DkgError::InsufficientQualified);
        }

        let weights: Vec<(u16, Scalar)> = if self.old_pub_poly.is_some() {
            let indices: Vec<u64> = qualified.iter().map(|&i| i as u64).collect();
            qualified.iter().copied().zip(lagrange_coefficients(&indices)).collect()
        } else {
            qualified.iter().map(|&i| (i, Scalar::from(1u64))).collect()
        };

        let mut own_share_scalar = Scalar::from(0u64);
        let mut combined_commits: Option<Vec<G1Projective>> = None;
        for (dealer, weight) in &weights {
            let record = &self.deals[dealer];
            own_share_scalar += record.share_from_dealer * weight;
            let weighted: Vec<G1Projective> = record.commits.commits().iter().map(|c| *c * weight).collect();
            combined_commits = Some(match combined_commits {
                None => weighted,
                Some(acc) => acc.iter().zip(weighted.iter()).map(|(a, b)| a + b).collect(),
            });
        }

        let combined = PubPoly::from_commits(combined_commits.expect("qualified set is non-empty"));
        let group_public_key = combined.public_key();
        let share = Share::from_scalar(self.own_index, own_share_scalar, combined.commits_compressed());

        let result = DkgResult {
            group_public_key: threshold::g1_to_bytes(&group_public_key).to_vec(),
            share,
            qualified,
        };
        self.state = DkgState::Finalized;
        self.result = Some(result.clone());
        Ok(result)
    }
}
