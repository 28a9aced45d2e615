//! Threshold BLS signing built directly on `blstrs`'s pairing primitives:
//! private shares live in the scalar field, partial/aggregate signatures in
//! `G2`, and public key shares in `G1` (matching `bls_signatures`'s own
//! group assignment). The hash-to-curve domain below is also
//! `bls_signatures`' own basic-scheme DST, so a signature recovered here
//! verifies directly under `bls::verify_beacon` with no re-encoding.

use blstrs::{pairing, G1Affine, G1Projective, G2Affine, G2Projective, Scalar};
use group::{Curve, Group};
use rand::RngCore;

use crate::error::CryptoError;
use crate::poly::{lagrange_coefficients, Poly, PubPoly};

/// Domain separation tag for the `hash_to_curve` suite. Matches
/// `bls_signatures`' fixed basic-scheme ciphersuite exactly (not a
/// chainbeacon-specific DST), so partials hashed here and signatures
/// verified through `bls_signatures::verify_messages` agree on the same
/// curve point for a given message.
const HASH_TO_G2_DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

fn hash_to_g2(message: &[u8]) -> G2Projective {
    G2Projective::hash_to_curve(message, HASH_TO_G2_DST, &[])
}

/// Output of a threshold split: per-index private shares and the public
/// commitment polynomial used to verify them (spec §3 "Share").
pub struct SplitShares {
    pub shares: Vec<(u16, Scalar)>,
    pub public_poly: PubPoly,
}

/// `threshold_split(n, t)`: generate a fresh secret and split it so any `t`
/// of the `n` shares reconstruct it via Lagrange interpolation.
pub fn threshold_split(n: u16, t: u16, rng: &mut impl RngCore) -> SplitShares {
    split_from_poly(&Poly::random(t as usize - 1, rng), n)
}

/// Resharing variant: splits a *known* secret so the new group's public key
/// equals the old one (spec §4.3).
pub fn threshold_split_from_secret(
    secret: Scalar,
    n: u16,
    t: u16,
    rng: &mut impl RngCore,
) -> SplitShares {
    split_from_poly(&Poly::with_secret(t as usize - 1, secret, rng), n)
}

fn split_from_poly(poly: &Poly, n: u16) -> SplitShares {
    let shares = (1..=n).map(|i| (i, poly.eval(i as u64))).collect();
    SplitShares {
        shares,
        public_poly: poly.commit(),
    }
}

/// Sign `message` with one node's private share, producing a partial
/// signature (spec §4.4.2 step 2).
pub fn sign_share(share: Scalar, message: &[u8]) -> G2Projective {
    hash_to_g2(message) * share
}

/// Verify a partial signature against the per-index public key share
/// (`PubPoly::eval(index)`), discarding it silently on failure per spec
/// §4.4.2 step 4.
pub fn verify_partial(public_key_share: G1Projective, message: &[u8], partial: G2Projective) -> bool {
    let h = hash_to_g2(message);
    let lhs = pairing(&public_key_share.to_affine(), &h.to_affine());
    let rhs = pairing(&G1Affine::from(G1Projective::generator()), &partial.to_affine());
    lhs == rhs
}

/// Lagrange-recover the group signature from `t` already-verified partials.
/// Fails with `InsufficientShares` if fewer than `t` are supplied; callers
/// are expected to have filtered invalid shares with `verify_partial`
/// first, matching the spec's `InvalidShare` contract at the per-partial
/// boundary rather than inside recovery itself.
pub fn threshold_recover(
    partials: &[(u16, G2Projective)],
    t: u16,
) -> Result<G2Projective, CryptoError> {
    if partials.len() < t as usize {
        return Err(CryptoError::InsufficientShares {
            needed: t as usize,
            have: partials.len(),
        });
    }
    let chosen = &partials[..t as usize];
    let indices: Vec<u64> = chosen.iter().map(|(i, _)| *i as u64).collect();
    let coeffs = lagrange_coefficients(&indices);
    let acc = chosen
        .iter()
        .zip(coeffs.iter())
        .fold(G2Projective::identity(), |acc, ((_, p), c)| acc + *p * c);
    Ok(acc)
}

/// Convenience wrapper returning compressed signature bytes directly, for
/// callers (the beacon engine) that store/transmit signatures as bytes.
pub fn recover_and_encode(partials: &[(u16, G2Projective)], t: u16) -> Result<Vec<u8>, CryptoError> {
    Ok(g2_to_bytes(&threshold_recover(partials, t)?).to_vec())
}

pub fn scalar_to_bytes(s: &Scalar) -> [u8; 32] {
    s.to_bytes_le()
}

pub fn scalar_from_bytes(b: &[u8; 32]) -> Result<Scalar, CryptoError> {
    Option::from(Scalar::from_bytes_le(b)).ok_or(CryptoError::Encoding)
}

pub fn g2_to_bytes(p: &G2Projective) -> [u8; 96] {
    p.to_affine().to_compressed()
}

pub fn g2_from_bytes(b: &[u8]) -> Result<G2Projective, CryptoError> {
    let arr: [u8; 96] = b.try_into().map_err(|_| CryptoError::Encoding)?;
    Option::<G2Affine>::from(G2Affine::from_compressed(&arr))
        .map(G2Projective::from)
        .ok_or(CryptoError::Encoding)
}

pub fn g1_to_bytes(p: &G1Projective) -> [u8; 48] {
    p.to_affine().to_compressed()
}

pub fn g1_from_bytes(b: &[u8]) -> Result<G1Projective, CryptoError> {
    let arr: [u8; 48] = b.try_into().map_err(|_| CryptoError::Encoding)?;
    Option::<G1Affine>::from(G1Affine::from_compressed(&arr))
        .map(G1Projective::from)
        .ok_or(CryptoError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ff::Field;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn threshold_recovers_and_verifies_under_group_key() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 5u16;
        let t = 3u16;
        let split = threshold_split(n, t, &mut rng);
        let message = b"round 1 message";

        let partials: Vec<(u16, G2Projective)> = split
            .shares
            .iter()
            .map(|(i, s)| (*i, sign_share(*s, message)))
            .collect();

        for (i, p) in &partials {
            let pk_share = split.public_poly.eval(*i as u64);
            assert!(verify_partial(pk_share, message, *p));
        }

        let recovered = threshold_recover(&partials[..t as usize], t).unwrap();

        // Check it verifies under the group public key via the standard
        // pairing equation (same check bls::verify_beacon performs).
        let group_pk = split.public_poly.public_key();
        let h = hash_to_g2(message);
        let lhs = pairing(&group_pk.to_affine(), &h.to_affine());
        let rhs = pairing(&G1Affine::from(G1Projective::generator()), &recovered.to_affine());
        assert_eq!(lhs, rhs);

        // A different t-subset must recover the identical signature.
        let other_subset: Vec<(u16, G2Projective)> =
            vec![partials[0], partials[2], partials[4]];
        let recovered2 = threshold_recover(&other_subset, t).unwrap();
        assert_eq!(recovered, recovered2);
    }

    #[test]
    fn fewer_than_threshold_fails() {
        let mut rng = StdRng::seed_from_u64(8);
        let split = threshold_split(5, 3, &mut rng);
        let message = b"short round";
        let partials: Vec<(u16, G2Projective)> = split
            .shares
            .iter()
            .take(2)
            .map(|(i, s)| (*i, sign_share(*s, message)))
            .collect();
        assert_eq!(
            threshold_recover(&partials, 3),
            Err(CryptoError::InsufficientShares { needed: 3, have: 2 })
        );
    }

    #[test]
    fn invalid_share_fails_per_index_check() {
        let mut rng = StdRng::seed_from_u64(9);
        let split = threshold_split(4, 2, &mut rng);
        let message = b"msg";
        let (idx, share) = split.shares[0];
        let forged = sign_share(share + Scalar::from(1u64), message);
        let pk_share = split.public_poly.eval(idx as u64);
        assert!(!verify_partial(pk_share, message, forged));
    }

    #[test]
    fn resharing_preserves_group_public_key() {
        let mut rng = StdRng::seed_from_u64(10);
        let old = threshold_split(4, 3, &mut rng);
        let old_secret = crate::poly::recover_secret(
            &old.shares[..3]
                .iter()
                .map(|(i, s)| (*i as u64, *s))
                .collect::<Vec<_>>(),
        );
        let new = threshold_split_from_secret(old_secret, 6, 4, &mut rng);
        assert_eq!(new.public_poly.public_key(), old.public_poly.public_key());
    }

    #[test]
    fn recovered_signature_verifies_through_bls_module() {
        let mut rng = StdRng::seed_from_u64(12);
        let n = 5u16;
        let t = 3u16;
        let split = threshold_split(n, t, &mut rng);
        let message = b"cross-module round message";

        let partials: Vec<(u16, G2Projective)> = split
            .shares
            .iter()
            .take(t as usize)
            .map(|(i, s)| (*i, sign_share(*s, message)))
            .collect();
        let recovered = threshold_recover(&partials, t).unwrap();

        let group_pk_bytes = g1_to_bytes(&split.public_poly.public_key());
        let sig_bytes = g2_to_bytes(&recovered);
        crate::bls::verify(&group_pk_bytes, message, &sig_bytes)
            .expect("a threshold-recovered signature must verify through the same path bls::verify_beacon uses");
    }

    #[test]
    fn bytes_round_trip() {
        let mut rng = StdRng::seed_from_u64(11);
        let s = Scalar::random(&mut rng);
        assert_eq!(scalar_from_bytes(&scalar_to_bytes(&s)).unwrap(), s);

        let g2 = G2Projective::generator() * s;
        assert_eq!(g2_from_bytes(&g2_to_bytes(&g2)).unwrap(), g2);

        let g1 = G1Projective::generator() * s;
        assert_eq!(g1_from_bytes(&g1_to_bytes(&g1)).unwrap(), g1);
    }
}
