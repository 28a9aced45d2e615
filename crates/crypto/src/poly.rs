//! Scalar polynomials and their group commitments, used for Pedersen/Feldman
//! verifiable secret sharing (spec §4.1, §4.3). `Poly` holds the private
//! coefficients a dealer generates; `PubPoly` holds the public commitments
//! broadcast alongside each deal so verifiers can check a share without
//! learning the secret.

use blstrs::{G1Affine, G1Projective, Scalar};
use ff::Field;
use group::{Curve, Group};
use rand::RngCore;

/// A degree-`t-1` polynomial over the scalar field; `0`th coefficient is the
/// shared secret.
#[derive(Clone, Debug)]
pub struct Poly(Vec<Scalar>);

impl Poly {
    /// A random polynomial of the given degree with a fixed constant term.
    pub fn with_secret(degree: usize, secret: Scalar, rng: &mut impl RngCore) -> Self {
        let mut coeffs = Vec::with_capacity(degree + 1);
        coeffs.push(secret);
        for _ in 0..degree {
            coeffs.push(Scalar::random(&mut *rng));
        }
        Poly(coeffs)
    }

    /// A fresh random polynomial of the given degree with a random secret.
    pub fn random(degree: usize, rng: &mut impl RngCore) -> Self {
        Self::with_secret(degree, Scalar::random(&mut *rng), rng)
    }

    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn secret(&self) -> Scalar {
        self.0[0]
    }

    /// Evaluate at the 1-based share index `x` via Horner's method.
    pub fn eval(&self, x: u64) -> Scalar {
        let x = Scalar::from(x);
        let mut result = Scalar::ZERO;
        for coeff in self.0.iter().rev() {
            result = result * x + coeff;
        }
        result
    }

    /// The public commitment polynomial: `g^{coeff_i}` for each coefficient.
    pub fn commit(&self) -> PubPoly {
        PubPoly(
            self.0
                .iter()
                .map(|c| G1Projective::generator() * c)
                .collect(),
        )
    }
}

/// Public commitments to a `Poly`'s coefficients, in the same group as the
/// chain's public key. Lets any party verify a share without the secret.
#[derive(Clone, Debug)]
pub struct PubPoly(Vec<G1Projective>);

impl PubPoly {
    pub fn from_commits(commits: Vec<G1Projective>) -> Self {
        PubPoly(commits)
    }

    pub fn degree(&self) -> usize {
        self.0.len() - 1
    }

    pub fn commits(&self) -> &[G1Projective] {
        &self.0
    }

    /// The dealer's public key: the constant-term commitment.
    pub fn public_key(&self) -> G1Projective {
        self.0[0]
    }

    /// Evaluate the commitment polynomial at `x`; the result must equal
    /// `g^{share}` for a share honestly generated from the matching `Poly`.
    pub fn eval(&self, x: u64) -> G1Projective {
        let x = Scalar::from(x);
        let mut result = G1Projective::identity();
        for commit in self.0.iter().rev() {
            result = result * x + commit;
        }
        result
    }

    /// Verify that `share` at index `x` matches this commitment polynomial.
    pub fn verify_share(&self, x: u64, share: Scalar) -> bool {
        self.eval(x) == G1Projective::generator() * share
    }

    pub fn commits_compressed(&self) -> Vec<[u8; 48]> {
        self.0.iter().map(|p| p.to_affine().to_compressed()).collect()
    }

    pub fn from_compressed(bytes: &[[u8; 48]]) -> Option<Self> {
        let points: Option<Vec<G1Projective>> = bytes
            .iter()
            .map(|b| {
                Option::<G1Affine>::from(G1Affine::from_compressed(b)).map(G1Projective::from)
            })
            .collect();
        points.map(PubPoly)
    }
}

/// Lagrange coefficients `L_i(0)` for interpolating the polynomial value at
/// `x=0` given the sample points `indices` (1-based share indices).
pub fn lagrange_coefficients(indices: &[u64]) -> Vec<Scalar> {
    indices
        .iter()
        .enumerate()
        .map(|(i, &xi_raw)| {
            let xi = Scalar::from(xi_raw);
            let mut num = Scalar::ONE;
            let mut den = Scalar::ONE;
            for (j, &xj_raw) in indices.iter().enumerate() {
                if i == j {
                    continue;
                }
                let xj = Scalar::from(xj_raw);
                num *= Scalar::ZERO - xj;
                den *= xi - xj;
            }
            num * den.invert().unwrap()
        })
        .collect()
}

/// Recover the secret at `x=0` from `t` shares via Lagrange interpolation.
pub fn recover_secret(shares: &[(u64, Scalar)]) -> Scalar {
    let indices: Vec<u64> = shares.iter().map(|(i, _)| *i).collect();
    let coeffs = lagrange_coefficients(&indices);
    shares
        .iter()
        .zip(coeffs.iter())
        .fold(Scalar::ZERO, |acc, ((_, v), c)| acc + *v * c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn eval_at_zero_is_secret() {
        let mut rng = StdRng::seed_from_u64(1);
        let secret = Scalar::random(&mut rng);
        let poly = Poly::with_secret(2, secret, &mut rng);
        assert_eq!(poly.eval(0), secret);
    }

    #[test]
    fn threshold_recovery_reproduces_secret() {
        let mut rng = StdRng::seed_from_u64(2);
        let secret = Scalar::random(&mut rng);
        let t = 3;
        let n = 5u64;
        let poly = Poly::with_secret(t - 1, secret, &mut rng);
        let shares: Vec<(u64, Scalar)> = (1..=n).map(|i| (i, poly.eval(i))).collect();

        // Any t-subset recovers the secret.
        let subset = &shares[1..1 + t];
        assert_eq!(recover_secret(subset), secret);

        let other_subset: Vec<(u64, Scalar)> =
            vec![shares[0], shares[2], shares[4]];
        assert_eq!(recover_secret(&other_subset), secret);
    }

    #[test]
    fn commitment_verifies_honest_shares_and_rejects_forged() {
        let mut rng = StdRng::seed_from_u64(3);
        let poly = Poly::random(2, &mut rng);
        let pub_poly = poly.commit();

        let share = poly.eval(4);
        assert!(pub_poly.verify_share(4, share));
        assert!(!pub_poly.verify_share(4, share + Scalar::ONE));
    }

    #[test]
    fn commits_round_trip_through_compression() {
        let mut rng = StdRng::seed_from_u64(4);
        let poly = Poly::random(1, &mut rng);
        let pub_poly = poly.commit();
        let bytes = pub_poly.commits_compressed();
        let restored = PubPoly::from_compressed(&bytes).unwrap();
        assert_eq!(restored.public_key(), pub_poly.public_key());
    }
}
