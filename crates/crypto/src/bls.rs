//! Thin wrappers over `bls_signatures` for the sign/verify/aggregate
//! contract of spec §4.1, keyed off raw byte encodings so the rest of the
//! workspace never has to depend on the curve crate directly.

use bls_signatures::{PublicKey, Serialize as BlsSerialize, Signature};

use crate::error::CryptoError;
use crate::scheme::Scheme;

/// BLS-sign `message` with a raw 32-byte private key.
pub fn sign(private_key_bytes: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let sk = bls_signatures::PrivateKey::from_bytes(private_key_bytes)
        .map_err(|_| CryptoError::Encoding)?;
    Ok(sk.sign(message).as_bytes())
}

/// Verify a single BLS signature under a raw public key.
pub fn verify(public_key_bytes: &[u8], message: &[u8], signature_bytes: &[u8]) -> Result<(), CryptoError> {
    let pk = PublicKey::from_bytes(public_key_bytes).map_err(|_| CryptoError::Encoding)?;
    let sig = Signature::from_bytes(signature_bytes).map_err(|_| CryptoError::Encoding)?;
    if bls_signatures::verify_messages(&sig, &[message], &[pk]) {
        Ok(())
    } else {
        Err(CryptoError::InvalidSignature)
    }
}

/// Verify a round record's signature against the canonical message derived
/// from `scheme` (spec §6; message function is never hard-coded).
pub fn verify_beacon(
    scheme: Scheme,
    public_key_bytes: &[u8],
    previous_signature: &[u8],
    round: u64,
    signature_bytes: &[u8],
) -> Result<(), CryptoError> {
    let message = scheme.canonical_message(previous_signature, round);
    verify(public_key_bytes, &message, signature_bytes)
}

/// Combine signatures; associative and commutative, verifies under the sum
/// of the signers' public keys.
pub fn aggregate(signatures: &[Vec<u8>]) -> Result<Vec<u8>, CryptoError> {
    let parsed: Result<Vec<Signature>, _> =
        signatures.iter().map(|b| Signature::from_bytes(b)).collect();
    let parsed = parsed.map_err(|_| CryptoError::Encoding)?;
    let agg = bls_signatures::aggregate(&parsed).map_err(|_| CryptoError::InvalidSignature)?;
    Ok(agg.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls_signatures::PrivateKey;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn sign_and_verify_round_trip() {
        let mut rng = StdRng::seed_from_u64(42);
        let sk = PrivateKey::generate(&mut rng);
        let pk = sk.public_key();
        let msg = b"round message";
        let sig = sign(&sk.as_bytes(), msg).unwrap();
        verify(&pk.as_bytes(), msg, &sig).unwrap();
    }

    #[test]
    fn verify_rejects_wrong_message() {
        let mut rng = StdRng::seed_from_u64(43);
        let sk = PrivateKey::generate(&mut rng);
        let pk = sk.public_key();
        let sig = sign(&sk.as_bytes(), b"right").unwrap();
        assert!(verify(&pk.as_bytes(), b"wrong", &sig).is_err());
    }

    #[test]
    fn aggregate_verifies_against_summed_keys() {
        let mut rng = StdRng::seed_from_u64(44);
        let msg = b"same message for all signers";
        let sks: Vec<PrivateKey> = (0..4).map(|_| PrivateKey::generate(&mut rng)).collect();
        let sigs: Vec<Vec<u8>> = sks.iter().map(|sk| sign(&sk.as_bytes(), msg).unwrap()).collect();
        let agg = aggregate(&sigs).unwrap();

        let pks: Vec<PublicKey> = sks.iter().map(|sk| sk.public_key()).collect();
        let agg_sig = Signature::from_bytes(&agg).unwrap();
        assert!(bls_signatures::verify_messages(
            &agg_sig,
            &[msg, msg, msg, msg],
            &pks
        ));
    }
}
