//! BLS signing, threshold shares, and VSS commitments for the beacon core.
//!
//! This crate has no knowledge of rounds, chains, or storage; it exposes
//! pure cryptographic operations that the rest of the workspace composes.

pub mod bls;
pub mod error;
pub mod poly;
pub mod scheme;
pub mod threshold;

pub use blstrs::{G1Projective, G2Projective, Scalar};
pub use error::CryptoError;
pub use scheme::Scheme;
