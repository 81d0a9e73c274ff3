//! Cryptographic primitives
//!
//! This module holds the secp256k1 wrappers and the blind Diffie-Hellman key exchange (BDHKE) used to obtain
//! blind signatures from a mint. It knows nothing about mints, proofs or wallets; those live higher up and only
//! consume the functions exported here.

pub mod dhke;
mod error;
pub mod hash_to_curve;
pub mod keys;

pub use error::DhkeError;
