//! Blind Diffie-Hellman key exchange.
//!
//! The three steps of the protocol, for a wallet (Alice) and a mint (Bob) holding private key `a` with `A = a·G`:
//!
//! 1. Alice picks a secret `x`, computes `Y = hash_to_curve(x)`, draws a random `r` and sends `B_ = Y + r·G`.
//! 2. Bob replies with `C_ = a·B_`.
//! 3. Alice unblinds with `C = C_ - r·A`, which equals `a·Y`.
//!
//! Bob never sees `Y`, and later accepts `(x, C)` by checking `C == a·hash_to_curve(x)`.

use crate::cryptography::hash_to_curve::hash_to_curve;
use crate::cryptography::keys::{BlindingFactor, PublicKey, Secret, SecretKey};
use crate::cryptography::DhkeError;
use k256::ProjectivePoint;
use rand_core::{CryptoRng, RngCore};

/// Step 1 with a caller-supplied blinding factor: `B_ = hash_to_curve(message) + r·G`.
pub fn blind_message(message: &[u8], r: &BlindingFactor) -> Result<PublicKey, DhkeError> {
    let y = hash_to_curve(message)?;
    let p = ProjectivePoint::GENERATOR * *r.as_scalar();
    PublicKey::from_point(y.as_point() + p)
}

/// Step 1 for a wallet secret. The secret is hashed through its canonical encoding, and a fresh blinding factor is
/// drawn from `rng`.
pub fn blind_secret<R: CryptoRng + RngCore>(
    secret: &Secret,
    rng: &mut R,
) -> Result<(PublicKey, BlindingFactor), DhkeError> {
    let r = BlindingFactor::random(rng);
    let blinded = blind_message(secret.encode().as_bytes(), &r)?;
    Ok((blinded, r))
}

/// Step 2, performed by the mint: `C_ = a·B_`.
pub fn sign_message(a: &SecretKey, blinded: &PublicKey) -> Result<PublicKey, DhkeError> {
    PublicKey::from_point(blinded.as_point() * *a.as_scalar())
}

/// Step 3: `C = C_ - r·A`, removing the blinding factor from the mint's promise.
pub fn unblind_signature(
    blinded_signature: &PublicKey,
    r: &BlindingFactor,
    mint_key: &PublicKey,
) -> Result<PublicKey, DhkeError> {
    let mask = mint_key.as_point() * *r.as_scalar();
    PublicKey::from_point(blinded_signature.as_point() - mask)
}

/// Mint-side check of an unblinded signature: `C == a·hash_to_curve(message)`.
pub fn verify_message(a: &SecretKey, message: &[u8], unblinded: &PublicKey) -> Result<bool, DhkeError> {
    let y = hash_to_curve(message)?;
    let expected = PublicKey::from_point(y.as_point() * *a.as_scalar())?;
    Ok(expected == *unblinded)
}
