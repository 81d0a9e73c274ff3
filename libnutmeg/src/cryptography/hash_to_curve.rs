use crate::cryptography::keys::{PublicKey, COMPRESSED_POINT_LEN};
use crate::cryptography::DhkeError;
use sha2::{Digest, Sha256};

/// SEC1 tag byte for a compressed point with an even y-coordinate.
const EVEN_Y_TAG: u8 = 0x02;

/// Upper bound on hashing rounds. Each round succeeds with probability ~1/2, so reaching this is practically
/// impossible for an honest input.
pub const MAX_HASH_TO_CURVE_ROUNDS: usize = 1 << 16;

/// Deterministically maps an arbitrary message onto a secp256k1 point.
///
/// The message is hashed with SHA-256 and the digest is used as the x-coordinate of an even-y point. If the digest is
/// not a valid x-coordinate, the digest itself is hashed again and the process repeats.
pub fn hash_to_curve(message: &[u8]) -> Result<PublicKey, DhkeError> {
    hash_to_curve_bounded(message, MAX_HASH_TO_CURVE_ROUNDS)
}

/// As [`hash_to_curve`], but gives up with [`DhkeError::HashToCurveExhausted`] after `max_rounds` candidates.
pub fn hash_to_curve_bounded(message: &[u8], max_rounds: usize) -> Result<PublicKey, DhkeError> {
    let mut digest: [u8; 32] = Sha256::digest(message).into();
    let mut candidate = [0u8; COMPRESSED_POINT_LEN];
    candidate[0] = EVEN_Y_TAG;
    for _ in 0..max_rounds {
        candidate[1..].copy_from_slice(&digest);
        match PublicKey::from_sec1_bytes(&candidate) {
            Ok(point) => return Ok(point),
            Err(_) => digest = Sha256::digest(digest).into(),
        }
    }
    Err(DhkeError::HashToCurveExhausted(max_rounds))
}
