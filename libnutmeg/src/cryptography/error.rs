use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum DhkeError {
    #[error("The provided bytes are not a valid SEC1 encoded secp256k1 point.")]
    InvalidPoint,
    #[error("The operation produced the point at infinity.")]
    IdentityPoint,
    #[error("The provided bytes are not a valid non-zero secp256k1 scalar.")]
    InvalidScalar,
    #[error("Invalid hex string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
    #[error("No curve point was found for the message after {0} hashing rounds.")]
    HashToCurveExhausted(usize),
}
