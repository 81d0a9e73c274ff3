use crate::cryptography::DhkeError;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, NonZeroScalar, ProjectivePoint, Scalar};
use rand_core::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use zeroize::Zeroizing;

/// Length of a SEC1 compressed secp256k1 point.
pub const COMPRESSED_POINT_LEN: usize = 33;
/// Length of a wallet secret, in bytes.
pub const SECRET_LEN: usize = 32;

/// A secp256k1 public key: the mint's per-denomination key, or any of the points exchanged during BDHKE
/// (`Y`, `B_`, `C_`, `C`).
///
/// The point at infinity is never representable, so every `PublicKey` has a valid compressed encoding.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PublicKey {
    point: AffinePoint,
}

impl PublicKey {
    /// Decodes a SEC1 encoded (compressed or uncompressed) point.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self, DhkeError> {
        let key = k256::PublicKey::from_sec1_bytes(bytes).map_err(|_| DhkeError::InvalidPoint)?;
        Ok(Self { point: *key.as_affine() })
    }

    /// Tries to deserialize a hex string into a `PublicKey`. The hex string must represent a valid SEC1 encoded
    /// point on the curve.
    pub fn from_hex(hex: &str) -> Result<Self, DhkeError> {
        let bytes = hex::decode(hex)?;
        Self::from_sec1_bytes(&bytes)
    }

    /// Wraps the result of a group operation, rejecting the identity.
    pub fn from_point(point: ProjectivePoint) -> Result<Self, DhkeError> {
        let key = k256::PublicKey::from_affine(point.to_affine()).map_err(|_| DhkeError::IdentityPoint)?;
        Ok(Self { point: *key.as_affine() })
    }

    pub fn from_secret(secret: &SecretKey) -> Self {
        let point = ProjectivePoint::GENERATOR * *secret.as_scalar();
        Self { point: point.to_affine() }
    }

    pub fn as_point(&self) -> ProjectivePoint {
        ProjectivePoint::from(self.point)
    }

    pub fn to_bytes(&self) -> [u8; COMPRESSED_POINT_LEN] {
        let encoded = self.point.to_encoded_point(true);
        let mut bytes = [0u8; COMPRESSED_POINT_LEN];
        bytes.copy_from_slice(encoded.as_bytes());
        bytes
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.as_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        PublicKey::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

/// A non-zero secp256k1 scalar used as a private key. Wallets never hold one; mints (and the in-process mock mint)
/// sign with it.
#[derive(Clone)]
pub struct SecretKey(NonZeroScalar);

impl SecretKey {
    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(NonZeroScalar::random(rng))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DhkeError> {
        let scalar = NonZeroScalar::try_from(bytes).map_err(|_| DhkeError::InvalidScalar)?;
        Ok(Self(scalar))
    }

    pub fn from_hex(hex: &str) -> Result<Self, DhkeError> {
        let bytes = Zeroizing::new(hex::decode(hex)?);
        Self::from_bytes(&bytes)
    }

    pub fn as_scalar(&self) -> &Scalar {
        self.0.as_ref()
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret(self)
    }
}

impl Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretKey")
    }
}

/// The blinding factor `r` that masks a secret's curve image before it is sent to the mint.
///
/// It must be kept, paired with its output, until the mint's promise has been unblinded.
#[derive(Clone)]
pub struct BlindingFactor(NonZeroScalar);

impl BlindingFactor {
    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        Self(NonZeroScalar::random(rng))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DhkeError> {
        let scalar = NonZeroScalar::try_from(bytes).map_err(|_| DhkeError::InvalidScalar)?;
        Ok(Self(scalar))
    }

    pub fn from_hex(hex: &str) -> Result<Self, DhkeError> {
        let bytes = Zeroizing::new(hex::decode(hex)?);
        Self::from_bytes(&bytes)
    }

    pub fn as_scalar(&self) -> &Scalar {
        self.0.as_ref()
    }

    pub fn as_hex(&self) -> String {
        hex::encode(self.as_scalar().to_bytes())
    }
}

impl Debug for BlindingFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BlindingFactor")
    }
}

/// The random pre-image of a proof.
///
/// The raw bytes never leave the wallet. What the mint sees, and what is hashed to the curve, is the canonical
/// textual form returned by [`Secret::encode`].
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<[u8; SECRET_LEN]>);

impl Secret {
    pub fn random<R: CryptoRng + RngCore>(rng: &mut R) -> Self {
        let mut bytes = Zeroizing::new([0u8; SECRET_LEN]);
        rng.fill_bytes(bytes.as_mut_slice());
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SECRET_LEN]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; SECRET_LEN] {
        &self.0
    }

    /// The canonical encoding of the secret: standard, padded base64 of the raw bytes.
    ///
    /// Both the wallet and the mint hash the UTF-8 bytes of this string, so it is part of the protocol.
    pub fn encode(&self) -> String {
        BASE64.encode(self.0.as_slice())
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Secret")
    }
}
