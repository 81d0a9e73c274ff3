//! Transferable tokens.
//!
//! A token is the standard base64 encoding of the JSON array of proofs being handed over. Reservation flags are a
//! wallet-local concept and never travel inside a token.

use crate::proofs::Proof;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),
    #[error("Token does not contain a valid list of proofs: {0}")]
    InvalidProofs(#[from] serde_json::Error),
    #[error("Token contains no proofs")]
    Empty,
}

pub fn serialize_proofs(proofs: &[Proof]) -> Result<String, TokenError> {
    let json = serde_json::to_vec(proofs)?;
    Ok(BASE64.encode(json))
}

pub fn deserialize_proofs(token: &str) -> Result<Vec<Proof>, TokenError> {
    let json = BASE64.decode(token.trim())?;
    let proofs: Vec<Proof> = serde_json::from_slice(&json)?;
    if proofs.is_empty() {
        return Err(TokenError::Empty);
    }
    Ok(proofs)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::amount::Amount;
    use crate::cryptography::keys::PublicKey;

    fn proof(amount: u64, secret: &str) -> Proof {
        Proof {
            id: "keyset".into(),
            amount: Amount::from_sat(amount),
            secret: secret.into(),
            signature: PublicKey::from_hex("02a9acc1e48c25eeeb9289b5031cc57da9fe72f3fe2861d264bdc074209b107ba2")
                .unwrap(),
        }
    }

    #[test]
    fn token_carries_proofs() {
        let proofs = vec![proof(1, "one"), proof(4, "four")];
        let token = serialize_proofs(&proofs).unwrap();
        assert!(!token.contains('{'));
        assert_eq!(deserialize_proofs(&format!("{token}\n")).unwrap(), proofs);
    }

    #[test]
    fn bad_tokens() {
        assert!(matches!(deserialize_proofs("not base64!"), Err(TokenError::InvalidEncoding(_))));
        let not_proofs = BASE64.encode(br#"{"hello": 1}"#);
        assert!(matches!(deserialize_proofs(&not_proofs), Err(TokenError::InvalidProofs(_))));
        let empty = BASE64.encode(b"[]");
        assert!(matches!(deserialize_proofs(&empty), Err(TokenError::Empty)));
    }
}
