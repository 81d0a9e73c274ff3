use crate::amount::Amount;
use crate::cryptography::keys::PublicKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A blinded output sent to the mint. Ephemeral: it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindedMessage {
    pub amount: Amount,
    /// `B_ = hash_to_curve(secret) + r·G`
    #[serde(rename = "B_")]
    pub blinded: PublicKey,
}

/// The mint's blind signature (a "promise") over one [`BlindedMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlindSignature {
    /// Keyset id
    #[serde(default)]
    pub id: String,
    pub amount: Amount,
    /// `C_ = a·B_`
    #[serde(rename = "C_")]
    pub blinded_signature: PublicKey,
}

/// A bearer token: a secret together with the mint's unblinded signature over its curve image.
///
/// The wallet cannot check a proof locally. It is only known to be valid once the mint accepts it in a split or melt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proof {
    /// Keyset id
    #[serde(default)]
    pub id: String,
    pub amount: Amount,
    /// The canonical (base64) encoding of the secret.
    pub secret: String,
    /// `C = a·hash_to_curve(secret)`
    #[serde(rename = "C")]
    pub signature: PublicKey,
}

/// The total value of `proofs`, or `None` if it overflows. Proofs received from others can carry any amount.
pub fn sum_proofs(proofs: &[Proof]) -> Option<Amount> {
    Amount::checked_sum(proofs.iter().map(|p| p.amount))
}

/// The mint's public key for every denomination it signs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keys {
    keys: BTreeMap<Amount, PublicKey>,
}

impl Keys {
    pub fn new(keys: BTreeMap<Amount, PublicKey>) -> Self {
        Self { keys }
    }

    pub fn amount_key(&self, amount: Amount) -> Option<&PublicKey> {
        self.keys.get(&amount)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Amount, &PublicKey)> {
        self.keys.iter()
    }
}

impl FromIterator<(Amount, PublicKey)> for Keys {
    fn from_iter<T: IntoIterator<Item = (Amount, PublicKey)>>(iter: T) -> Self {
        Self { keys: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const POINT: &str = "02a9acc1e48c25eeeb9289b5031cc57da9fe72f3fe2861d264bdc074209b107ba2";

    #[test]
    fn wire_names() {
        let point = PublicKey::from_hex(POINT).unwrap();
        let msg = BlindedMessage { amount: Amount::from_sat(8), blinded: point };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json, serde_json::json!({"amount": 8, "B_": POINT}));

        let promise: BlindSignature =
            serde_json::from_value(serde_json::json!({"id": "I2yN+iRYfkzT", "amount": 8, "C_": POINT})).unwrap();
        assert_eq!(promise.amount, Amount::from_sat(8));
        assert_eq!(promise.blinded_signature, point);

        let proof =
            Proof { id: "I2yN+iRYfkzT".into(), amount: Amount::from_sat(2), secret: "abc=".into(), signature: point };
        let json = serde_json::to_value(&proof).unwrap();
        assert_eq!(json, serde_json::json!({"id": "I2yN+iRYfkzT", "amount": 2, "secret": "abc=", "C": POINT}));
    }

    #[test]
    fn keys_from_mint_json() {
        let generator = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";
        let json = format!(r#"{{"1": "{POINT}", "2": "{generator}"}}"#);
        let keys: Keys = serde_json::from_str(&json).unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.amount_key(Amount::from_sat(1)).unwrap().as_hex(), POINT);
        assert!(keys.amount_key(Amount::from_sat(4)).is_none());
    }

    #[test]
    fn sums() {
        let point = PublicKey::from_hex(POINT).unwrap();
        let proofs = [1u64, 4, 8]
            .into_iter()
            .map(|a| Proof { id: String::new(), amount: Amount::from_sat(a), secret: a.to_string(), signature: point })
            .collect::<Vec<_>>();
        assert_eq!(sum_proofs(&proofs), Some(Amount::from_sat(13)));
        assert_eq!(sum_proofs(&[]), Some(Amount::ZERO));
        let huge =
            Proof { id: String::new(), amount: Amount::from_sat(1 << 63), secret: "a".into(), signature: point };
        assert_eq!(sum_proofs(&[huge.clone(), huge]), None);
    }
}
