use crate::amount::Amount;
use crate::cryptography::dhke::{blind_secret, unblind_signature};
use crate::cryptography::keys::{BlindingFactor, PublicKey, Secret};
use crate::cryptography::DhkeError;
use crate::proofs::{BlindSignature, BlindedMessage, Keys, Proof};
use crate::wallet::errors::WalletError;
use rand_core::{CryptoRng, RngCore};

/// Everything needed to turn one promise back into a proof. Never leaves the wallet.
struct PreMint {
    amount: Amount,
    secret: Secret,
    r: BlindingFactor,
    blinded: PublicKey,
}

/// Fresh secrets and blinding factors for a batch of outputs, kept in request order.
///
/// Position `i` of the request, of the mint's response, and of this list all describe the same output.
pub struct PreMintSecrets {
    entries: Vec<PreMint>,
}

impl PreMintSecrets {
    /// Draws a fresh secret and blinding factor for each of `amounts`, in order.
    pub fn random<R: CryptoRng + RngCore>(amounts: &[Amount], rng: &mut R) -> Result<Self, DhkeError> {
        let entries = amounts
            .iter()
            .map(|&amount| {
                let secret = Secret::random(rng);
                let (blinded, r) = blind_secret(&secret, rng)?;
                Ok(PreMint { amount, secret, r, blinded })
            })
            .collect::<Result<Vec<_>, DhkeError>>()?;
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn amounts(&self) -> Vec<Amount> {
        self.entries.iter().map(|e| e.amount).collect()
    }

    /// The outputs to send to the mint.
    pub fn blinded_messages(&self) -> Vec<BlindedMessage> {
        self.entries.iter().map(|e| BlindedMessage { amount: e.amount, blinded: e.blinded }).collect()
    }

    /// Unblinds `promises`, which must answer these outputs one for one and in the same order.
    pub fn construct_proofs(&self, promises: &[BlindSignature], keys: &Keys) -> Result<Vec<Proof>, WalletError> {
        if promises.len() != self.entries.len() {
            return Err(WalletError::InvalidRequest(format!(
                "Mint returned {} promises for {} outputs",
                promises.len(),
                self.entries.len()
            )));
        }
        self.entries
            .iter()
            .zip(promises)
            .map(|(entry, promise)| {
                if promise.amount != entry.amount {
                    return Err(WalletError::InvalidRequest(format!(
                        "Promise for {} answers an output of {}",
                        promise.amount, entry.amount
                    )));
                }
                let key = keys
                    .amount_key(promise.amount)
                    .ok_or_else(|| WalletError::InvalidRequest(format!("Mint has no key for {}", promise.amount)))?;
                let signature = unblind_signature(&promise.blinded_signature, &entry.r, key)?;
                Ok(Proof { id: promise.id.clone(), amount: promise.amount, secret: entry.secret.encode(), signature })
            })
            .collect()
    }
}
