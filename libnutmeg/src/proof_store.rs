//! The wallet's proofs and their lifecycle.
//!
//! Every proof is keyed by its secret and is in one of two states:
//!
//! * [`ProofState::Unspent`]: counted in both the spendable and the total balance.
//! * [`ProofState::Reserved`]: earmarked for a receiver. Still persisted and counted in the total balance, but not
//!   spendable.
//!
//! A spent proof is simply removed from the set. There are no tombstones.

use crate::amount::Amount;
use crate::cryptography::keys::PublicKey;
use crate::proofs::Proof;
use crate::storage::ProofStorage;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProofState {
    Unspent,
    Reserved,
}

/// A proof as held by the wallet, with its reservation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProof {
    #[serde(default)]
    pub id: String,
    pub amount: Amount,
    pub secret: String,
    #[serde(rename = "C")]
    pub signature: PublicKey,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub reserved: bool,
}

impl StoredProof {
    pub fn state(&self) -> ProofState {
        match self.reserved {
            true => ProofState::Reserved,
            false => ProofState::Unspent,
        }
    }

    pub fn to_proof(&self) -> Proof {
        Proof { id: self.id.clone(), amount: self.amount, secret: self.secret.clone(), signature: self.signature }
    }
}

impl From<Proof> for StoredProof {
    fn from(proof: Proof) -> Self {
        StoredProof {
            id: proof.id,
            amount: proof.amount,
            secret: proof.secret,
            signature: proof.signature,
            reserved: false,
        }
    }
}

/// The set of proofs owned by the wallet, unique by secret, in insertion order. This is the persisted document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProofSet {
    proofs: Vec<StoredProof>,
}

impl ProofSet {
    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StoredProof> {
        self.proofs.iter()
    }

    pub fn get(&self, secret: &str) -> Option<&StoredProof> {
        self.proofs.iter().find(|p| p.secret == secret)
    }

    pub fn contains(&self, secret: &str) -> bool {
        self.get(secret).is_some()
    }

    /// Secrets of the proofs currently earmarked for a receiver.
    pub fn reserved_secrets(&self) -> HashSet<&str> {
        self.proofs.iter().filter(|p| p.reserved).map(|p| p.secret.as_str()).collect()
    }

    /// Adds the proofs whose secrets are not already present. Returns the number added.
    pub fn insert_all<I: IntoIterator<Item = Proof>>(&mut self, proofs: I) -> usize {
        let mut known = self.proofs.iter().map(|p| p.secret.clone()).collect::<HashSet<_>>();
        let before = self.proofs.len();
        for proof in proofs {
            if known.insert(proof.secret.clone()) {
                self.proofs.push(proof.into());
            } else {
                debug!("Ignoring duplicate {} proof", proof.amount);
            }
        }
        self.proofs.len() - before
    }

    /// Flags the matching proofs as reserved. Returns the number that changed state.
    pub fn mark_reserved(&mut self, secrets: &[String]) -> usize {
        let secrets = secrets.iter().collect::<HashSet<_>>();
        let mut changed = 0;
        for proof in self.proofs.iter_mut().filter(|p| secrets.contains(&p.secret)) {
            if !proof.reserved {
                proof.reserved = true;
                changed += 1;
            }
        }
        changed
    }

    /// Drops the matching proofs. Returns the number removed.
    pub fn remove_all(&mut self, secrets: &[String]) -> usize {
        let secrets = secrets.iter().collect::<HashSet<_>>();
        let before = self.proofs.len();
        self.proofs.retain(|p| !secrets.contains(&p.secret));
        before - self.proofs.len()
    }

    pub fn total_balance(&self) -> Amount {
        self.proofs.iter().map(|p| p.amount).sum()
    }

    pub fn spendable_balance(&self) -> Amount {
        self.proofs.iter().filter(|p| !p.reserved).map(|p| p.amount).sum()
    }
}

impl FromIterator<Proof> for ProofSet {
    fn from_iter<T: IntoIterator<Item = Proof>>(iter: T) -> Self {
        let mut set = ProofSet::default();
        set.insert_all(iter);
        set
    }
}

/// Owns the wallet's [`ProofSet`] and writes it through to a [`ProofStorage`] on every mutation.
///
/// Each mutation is applied to a copy of the set, saved, and only then made current. If saving fails, the in-memory
/// set still matches what was last persisted.
pub struct ProofStore<S> {
    storage: S,
    proofs: ProofSet,
}

impl<S: ProofStorage> ProofStore<S> {
    /// Loads the persisted proof set from `storage`.
    pub fn open(storage: S) -> Result<Self, anyhow::Error> {
        let proofs = storage.load()?;
        debug!("Proof store opened with {} proofs worth {}", proofs.len(), proofs.total_balance());
        Ok(Self { storage, proofs })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn proof_set(&self) -> &ProofSet {
        &self.proofs
    }

    pub fn len(&self) -> usize {
        self.proofs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proofs.is_empty()
    }

    pub fn state(&self, secret: &str) -> Option<ProofState> {
        self.proofs.get(secret).map(StoredProof::state)
    }

    /// Every retained proof, reserved or not.
    pub fn proofs(&self) -> Vec<Proof> {
        self.proofs.iter().map(StoredProof::to_proof).collect()
    }

    pub fn unreserved_proofs(&self) -> Vec<Proof> {
        self.proofs.iter().filter(|p| !p.reserved).map(StoredProof::to_proof).collect()
    }

    pub fn reserved_secrets(&self) -> HashSet<&str> {
        self.proofs.reserved_secrets()
    }

    pub fn reserved_proofs(&self) -> Vec<Proof> {
        self.proofs.iter().filter(|p| p.reserved).map(StoredProof::to_proof).collect()
    }

    pub fn spendable_balance(&self) -> Amount {
        self.proofs.spendable_balance()
    }

    pub fn total_balance(&self) -> Amount {
        self.proofs.total_balance()
    }

    pub fn add(&mut self, proofs: Vec<Proof>) -> Result<usize, anyhow::Error> {
        self.update(|set| set.insert_all(proofs))
    }

    /// Idempotent: reserving an already reserved (or unknown) secret is a no-op.
    pub fn mark_reserved(&mut self, secrets: &[String]) -> Result<usize, anyhow::Error> {
        self.update(|set| set.mark_reserved(secrets))
    }

    pub fn remove(&mut self, secrets: &[String]) -> Result<usize, anyhow::Error> {
        self.update(|set| set.remove_all(secrets))
    }

    /// Removes `spent` and adds `fresh` as a single persisted change.
    pub fn replace(&mut self, spent: &[String], fresh: Vec<Proof>) -> Result<(), anyhow::Error> {
        self.update(|set| {
            set.remove_all(spent);
            set.insert_all(fresh);
        })
    }

    fn update<T, F: FnOnce(&mut ProofSet) -> T>(&mut self, f: F) -> Result<T, anyhow::Error> {
        let mut next = self.proofs.clone();
        let result = f(&mut next);
        self.storage.save(&next)?;
        trace!("Proof store updated: {} proofs, {} spendable", next.len(), next.spendable_balance());
        self.proofs = next;
        Ok(result)
    }
}
