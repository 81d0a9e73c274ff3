use crate::proof_store::ProofSet;
use crate::storage::traits::ProofStorage;

/// A volatile store, for tests and for wallets that only live as long as the process.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    proofs: ProofSet,
    save_count: usize,
}

impl MemoryStore {
    pub fn new(proofs: ProofSet) -> Self {
        Self { proofs, save_count: 0 }
    }

    /// The last saved set.
    pub fn snapshot(&self) -> &ProofSet {
        &self.proofs
    }

    /// How many times the set has been written.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl ProofStorage for MemoryStore {
    fn load(&self) -> Result<ProofSet, anyhow::Error> {
        Ok(self.proofs.clone())
    }

    fn save(&mut self, proofs: &ProofSet) -> Result<(), anyhow::Error> {
        self.proofs = proofs.clone();
        self.save_count += 1;
        Ok(())
    }
}
