use crate::proof_store::ProofSet;

/// The persistence contract for a wallet's proofs.
///
/// The whole set is loaded once and rewritten in full on every change. Implementations give no atomicity
/// guarantees beyond what their backing medium offers.
pub trait ProofStorage {
    fn load(&self) -> Result<ProofSet, anyhow::Error>;
    fn save(&mut self, proofs: &ProofSet) -> Result<(), anyhow::Error>;
}
