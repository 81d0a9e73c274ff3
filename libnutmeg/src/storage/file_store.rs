use crate::proof_store::ProofSet;
use crate::storage::traits::ProofStorage;
use log::{debug, trace};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A file-based store for the wallet's proofs.
///
/// The whole proof set lives in a single JSON document, e.g. `~/.nutmeg/wallet.json`, holding an array of
/// `{id, amount, secret, C, reserved?}` records. A missing file is treated as an empty wallet.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a new file store at the given path, creating the parent directory if required.
    ///
    /// # Arguments
    /// * `path` - The path to the wallet document. The file itself is only created on the first save.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self { path })
    }

    /// Returns the path to the wallet document.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl ProofStorage for FileStore {
    fn load(&self) -> Result<ProofSet, anyhow::Error> {
        let val = match fs::read_to_string(&self.path) {
            Ok(val) => val,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("No wallet file at {}. Starting with an empty proof set.", self.path.display());
                return Ok(ProofSet::default());
            }
            Err(err) => return Err(err.into()),
        };
        let proofs: ProofSet = serde_json::from_str(&val)?;
        trace!("Loaded {} proofs from {}", proofs.len(), self.path.display());
        Ok(proofs)
    }

    fn save(&mut self, proofs: &ProofSet) -> Result<(), anyhow::Error> {
        let val = serde_json::to_string_pretty(proofs)?;
        fs::write(&self.path, &val)?;
        trace!("Saved {} proofs to {}", proofs.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::amount::Amount;
    use crate::cryptography::keys::PublicKey;
    use crate::proof_store::ProofStore;
    use crate::proofs::Proof;

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
    fn missing_file_is_an_empty_wallet() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("wallet.json")).expect("directory to exist");
        assert!(store.load().unwrap().is_empty());
        assert!(dir.path().join("nested").exists());
    }

    /// Mutates the store and reloads it from disk after every step. We should be able to carry on as if nothing
    /// happened.
    #[test]
    fn proofs_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");

        let mut store = ProofStore::open(FileStore::new(&path).unwrap()).unwrap();
        store.add(vec![proof(1, "a"), proof(2, "b"), proof(8, "c")]).unwrap();
        store.mark_reserved(&["b".to_string()]).unwrap();

        let mut store = ProofStore::open(FileStore::new(&path).unwrap()).unwrap();
        assert_eq!(store.total_balance(), Amount::from_sat(11));
        assert_eq!(store.spendable_balance(), Amount::from_sat(9));
        store.remove(&["c".to_string()]).unwrap();

        let store = ProofStore::open(FileStore::new(&path).unwrap()).unwrap();
        assert_eq!(store.total_balance(), Amount::from_sat(3));
        assert_eq!(store.spendable_balance(), Amount::from_sat(1));
    }

    #[test]
    fn document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        let mut store = ProofStore::open(FileStore::new(&path).unwrap()).unwrap();
        store.add(vec![proof(1, "a"), proof(2, "b")]).unwrap();
        store.mark_reserved(&["b".to_string()]).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let records = doc.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["secret"], "a");
        assert!(records[0].get("reserved").is_none());
        assert_eq!(records[1]["reserved"], true);
        assert_eq!(records[1]["C"], "02a9acc1e48c25eeeb9289b5031cc57da9fe72f3fe2861d264bdc074209b107ba2");
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(FileStore::new(&path).unwrap().load().is_err());
    }
}
