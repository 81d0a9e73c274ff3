pub mod amount;
pub mod config;
pub mod cryptography;
pub mod invoice;
pub mod mint;
pub mod proof_store;
pub mod proofs;
pub mod storage;
pub mod token;
pub mod wallet;

pub use amount::Amount;
pub use proofs::Proof;
pub use wallet::{Wallet, WalletError};
