use crate::amount::Amount;
use crate::cryptography::DhkeError;
use crate::invoice::InvoiceError;
use crate::mint::MintError;
use crate::token::TokenError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("{0}")]
    Mint(#[from] MintError),
    #[error("Insufficient balance. Requested {requested}, but only {available} is spendable")]
    InsufficientBalance { requested: Amount, available: Amount },
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Curve error: {0}")]
    Curve(#[from] DhkeError),
    #[error("Could not persist proofs: {0}")]
    Storage(#[from] anyhow::Error),
    #[error("Invoice error: {0}")]
    Invoice(#[from] InvoiceError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}
