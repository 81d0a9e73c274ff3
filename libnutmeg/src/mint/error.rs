use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MintError {
    #[error("Could not reach the mint: {0}")]
    Transport(String),
    #[error("Mint error (code {code}): {error}")]
    Protocol { code: i64, error: String },
    #[error("Unexpected response from the mint: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for MintError {
    fn from(err: reqwest::Error) -> Self {
        MintError::Transport(err.to_string())
    }
}
