use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MINT_URL: &str = "http://127.0.0.1:3338";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Everything a wallet needs to know about its surroundings. Passed explicitly to whatever needs it; there is no
/// global configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Base URL of the mint's HTTP API.
    pub mint_url: String,
    /// Where the proof set is persisted.
    pub wallet_file: PathBuf,
    /// Timeout for a single mint request, in seconds.
    pub timeout_secs: u64,
}

impl WalletConfig {
    pub fn new<S: Into<String>>(mint_url: S, wallet_file: PathBuf) -> Self {
        Self { mint_url: mint_url.into(), wallet_file, timeout_secs: DEFAULT_TIMEOUT_SECS }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MINT_URL, default_wallet_path())
    }
}

/// `$HOME/.nutmeg`, or `./.nutmeg` if there is no home directory.
pub fn default_data_dir() -> PathBuf {
    let mut home = std::env::home_dir().unwrap_or_else(|| PathBuf::from("."));
    home.push(".nutmeg");
    home
}

pub fn default_wallet_path() -> PathBuf {
    default_data_dir().join("wallet.json")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: WalletConfig = serde_json::from_str(r#"{"mint_url": "https://mint.example.com"}"#).unwrap();
        assert_eq!(config.mint_url, "https://mint.example.com");
        assert_eq!(config.wallet_file, default_wallet_path());
        assert_eq!(config.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn default_points_at_local_mint() {
        let config = WalletConfig::default();
        assert_eq!(config.mint_url, "http://127.0.0.1:3338");
        assert!(config.wallet_file.ends_with(".nutmeg/wallet.json"));
    }
}
