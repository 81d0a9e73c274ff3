use crate::config::GlobalOptions;
use crate::error::CliError;
use libnutmeg::config::{default_data_dir, WalletConfig};
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub fn default_config_path() -> PathBuf {
    default_data_dir().join("config.yml")
}

pub fn load_config_file<P: AsRef<Path>>(path: P) -> Result<WalletConfig, CliError> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let config = serde_yml::from_reader(reader)?;
    Ok(config)
}

pub fn save_config_file<P: AsRef<Path>>(path: P, config: &WalletConfig) -> Result<(), CliError> {
    // Create directory path if required
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let writer = std::io::BufWriter::new(file);
    serde_yml::to_writer(writer, config)?;
    Ok(())
}

/// Reads the configuration file, falling back to the defaults if there is none, then applies the command-line
/// overrides.
pub fn resolve_config(options: &GlobalOptions) -> Result<WalletConfig, CliError> {
    let path = options.config_file.clone().unwrap_or_else(default_config_path);
    let mut config: WalletConfig = match load_config_file(&path) {
        Ok(config) => config,
        Err(CliError::IoError(err)) if err.kind() == ErrorKind::NotFound => {
            debug!("No configuration file at {}. Using defaults.", path.display());
            WalletConfig::default()
        }
        Err(err) => return Err(err),
    };
    apply_overrides(&mut config, options);
    Ok(config)
}

pub fn apply_overrides(config: &mut WalletConfig, options: &GlobalOptions) {
    if let Some(mint_url) = &options.mint_url {
        config.mint_url = mint_url.clone();
    }
    if let Some(wallet_file) = &options.wallet_file {
        config.wallet_file = wallet_file.clone();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn options(config_file: PathBuf) -> GlobalOptions {
        GlobalOptions { config_file: Some(config_file), mint_url: None, wallet_file: None }
    }

    #[test]
    fn missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_config(&options(dir.path().join("config.yml"))).unwrap();
        assert_eq!(config, WalletConfig::default());
    }

    #[test]
    fn file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        let saved = WalletConfig::new("https://mint.example.com", dir.path().join("wallet.json"));
        save_config_file(&path, &saved).unwrap();
        assert_eq!(load_config_file(&path).unwrap(), saved);

        let mut opts = options(path);
        opts.mint_url = Some("http://localhost:3338".into());
        let config = resolve_config(&opts).unwrap();
        assert_eq!(config.mint_url, "http://localhost:3338");
        assert_eq!(config.wallet_file, saved.wallet_file);
    }

    #[test]
    fn broken_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");
        std::fs::write(&path, "mint_url: [unterminated").unwrap();
        assert!(matches!(resolve_config(&options(path)), Err(CliError::InvalidConfig(_))));
    }
}
