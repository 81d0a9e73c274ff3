#![doc = include_str!("../README.md")]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Nutmeg ecash wallet.
///
/// Mint, send, receive and melt blind-signed ecash proofs.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Config {
    /// Path to the configuration file. The default is `$HOME/.nutmeg/config.yml`.
    #[arg(long = "config-file", short = 'c')]
    pub config_file: Option<PathBuf>,
    /// Base URL of the mint. Overrides the configuration file.
    #[arg(long = "mint-url", short = 'm', env = "NUTMEG_MINT_URL")]
    pub mint_url: Option<String>,
    /// Path to the wallet document. Overrides the configuration file.
    #[arg(long = "wallet-file", short = 'w')]
    pub wallet_file: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Request a mint invoice for an amount, or mint the amount once the invoice is paid.
    #[command(name = "invoice", alias = "mint")]
    Invoice {
        /// The amount, in satoshis.
        amount: u64,
        /// The payment hash of a paid invoice. If omitted, a new invoice is requested.
        hash: Option<String>,
    },
    /// Create a token worth an amount, to hand to someone else.
    Send {
        /// The amount, in satoshis.
        amount: u64,
    },
    /// Redeem a token.
    #[command(name = "receive", alias = "redeem")]
    Receive {
        /// The token, as printed by `send`.
        token: String,
    },
    /// Pay a Lightning invoice.
    #[command(name = "pay", alias = "melt")]
    Pay {
        /// A BOLT11 payment request.
        invoice: String,
    },
    /// Show the wallet balance.
    #[command(name = "balance", alias = "bal")]
    Balance,
    /// Manage the configuration file.
    #[command(subcommand, name = "config")]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write the current settings to the configuration file.
    #[command(name = "init")]
    Init {
        /// Replace an existing file.
        #[arg(long = "force", short = 'f', default_value_t = false)]
        force: bool,
    },
}

pub struct GlobalOptions {
    pub config_file: Option<PathBuf>,
    pub mint_url: Option<String>,
    pub wallet_file: Option<PathBuf>,
}

impl Config {
    pub fn to_parts(self) -> (GlobalOptions, CliCommand) {
        let global =
            GlobalOptions { config_file: self.config_file, mint_url: self.mint_url, wallet_file: self.wallet_file };
        (global, self.command)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parses_commands() {
        let config = Config::parse_from(["nutmeg", "-m", "http://mint:3338", "invoice", "100", "abcd"]);
        let (options, command) = config.to_parts();
        assert_eq!(options.mint_url.as_deref(), Some("http://mint:3338"));
        assert!(matches!(command, CliCommand::Invoice { amount: 100, hash: Some(ref h) } if h == "abcd"));

        let config = Config::parse_from(["nutmeg", "--wallet-file", "/tmp/w.json", "balance"]);
        assert_eq!(config.wallet_file, Some(PathBuf::from("/tmp/w.json")));
        assert!(matches!(config.command, CliCommand::Balance));

        let config = Config::parse_from(["nutmeg", "config", "init", "--force"]);
        assert!(matches!(config.command, CliCommand::Config(ConfigCommand::Init { force: true })));
    }

    #[test]
    fn amounts_must_be_numbers() {
        assert!(Config::try_parse_from(["nutmeg", "send", "lots"]).is_err());
    }
}
