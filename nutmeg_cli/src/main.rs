use anyhow::anyhow;
use clap::Parser;
use libnutmeg::config::WalletConfig;
use libnutmeg::mint::HttpMintClient;
use libnutmeg::storage::FileStore;
use libnutmeg::{Amount, Wallet};
use log::*;
use nutmeg_cli::config::{CliCommand, Config, ConfigCommand, GlobalOptions};
use nutmeg_cli::config_file::{apply_overrides, default_config_path, resolve_config, save_config_file};

type CliWallet = Wallet<HttpMintClient, FileStore>;

#[tokio::main]
async fn main() {
    env_logger::init();
    let config: Config = Config::parse();
    let (global_options, command) = config.to_parts();

    let result = match command {
        CliCommand::Config(config_cmd) => exec_config_command(config_cmd, global_options),
        command => exec_wallet_command(command, global_options).await,
    };

    if let Err(err) = result {
        eprintln!("** Error ** \n {err}");
        std::process::exit(1);
    }
}

fn exec_config_command(cmd: ConfigCommand, options: GlobalOptions) -> Result<(), anyhow::Error> {
    match cmd {
        ConfigCommand::Init { force } => {
            let path = options.config_file.clone().unwrap_or_else(default_config_path);
            if path.exists() && !force {
                return Err(anyhow!("{} already exists. Use --force to replace it.", path.display()));
            }
            let mut config = WalletConfig::default();
            apply_overrides(&mut config, &options);
            save_config_file(&path, &config)?;
            println!("Configuration written to {}", path.display());
        }
    }
    Ok(())
}

fn open_wallet(config: &WalletConfig) -> Result<CliWallet, anyhow::Error> {
    info!("Using mint {} and wallet file {}", config.mint_url, config.wallet_file.display());
    let mint = HttpMintClient::new(config)?;
    let store = FileStore::new(&config.wallet_file)?;
    Ok(Wallet::new(mint, store)?)
}

async fn exec_wallet_command(cmd: CliCommand, options: GlobalOptions) -> Result<(), anyhow::Error> {
    let config = resolve_config(&options)?;
    let mut wallet = open_wallet(&config)?;
    match cmd {
        CliCommand::Invoice { amount, hash: None } => {
            let amount = Amount::from_sat(amount);
            let invoice = wallet.request_mint(amount).await?;
            println!("Pay this invoice to mint {amount}:\n{}", invoice.pr);
            println!("Then run: nutmeg invoice {} {}", amount.to_sat(), invoice.hash);
        }
        CliCommand::Invoice { amount, hash: Some(hash) } => {
            wallet.load_mint().await?;
            let proofs = wallet.mint(Amount::from_sat(amount), &hash).await?;
            println!("Minted {} proofs", proofs.len());
        }
        CliCommand::Send { amount } => {
            wallet.load_mint().await?;
            let token = wallet.send(Amount::from_sat(amount)).await?;
            println!("{token}");
        }
        CliCommand::Receive { token } => {
            wallet.load_mint().await?;
            let proofs = wallet.receive(&token).await?;
            let received: Amount = proofs.iter().map(|p| p.amount).sum();
            println!("Received {received}");
        }
        CliCommand::Pay { invoice } => {
            wallet.load_mint().await?;
            let outcome = wallet.melt(&invoice).await?;
            if outcome.paid {
                println!("Paid {} (fee reserve {})", outcome.amount, outcome.fee);
                if let Some(preimage) = outcome.preimage {
                    println!("Preimage: {preimage}");
                }
            } else {
                println!("The mint could not pay the invoice. The proofs for it stay reserved.");
            }
        }
        CliCommand::Balance => {}
        CliCommand::Config(_) => return Err(anyhow!("config commands do not use the wallet")),
    }
    print_balance(&wallet);
    Ok(())
}

fn print_balance(wallet: &CliWallet) {
    let spendable = wallet.spendable_balance();
    let total = wallet.total_balance();
    if spendable == total {
        println!("Balance: {spendable}");
    } else {
        println!("Balance: {spendable} ({total} including reserved proofs)");
    }
}
