pub mod cli;
pub mod core;
pub mod providers;

use crate::cli::launch::LaunchRequest;
use crate::cli::profile::ProfileOptions;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::launch::MessageSigner;
use crate::core::user::{UserDataManager, WalletSession};
use crate::providers::command_signer::CommandSigner;
use crate::providers::pump_fun::PumpFunClient;
use crate::providers::solana_rpc::SolanaRpcClient;
use crate::providers::solmosaic_api::SolmosaicApi;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const BALANCE_CACHE_TTL: Duration = Duration::from_secs(60);

pub enum AppCommand {
    Explore {
        query: Option<String>,
        collection: Option<String>,
    },
    Fractional {
        nft_id: String,
        fragments: Option<i64>,
        quantity: Option<i64>,
    },
    Portfolio {
        id: Option<String>,
    },
    Profile(ProfileOptions),
    Launch(LaunchRequest),
    LaunchStatus {
        token_mint: String,
    },
}

fn wallet_session(config: &AppConfig) -> Result<WalletSession> {
    match &config.wallet {
        Some(key) => WalletSession::connected(key)
            .with_context(|| format!("Invalid wallet address in config: {key}")),
        None => Ok(WalletSession::disconnected()),
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("SolMosaic starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    let currency = config.currency.as_str();

    match command {
        AppCommand::Explore { query, collection } => cli::explore::run(
            &config.catalog,
            query.as_deref(),
            collection.as_deref(),
            currency,
        ),
        AppCommand::Fractional {
            nft_id,
            fragments,
            quantity,
        } => cli::fractional::run(&config.catalog, &nft_id, fragments, quantity, currency),
        AppCommand::Portfolio { id } => cli::portfolio::run(
            &config.portfolios,
            &config.shares,
            &config.catalog,
            id.as_deref(),
            currency,
        ),
        AppCommand::Profile(options) => {
            let wallet = wallet_session(&config)?;
            let api = SolmosaicApi::new(config.providers.api_url())?;
            let balance_cache = Arc::new(Cache::with_ttl(BALANCE_CACHE_TTL));
            let chain = SolanaRpcClient::new(config.providers.rpc_url(), balance_cache)?;
            let manager = UserDataManager::new(wallet, Arc::new(api), Arc::new(chain));
            cli::profile::run(&manager, options, currency).await
        }
        AppCommand::Launch(request) => {
            let wallet = wallet_session(&config)?;
            let api = Arc::new(PumpFunClient::new(config.providers.pump_url())?);
            let signer = config
                .signer
                .as_ref()
                .map(|s| CommandSigner::new(&s.command, &s.args));
            cli::launch::run(
                &request,
                &wallet,
                api,
                signer.as_ref().map(|s| s as &dyn MessageSigner),
                currency,
            )
            .await
        }
        AppCommand::LaunchStatus { token_mint } => {
            let api = Arc::new(PumpFunClient::new(config.providers.pump_url())?);
            cli::launch::status(api, &token_mint, currency).await
        }
    }
}
