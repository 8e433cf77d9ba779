//! Token launch: SPL token parameters and pump.fun registration.

use crate::core::error::{ServiceError, ServiceResult};
use crate::core::user::{WalletSession, validate_public_key};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const MAX_DECIMALS: u8 = 9;
pub const MAX_NAME_LEN: usize = 32;
pub const MAX_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenCreationParams {
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
    pub supply: u64,
    pub decimals: u8,
    pub website: Option<String>,
    pub twitter: Option<String>,
    pub telegram: Option<String>,
    pub discord: Option<String>,
}

impl Default for TokenCreationParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            symbol: String::new(),
            description: String::new(),
            image: String::new(),
            supply: 1_000_000_000,
            decimals: 9,
            website: None,
            twitter: None,
            telegram: None,
            discord: None,
        }
    }
}

impl TokenCreationParams {
    pub fn validate(&self) -> ServiceResult<()> {
        let name = self.name.trim();
        if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
            return Err(ServiceError::invalid(format!(
                "token name must be 1 to {MAX_NAME_LEN} characters"
            )));
        }
        if self.symbol.is_empty()
            || self.symbol.len() > MAX_SYMBOL_LEN
            || !self.symbol.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(ServiceError::invalid(format!(
                "token symbol must be 1 to {MAX_SYMBOL_LEN} ASCII letters or digits, got '{}'",
                self.symbol
            )));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(ServiceError::invalid(format!(
                "decimals must be at most {MAX_DECIMALS}, got {}",
                self.decimals
            )));
        }
        if self.supply == 0 {
            return Err(ServiceError::invalid("supply must be greater than zero"));
        }
        self.raw_supply()?;
        Ok(())
    }

    /// Supply in base units, i.e. `supply * 10^decimals`.
    pub fn raw_supply(&self) -> ServiceResult<u64> {
        10u64
            .checked_pow(self.decimals as u32)
            .and_then(|scale| self.supply.checked_mul(scale))
            .ok_or_else(|| {
                ServiceError::invalid(format!(
                    "supply {} with {} decimals overflows a u64 amount",
                    self.supply, self.decimals
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PumpLaunchParams {
    pub token_mint: String,
    pub initial_price: f64,
    pub max_supply: u64,
    pub trading_fee: f64,
    pub creator_fee: f64,
    pub liquidity_percentage: f64,
}

impl Default for PumpLaunchParams {
    fn default() -> Self {
        Self {
            token_mint: String::new(),
            initial_price: 0.000001,
            max_supply: 1_000_000_000,
            trading_fee: 3.0,
            creator_fee: 7.0,
            liquidity_percentage: 90.0,
        }
    }
}

impl PumpLaunchParams {
    /// Launch defaults for a freshly created token, capped at its supply.
    pub fn for_token(token_mint: &str, token: &TokenCreationParams) -> Self {
        Self {
            token_mint: token_mint.to_string(),
            max_supply: token.supply,
            ..Default::default()
        }
    }

    /// Full validation, including the token mint.
    pub fn validate(&self) -> ServiceResult<()> {
        if self.token_mint.is_empty() {
            return Err(ServiceError::invalid(
                "create a token first or provide a token mint address",
            ));
        }
        validate_public_key(&self.token_mint)?;
        self.validate_terms()
    }

    /// Price, supply, fee and liquidity checks. The mint is not looked at.
    pub fn validate_terms(&self) -> ServiceResult<()> {
        if !(self.initial_price.is_finite() && self.initial_price > 0.0) {
            return Err(ServiceError::invalid(format!(
                "initial price must be positive, got {}",
                self.initial_price
            )));
        }
        if self.max_supply == 0 {
            return Err(ServiceError::invalid("max supply must be greater than zero"));
        }
        for (name, fee) in [
            ("trading fee", self.trading_fee),
            ("creator fee", self.creator_fee),
        ] {
            if !(0.0..=100.0).contains(&fee) {
                return Err(ServiceError::invalid(format!(
                    "{name} must be between 0 and 100, got {fee}"
                )));
            }
        }
        if self.trading_fee + self.creator_fee > 100.0 {
            return Err(ServiceError::invalid("combined fees exceed 100%"));
        }
        if !(self.liquidity_percentage > 0.0 && self.liquidity_percentage <= 100.0) {
            return Err(ServiceError::invalid(format!(
                "liquidity percentage must be in (0, 100], got {}",
                self.liquidity_percentage
            )));
        }
        Ok(())
    }

    /// Market cap at the initial price if the whole supply were sold.
    pub fn fully_diluted_value(&self) -> f64 {
        self.initial_price * self.max_supply as f64
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchReceipt {
    pub token_mint: String,
    #[serde(default)]
    pub launch_id: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LaunchStatus {
    pub token_mint: String,
    pub status: String,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub bonding_curve_progress: Option<f64>,
}

/// Signs an authentication challenge with the user's wallet.
///
/// Returns the encoded signature exactly as the launch API expects it.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    async fn sign_message(&self, message: &[u8]) -> ServiceResult<String>;
}

#[async_trait]
pub trait LaunchApi: Send + Sync {
    async fn fetch_challenge(&self, wallet: &str) -> ServiceResult<String>;
    async fn submit_launch(
        &self,
        wallet: &str,
        signature: &str,
        params: &PumpLaunchParams,
    ) -> ServiceResult<LaunchReceipt>;
    async fn launch_status(&self, token_mint: &str) -> ServiceResult<LaunchStatus>;
}

pub struct LaunchService {
    api: Arc<dyn LaunchApi>,
}

impl LaunchService {
    pub fn new(api: Arc<dyn LaunchApi>) -> Self {
        Self { api }
    }

    /// Authenticates with a signed challenge and registers the launch.
    #[instrument(skip(self, wallet, signer, params), fields(mint = %params.token_mint))]
    pub async fn register(
        &self,
        wallet: &WalletSession,
        signer: &dyn MessageSigner,
        params: &PumpLaunchParams,
    ) -> ServiceResult<LaunchReceipt> {
        let address = wallet.public_key()?;
        params.validate()?;

        let challenge = self.api.fetch_challenge(address).await?;
        debug!("Received launch challenge for {address}");
        let signature = signer.sign_message(challenge.as_bytes()).await?;

        let receipt = self.api.submit_launch(address, &signature, params).await?;
        info!("Registered launch for {}", receipt.token_mint);
        Ok(receipt)
    }

    pub async fn status(&self, token_mint: &str) -> ServiceResult<LaunchStatus> {
        validate_public_key(token_mint)?;
        self.api.launch_status(token_mint).await
    }
}
