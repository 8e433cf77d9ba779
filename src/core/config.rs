use crate::core::catalog::Catalog;
use crate::core::portfolio::{FractionalShare, Portfolio};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.solmosaic.com";
pub const DEFAULT_RPC_URL: &str = "https://api.devnet.solana.com";
pub const DEFAULT_PUMP_URL: &str = "https://api.pump.fun";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RpcProviderConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PumpProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub api: Option<ApiProviderConfig>,
    pub rpc: Option<RpcProviderConfig>,
    pub pump: Option<PumpProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            api: Some(ApiProviderConfig {
                base_url: DEFAULT_API_URL.to_string(),
            }),
            rpc: Some(RpcProviderConfig {
                url: DEFAULT_RPC_URL.to_string(),
            }),
            pump: Some(PumpProviderConfig {
                base_url: DEFAULT_PUMP_URL.to_string(),
            }),
        }
    }
}

impl ProvidersConfig {
    pub fn api_url(&self) -> &str {
        self.api.as_ref().map_or(DEFAULT_API_URL, |p| &p.base_url)
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc.as_ref().map_or(DEFAULT_RPC_URL, |p| &p.url)
    }

    pub fn pump_url(&self) -> &str {
        self.pump.as_ref().map_or(DEFAULT_PUMP_URL, |p| &p.base_url)
    }
}

/// External program used to sign launch challenges with the wallet key.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SignerConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_currency() -> String {
    "SOL".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Public key of the connected wallet.
    pub wallet: Option<String>,
    pub signer: Option<SignerConfig>,
    #[serde(default)]
    pub catalog: Catalog,
    #[serde(default)]
    pub portfolios: Vec<Portfolio>,
    #[serde(default)]
    pub shares: Vec<FractionalShare>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "solmosaic", "solmosaic")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for share in &self.shares {
            if !share.has_valid_percentage() {
                anyhow::bail!(
                    "Share {} must cover more than 0% and at most 100% of NFT {}, got {}%",
                    share.id,
                    share.nft_id,
                    share.percentage
                );
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
wallet: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"
signer:
  command: solana
  args: ["sign-offchain-message"]
catalog:
  collections:
    - id: art
      name: "Digital Art"
      creator: "ArtDAO"
      floor_price: 1.5
      volume_traded: 5420
      items: 1000
      holders: 450
  nfts:
    - id: "1"
      name: "Space Explorer #001"
      creator: "Studio Nebula"
      price: 2.5
      collection: art
      attributes:
        - trait_type: Rarity
          value: Rare
    - id: "8"
      name: "Digital Land #A451"
      creator: "MetaRealEstate"
      price: 8.5
portfolios:
  - id: p1
    name: "Blue Chip NFT Portfolio"
    owner: user1
    assets: ["1", "8"]
    performance:
      daily: 2.5
      weekly: 8.3
      monthly: 21.5
shares:
  - id: s1
    nft_id: "8"
    percentage: 15
    owner: user1
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.currency, "SOL");
        assert_eq!(
            config.wallet.as_deref(),
            Some("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU")
        );
        let signer = config.signer.as_ref().unwrap();
        assert_eq!(signer.command, "solana");
        assert_eq!(signer.args, vec!["sign-offchain-message"]);
        assert_eq!(config.catalog.collections.len(), 1);
        assert_eq!(config.catalog.collections[0].holders, 450);
        assert_eq!(config.catalog.nfts.len(), 2);
        assert_eq!(config.catalog.nfts[0].rarity(), Some("Rare"));
        assert!(config.catalog.nfts[1].collection.is_none());
        assert_eq!(config.portfolios[0].assets, vec!["1", "8"]);
        assert_eq!(config.portfolios[0].performance.monthly, 21.5);
        assert_eq!(config.shares[0].percentage, 15.0);

        assert_eq!(config.providers.api_url(), DEFAULT_API_URL);
        assert_eq!(config.providers.rpc_url(), DEFAULT_RPC_URL);
        assert_eq!(config.providers.pump_url(), DEFAULT_PUMP_URL);

        let yaml_str_with_providers = r#"
currency: "SOL"
providers:
  api:
    base_url: "http://example.com/api"
  rpc:
    url: "http://example.com/rpc"
        "#;
        let config_with_providers: AppConfig =
            serde_yaml::from_str(yaml_str_with_providers).unwrap();
        assert!(config_with_providers.wallet.is_none());
        assert!(config_with_providers.signer.is_none());
        assert!(config_with_providers.catalog.nfts.is_empty());
        assert_eq!(
            config_with_providers.providers.api_url(),
            "http://example.com/api"
        );
        assert_eq!(
            config_with_providers.providers.rpc_url(),
            "http://example.com/rpc"
        );
        assert_eq!(config_with_providers.providers.pump_url(), DEFAULT_PUMP_URL);
    }

    #[test]
    fn test_load_rejects_out_of_range_shares() -> Result<()> {
        for percentage in ["0", "250"] {
            let config_file = tempfile::NamedTempFile::new()?;
            fs::write(
                config_file.path(),
                format!(
                    "shares:\n  - id: s7\n    nft_id: \"1\"\n    percentage: {percentage}\n    owner: user1\n"
                ),
            )?;
            let err = AppConfig::load_from_path(config_file.path()).unwrap_err();
            assert!(err.to_string().contains("Share s7"), "unexpected error: {err}");
        }

        let config_file = tempfile::NamedTempFile::new()?;
        fs::write(
            config_file.path(),
            "shares:\n  - id: s8\n    nft_id: \"1\"\n    percentage: 100\n    owner: user1\n",
        )?;
        assert_eq!(AppConfig::load_from_path(config_file.path())?.shares.len(), 1);
        Ok(())
    }

    #[test]
    fn test_load_from_missing_path_fails() {
        let result = AppConfig::load_from_path("/definitely/not/here/config.yaml");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }
}
