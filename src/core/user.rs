//! User data: wallet session, record types, and the manager that ties the
//! off-chain user API and the chain client together.

use crate::core::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, instrument};

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Checks that `key` looks like a base58 encoded Solana address.
pub fn validate_public_key(key: &str) -> ServiceResult<()> {
    if !(32..=44).contains(&key.len()) {
        return Err(ServiceError::invalid(format!(
            "public key must be 32 to 44 characters, got {}",
            key.len()
        )));
    }
    if let Some(c) = key.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
        return Err(ServiceError::invalid(format!(
            "public key contains non-base58 character '{c}'"
        )));
    }
    Ok(())
}

/// The wallet the current user connected with, if any.
#[derive(Debug, Clone, Default)]
pub struct WalletSession {
    public_key: Option<String>,
}

impl WalletSession {
    pub fn connected(public_key: &str) -> ServiceResult<Self> {
        validate_public_key(public_key)?;
        Ok(Self {
            public_key: Some(public_key.to_string()),
        })
    }

    pub fn disconnected() -> Self {
        Self { public_key: None }
    }

    pub fn is_connected(&self) -> bool {
        self.public_key.is_some()
    }

    pub fn public_key(&self) -> ServiceResult<&str> {
        self.public_key.as_deref().ok_or(ServiceError::NotConnected)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub public_key: String,
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

/// Fields a user may change on their profile. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub twitter: Option<String>,
    pub discord: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none()
            && self.avatar.is_none()
            && self.bio.is_none()
            && self.twitter.is_none()
            && self.discord.is_none()
    }

    fn apply(self, profile: &mut UserProfile) {
        if let Some(v) = self.display_name {
            profile.display_name = Some(v);
        }
        if let Some(v) = self.avatar {
            profile.avatar = Some(v);
        }
        if let Some(v) = self.bio {
            profile.bio = Some(v);
        }
        if let Some(v) = self.twitter {
            profile.twitter = Some(v);
        }
        if let Some(v) = self.discord {
            profile.discord = Some(v);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferDirection {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ActivityKind {
    Vote {
        proposal_id: String,
        vote: String,
        weight: u64,
    },
    Proposal {
        proposal_id: String,
        title: String,
        status: String,
    },
    Investment {
        asset_type: String,
        collection_name: String,
        amount: f64,
    },
    NftCreation {
        mint: String,
        name: String,
    },
    TokenTransaction {
        mint: String,
        amount: f64,
        direction: TransferDirection,
    },
}

impl ActivityKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityKind::Vote { .. } => "Vote",
            ActivityKind::Proposal { .. } => "Proposal",
            ActivityKind::Investment { .. } => "Investment",
            ActivityKind::NftCreation { .. } => "NFT Creation",
            ActivityKind::TokenTransaction { .. } => "Token Transaction",
        }
    }
}

impl Display for ActivityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityKind::Vote {
                proposal_id,
                vote,
                weight,
            } => write!(f, "Voted '{vote}' on {proposal_id} with weight {weight}"),
            ActivityKind::Proposal {
                proposal_id,
                title,
                status,
            } => write!(f, "Proposal {proposal_id} \"{title}\" ({status})"),
            ActivityKind::Investment {
                asset_type,
                collection_name,
                amount,
            } => write!(f, "Invested {amount} in {collection_name} ({asset_type})"),
            ActivityKind::NftCreation { mint, name } => write!(f, "Created {name} ({mint})"),
            ActivityKind::TokenTransaction {
                mint,
                amount,
                direction,
            } => match direction {
                TransferDirection::Incoming => write!(f, "Received {amount} of {mint}"),
                TransferDirection::Outgoing => write!(f, "Sent {amount} of {mint}"),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserActivity {
    pub id: String,
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    Nft,
    Token,
    Pool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentStatus {
    Active,
    Exited,
    Liquidated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserInvestment {
    pub id: String,
    pub user_id: String,
    pub investment_type: InvestmentType,
    pub asset_id: String,
    pub amount: f64,
    pub timestamp: DateTime<Utc>,
    pub status: InvestmentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserNft {
    pub mint: String,
    pub name: String,
    pub image_url: Option<String>,
    pub collection: Option<String>,
    pub rarity: Option<f64>,
    pub acquired_at: Option<DateTime<Utc>>,
    pub acquired_price: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    System,
    Governance,
    Investment,
    Social,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserNotification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    pub action_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserReputationScore {
    pub user_id: String,
    pub overall: u8,
    pub investment: u8,
    pub governance: u8,
    pub community: u8,
    pub last_updated: DateTime<Utc>,
}

impl UserReputationScore {
    pub fn validate(&self) -> ServiceResult<()> {
        for (name, score) in [
            ("overall", self.overall),
            ("investment", self.investment),
            ("governance", self.governance),
            ("community", self.community),
        ] {
            if score > 100 {
                return Err(ServiceError::invalid(format!(
                    "{name} reputation score {score} is above 100"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenBalance {
    pub mint: String,
    pub amount: u64,
    pub decimals: u8,
}

impl TokenBalance {
    pub fn ui_amount(&self) -> f64 {
        self.amount as f64 / 10f64.powi(self.decimals as i32)
    }

    /// Non-fungible holdings are single units of a zero-decimal mint.
    pub fn is_nft(&self) -> bool {
        self.decimals == 0 && self.amount == 1
    }
}

/// Off-chain user records.
#[async_trait]
pub trait UserDataApi: Send + Sync {
    async fn fetch_profile(&self, user_id: &str) -> ServiceResult<UserProfile>;
    async fn save_profile(&self, profile: &UserProfile) -> ServiceResult<()>;
    async fn fetch_activities(&self, user_id: &str, limit: usize)
    -> ServiceResult<Vec<UserActivity>>;
    async fn fetch_investments(&self, user_id: &str) -> ServiceResult<Vec<UserInvestment>>;
    async fn fetch_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> ServiceResult<Vec<UserNotification>>;
    async fn mark_notifications_read(&self, ids: &[String]) -> ServiceResult<()>;
    async fn fetch_reputation(&self, user_id: &str) -> ServiceResult<UserReputationScore>;
}

/// On-chain holdings of an address.
#[async_trait]
pub trait ChainClient: Send + Sync {
    async fn fetch_token_balances(&self, owner: &str) -> ServiceResult<Vec<TokenBalance>>;
    async fn fetch_nfts(&self, owner: &str) -> ServiceResult<Vec<UserNft>>;
}

/// Entry point for everything known about the connected user.
pub struct UserDataManager {
    wallet: WalletSession,
    api: Arc<dyn UserDataApi>,
    chain: Arc<dyn ChainClient>,
}

impl UserDataManager {
    pub fn new(
        wallet: WalletSession,
        api: Arc<dyn UserDataApi>,
        chain: Arc<dyn ChainClient>,
    ) -> Self {
        Self { wallet, api, chain }
    }

    pub fn wallet(&self) -> &WalletSession {
        &self.wallet
    }

    pub fn current_user_id(&self) -> ServiceResult<&str> {
        self.wallet.public_key()
    }

    #[instrument(skip(self))]
    pub async fn user_profile(&self) -> ServiceResult<UserProfile> {
        let user_id = self.current_user_id()?;
        self.api.fetch_profile(user_id).await
    }

    /// Merges `update` into the stored profile and saves it.
    ///
    /// The public key always comes from the session and `last_active` is stamped
    /// with the current time.
    #[instrument(skip(self, update))]
    pub async fn update_user_profile(&self, update: ProfileUpdate) -> ServiceResult<UserProfile> {
        let user_id = self.current_user_id()?;
        let mut profile = self.api.fetch_profile(user_id).await?;
        update.apply(&mut profile);
        profile.public_key = user_id.to_string();
        profile.last_active = Utc::now();

        self.api.save_profile(&profile).await?;
        debug!("Saved profile for {user_id}");
        Ok(profile)
    }

    pub async fn token_balances(&self) -> ServiceResult<Vec<TokenBalance>> {
        let owner = self.current_user_id()?;
        self.chain.fetch_token_balances(owner).await
    }

    pub async fn user_nfts(&self) -> ServiceResult<Vec<UserNft>> {
        let owner = self.current_user_id()?;
        self.chain.fetch_nfts(owner).await
    }

    /// Most recent activities, at most `limit` of them.
    pub async fn user_activities(&self, limit: usize) -> ServiceResult<Vec<UserActivity>> {
        let user_id = self.current_user_id()?;
        let mut activities = self.api.fetch_activities(user_id, limit).await?;
        activities.truncate(limit);
        Ok(activities)
    }

    pub async fn user_investments(&self) -> ServiceResult<Vec<UserInvestment>> {
        let user_id = self.current_user_id()?;
        self.api.fetch_investments(user_id).await
    }

    pub async fn user_notifications(
        &self,
        unread_only: bool,
    ) -> ServiceResult<Vec<UserNotification>> {
        let user_id = self.current_user_id()?;
        let mut notifications = self.api.fetch_notifications(user_id, unread_only).await?;
        if unread_only {
            notifications.retain(|n| !n.is_read);
        }
        Ok(notifications)
    }

    pub async fn mark_notifications_read(&self, ids: &[String]) -> ServiceResult<()> {
        self.current_user_id()?;
        if ids.is_empty() {
            return Err(ServiceError::invalid("no notification ids given"));
        }
        self.api.mark_notifications_read(ids).await
    }

    pub async fn reputation_score(&self) -> ServiceResult<UserReputationScore> {
        let user_id = self.current_user_id()?;
        let score = self.api.fetch_reputation(user_id).await?;
        score.validate()?;
        Ok(score)
    }
}
