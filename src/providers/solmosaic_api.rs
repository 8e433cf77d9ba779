//! HTTP client for the off-chain SolMosaic user API.
//!
//! Responses are decoded into wire structs first and then converted into the
//! typed records of [`crate::core::user`], so a payload with an unknown tag or
//! a malformed field is rejected here instead of leaking into callers.

use super::util::{millis_to_datetime, parse_json, with_retry};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::user::{
    ActivityKind, InvestmentStatus, InvestmentType, NotificationKind, TransferDirection,
    UserActivity, UserDataApi, UserInvestment, UserNotification, UserProfile, UserReputationScore,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileWire {
    public_key: String,
    display_name: Option<String>,
    avatar: Option<String>,
    bio: Option<String>,
    twitter: Option<String>,
    discord: Option<String>,
    joined_date: i64,
    last_active: i64,
}

impl TryFrom<ProfileWire> for UserProfile {
    type Error = ServiceError;

    fn try_from(wire: ProfileWire) -> ServiceResult<Self> {
        Ok(UserProfile {
            public_key: wire.public_key,
            display_name: wire.display_name,
            avatar: wire.avatar,
            bio: wire.bio,
            twitter: wire.twitter,
            discord: wire.discord,
            joined_at: millis_to_datetime(wire.joined_date)?,
            last_active: millis_to_datetime(wire.last_active)?,
        })
    }
}

impl From<&UserProfile> for ProfileWire {
    fn from(profile: &UserProfile) -> Self {
        ProfileWire {
            public_key: profile.public_key.clone(),
            display_name: profile.display_name.clone(),
            avatar: profile.avatar.clone(),
            bio: profile.bio.clone(),
            twitter: profile.twitter.clone(),
            discord: profile.discord.clone(),
            joined_date: profile.joined_at.timestamp_millis(),
            last_active: profile.last_active.timestamp_millis(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActivityWire {
    id: String,
    user_id: String,
    timestamp: i64,
    #[serde(flatten)]
    details: ActivityDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum DirectionWire {
    In,
    Out,
}

/// `activityType` selects the shape of `details`.
#[derive(Debug, Deserialize)]
#[serde(
    tag = "activityType",
    content = "details",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
enum ActivityDetails {
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
        #[serde(rename = "type")]
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
        direction: DirectionWire,
    },
}

impl From<ActivityDetails> for ActivityKind {
    fn from(details: ActivityDetails) -> Self {
        match details {
            ActivityDetails::Vote {
                proposal_id,
                vote,
                weight,
            } => ActivityKind::Vote {
                proposal_id,
                vote,
                weight,
            },
            ActivityDetails::Proposal {
                proposal_id,
                title,
                status,
            } => ActivityKind::Proposal {
                proposal_id,
                title,
                status,
            },
            ActivityDetails::Investment {
                asset_type,
                collection_name,
                amount,
            } => ActivityKind::Investment {
                asset_type,
                collection_name,
                amount,
            },
            ActivityDetails::NftCreation { mint, name } => ActivityKind::NftCreation { mint, name },
            ActivityDetails::TokenTransaction {
                mint,
                amount,
                direction,
            } => ActivityKind::TokenTransaction {
                mint,
                amount,
                direction: match direction {
                    DirectionWire::In => TransferDirection::Incoming,
                    DirectionWire::Out => TransferDirection::Outgoing,
                },
            },
        }
    }
}

impl TryFrom<ActivityWire> for UserActivity {
    type Error = ServiceError;

    fn try_from(wire: ActivityWire) -> ServiceResult<Self> {
        Ok(UserActivity {
            id: wire.id,
            user_id: wire.user_id,
            timestamp: millis_to_datetime(wire.timestamp)?,
            kind: wire.details.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvestmentWire {
    id: String,
    user_id: String,
    investment_type: InvestmentType,
    asset_id: String,
    amount: f64,
    timestamp: i64,
    status: InvestmentStatus,
}

impl TryFrom<InvestmentWire> for UserInvestment {
    type Error = ServiceError;

    fn try_from(wire: InvestmentWire) -> ServiceResult<Self> {
        Ok(UserInvestment {
            id: wire.id,
            user_id: wire.user_id,
            investment_type: wire.investment_type,
            asset_id: wire.asset_id,
            amount: wire.amount,
            timestamp: millis_to_datetime(wire.timestamp)?,
            status: wire.status,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NotificationWire {
    id: String,
    user_id: String,
    #[serde(rename = "type")]
    kind: NotificationKind,
    title: String,
    message: String,
    timestamp: i64,
    is_read: bool,
    action_url: Option<String>,
}

impl TryFrom<NotificationWire> for UserNotification {
    type Error = ServiceError;

    fn try_from(wire: NotificationWire) -> ServiceResult<Self> {
        Ok(UserNotification {
            id: wire.id,
            user_id: wire.user_id,
            kind: wire.kind,
            title: wire.title,
            message: wire.message,
            timestamp: millis_to_datetime(wire.timestamp)?,
            is_read: wire.is_read,
            action_url: wire.action_url,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReputationWire {
    user_id: String,
    overall: u8,
    investment: u8,
    governance: u8,
    community: u8,
    last_updated: i64,
}

impl TryFrom<ReputationWire> for UserReputationScore {
    type Error = ServiceError;

    fn try_from(wire: ReputationWire) -> ServiceResult<Self> {
        let score = UserReputationScore {
            user_id: wire.user_id,
            overall: wire.overall,
            investment: wire.investment,
            governance: wire.governance,
            community: wire.community,
            last_updated: millis_to_datetime(wire.last_updated)?,
        };
        score.validate()?;
        Ok(score)
    }
}

fn convert_all<W, T>(items: Vec<W>) -> ServiceResult<Vec<T>>
where
    T: TryFrom<W, Error = ServiceError>,
{
    items.into_iter().map(T::try_from).collect()
}

pub struct SolmosaicApi {
    base_url: String,
    client: reqwest::Client,
}

impl SolmosaicApi {
    pub fn new(base_url: &str) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("solmosaic/0.1")
            .build()
            .map_err(ServiceError::network)?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn get_text(&self, path: &str) -> ServiceResult<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Requesting {}", url);
        let response = with_retry(
            || async {
                self.client
                    .get(&url)
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| ServiceError::network(format!("GET {url} failed: {e}")))?;

        response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response from {url}: {e}")))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> ServiceResult<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending {} {}", method, url);
        with_retry(
            || async {
                self.client
                    .request(method.clone(), &url)
                    .json(body)
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| ServiceError::network(format!("{method} {url} failed: {e}")))?;
        Ok(())
    }
}

#[derive(Serialize)]
struct MarkReadRequest<'a> {
    ids: &'a [String],
}

#[async_trait]
impl UserDataApi for SolmosaicApi {
    async fn fetch_profile(&self, user_id: &str) -> ServiceResult<UserProfile> {
        let body = self
            .get_text(&format!("/users/{user_id}/profile"))
            .await?;
        let wire: ProfileWire = parse_json(&body, "profile response")?;
        wire.try_into()
    }

    async fn save_profile(&self, profile: &UserProfile) -> ServiceResult<()> {
        let wire = ProfileWire::from(profile);
        self.send_json(
            reqwest::Method::PUT,
            &format!("/users/{}/profile", profile.public_key),
            &wire,
        )
        .await
    }

    async fn fetch_activities(
        &self,
        user_id: &str,
        limit: usize,
    ) -> ServiceResult<Vec<UserActivity>> {
        let body = self
            .get_text(&format!("/users/{user_id}/activities?limit={limit}"))
            .await?;
        let wire: Vec<ActivityWire> = parse_json(&body, "activities response")?;
        convert_all(wire)
    }

    async fn fetch_investments(&self, user_id: &str) -> ServiceResult<Vec<UserInvestment>> {
        let body = self
            .get_text(&format!("/users/{user_id}/investments"))
            .await?;
        let wire: Vec<InvestmentWire> = parse_json(&body, "investments response")?;
        convert_all(wire)
    }

    async fn fetch_notifications(
        &self,
        user_id: &str,
        unread_only: bool,
    ) -> ServiceResult<Vec<UserNotification>> {
        let body = self
            .get_text(&format!(
                "/users/{user_id}/notifications?unread_only={unread_only}"
            ))
            .await?;
        let wire: Vec<NotificationWire> = parse_json(&body, "notifications response")?;
        convert_all(wire)
    }

    async fn mark_notifications_read(&self, ids: &[String]) -> ServiceResult<()> {
        self.send_json(
            reqwest::Method::POST,
            "/notifications/read",
            &MarkReadRequest { ids },
        )
        .await
    }

    async fn fetch_reputation(&self, user_id: &str) -> ServiceResult<UserReputationScore> {
        let body = self
            .get_text(&format!("/users/{user_id}/reputation"))
            .await?;
        let wire: ReputationWire = parse_json(&body, "reputation response")?;
        wire.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    async fn create_mock_server(request_path: &str, mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(request_path))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;
        mock_server
    }

    const ACTIVITIES_JSON: &str = r#"[
        {
            "id": "act1",
            "userId": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "activityType": "proposal",
            "timestamp": 1700000000000,
            "details": {"proposalId": "prop1", "title": "Community Treasury Allocation", "status": "passed"}
        },
        {
            "id": "act2",
            "userId": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "activityType": "vote",
            "timestamp": 1699800000000,
            "details": {"proposalId": "prop2", "vote": "for", "weight": 100}
        },
        {
            "id": "act3",
            "userId": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
            "activityType": "investment",
            "timestamp": 1699500000000,
            "details": {"type": "nft", "collectionName": "SolMosaic", "amount": 2.5}
        }
    ]"#;

    #[tokio::test]
    async fn test_fetch_profile() {
        let json = format!(
            r#"{{
                "publicKey": "{USER}",
                "displayName": "SolMosaic User",
                "bio": "NFT enthusiast and collector",
                "twitter": "@solmosaic_user",
                "joinedDate": 1694800000000,
                "lastActive": 1699990000000
            }}"#
        );
        let mock_server = create_mock_server(&format!("/users/{USER}/profile"), &json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let profile = api.fetch_profile(USER).await.unwrap();
        assert_eq!(profile.public_key, USER);
        assert_eq!(profile.display_name.as_deref(), Some("SolMosaic User"));
        assert!(profile.avatar.is_none());
        assert_eq!(profile.joined_at.timestamp_millis(), 1694800000000);
    }

    #[tokio::test]
    async fn test_fetch_activities_decodes_tagged_records() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{USER}/activities")))
            .and(query_param("limit", "10"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ACTIVITIES_JSON))
            .mount(&mock_server)
            .await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let activities = api.fetch_activities(USER, 10).await.unwrap();
        assert_eq!(activities.len(), 3);
        assert_eq!(
            activities[0].kind,
            ActivityKind::Proposal {
                proposal_id: "prop1".to_string(),
                title: "Community Treasury Allocation".to_string(),
                status: "passed".to_string(),
            }
        );
        assert_eq!(
            activities[1].kind,
            ActivityKind::Vote {
                proposal_id: "prop2".to_string(),
                vote: "for".to_string(),
                weight: 100,
            }
        );
        match &activities[2].kind {
            ActivityKind::Investment {
                asset_type, amount, ..
            } => {
                assert_eq!(asset_type, "nft");
                assert_eq!(*amount, 2.5);
            }
            other => panic!("Expected an investment activity, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_activity_type_is_rejected() {
        let json = r#"[{"id": "a", "userId": "u", "activityType": "airdrop", "timestamp": 1, "details": {}}]"#;
        let mock_server = create_mock_server(&format!("/users/{USER}/activities"), json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let err = api.fetch_activities(USER, 5).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(ref msg) if msg.contains("airdrop")));
    }

    #[tokio::test]
    async fn test_activity_with_missing_details_is_rejected() {
        let json = r#"[{"id": "a", "userId": "u", "activityType": "vote", "timestamp": 1, "details": {"vote": "for"}}]"#;
        let mock_server = create_mock_server(&format!("/users/{USER}/activities"), json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        assert!(matches!(
            api.fetch_activities(USER, 5).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_token_transaction_direction() {
        let json = r#"[{"id": "a", "userId": "u", "activityType": "token_transaction", "timestamp": 1,
                        "details": {"mint": "MOSAIC", "amount": 250.0, "direction": "out"}},
                       {"id": "b", "userId": "u", "activityType": "nft_creation", "timestamp": 2,
                        "details": {"mint": "NftMint", "name": "Mosaic #1"}}]"#;
        let mock_server = create_mock_server(&format!("/users/{USER}/activities"), json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let activities = api.fetch_activities(USER, 5).await.unwrap();
        assert_eq!(
            activities[0].kind,
            ActivityKind::TokenTransaction {
                mint: "MOSAIC".to_string(),
                amount: 250.0,
                direction: TransferDirection::Outgoing,
            }
        );
        assert_eq!(activities[1].kind.label(), "NFT Creation");
    }

    #[tokio::test]
    async fn test_unknown_investment_status_is_rejected() {
        let json = r#"[{"id": "inv1", "userId": "u", "investmentType": "nft", "assetId": "8",
                        "amount": 1.0, "timestamp": 1, "status": "frozen"}]"#;
        let mock_server = create_mock_server(&format!("/users/{USER}/investments"), json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let err = api.fetch_investments(USER).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(ref msg) if msg.contains("frozen")));
    }

    #[tokio::test]
    async fn test_fetch_investments_and_notifications() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{USER}/investments")))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": "inv1", "userId": "u", "investmentType": "token", "assetId": "SolMosaic",
                     "amount": 1000, "timestamp": 1698000000000, "status": "active"}]"#,
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{USER}/notifications")))
            .and(query_param("unread_only", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"id": "notif1", "userId": "u", "type": "governance", "title": "Proposal Passed",
                     "message": "Your proposal has passed!", "timestamp": 1699900000000,
                     "isRead": false, "actionUrl": "/governance/proposals/prop1"}]"#,
            ))
            .mount(&mock_server)
            .await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        let investments = api.fetch_investments(USER).await.unwrap();
        assert_eq!(investments[0].investment_type, InvestmentType::Token);
        assert_eq!(investments[0].status, InvestmentStatus::Active);

        let notifications = api.fetch_notifications(USER, true).await.unwrap();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::Governance);
        assert_eq!(
            notifications[0].action_url.as_deref(),
            Some("/governance/proposals/prop1")
        );
    }

    #[tokio::test]
    async fn test_mark_read_posts_ids() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notifications/read"))
            .and(body_json(serde_json::json!({"ids": ["notif1", "notif2"]})))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        api.mark_notifications_read(&["notif1".to_string(), "notif2".to_string()])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reputation_out_of_range_is_rejected() {
        let json = r#"{"userId": "u", "overall": 101, "investment": 82, "governance": 75,
                       "community": 76, "lastUpdated": 1699700000000}"#;
        let mock_server = create_mock_server(&format!("/users/{USER}/reputation"), json).await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        assert!(matches!(
            api.fetch_reputation(USER).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_network_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/users/{USER}/reputation")))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        let api = SolmosaicApi::new(&mock_server.uri()).unwrap();

        assert!(matches!(
            api.fetch_reputation(USER).await,
            Err(ServiceError::NetworkFailure(_))
        ));
    }
}
