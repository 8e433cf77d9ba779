use super::util::{parse_json, with_retry};
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::launch::{LaunchApi, LaunchReceipt, LaunchStatus, PumpLaunchParams};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChallengeResponse {
    challenge: String,
}

/// Client for the pump.fun launch API.
pub struct PumpFunClient {
    base_url: String,
    client: reqwest::Client,
}

impl PumpFunClient {
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

    async fn get_text(&self, url: &str) -> ServiceResult<String> {
        let response = with_retry(
            || async { self.client.get(url).send().await?.error_for_status() },
            3,
            500,
        )
        .await
        .map_err(|e| ServiceError::network(format!("GET {url} failed: {e}")))?;
        response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read response from {url}: {e}")))
    }
}

#[async_trait]
impl LaunchApi for PumpFunClient {
    async fn fetch_challenge(&self, wallet: &str) -> ServiceResult<String> {
        let url = format!("{}/auth/challenge?wallet={}", self.base_url, wallet);
        debug!("Fetching launch challenge from {}", url);
        let body = self.get_text(&url).await?;
        let response: ChallengeResponse = parse_json(&body, "challenge response")?;
        if response.challenge.is_empty() {
            return Err(ServiceError::invalid("empty challenge"));
        }
        Ok(response.challenge)
    }

    async fn submit_launch(
        &self,
        wallet: &str,
        signature: &str,
        params: &PumpLaunchParams,
    ) -> ServiceResult<LaunchReceipt> {
        let url = format!("{}/token/launch", self.base_url);
        let authorization = format!("Wallet {wallet}:{signature}");
        debug!("Submitting launch for {} to {}", params.token_mint, url);

        // Not retried: a resubmitted launch could be registered twice.
        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(params)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ServiceError::network(format!("POST {url} failed: {e}")))?;
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read launch response: {e}")))?;
        parse_json(&body, "launch response")
    }

    async fn launch_status(&self, token_mint: &str) -> ServiceResult<LaunchStatus> {
        let url = format!("{}/token/status/{}", self.base_url, token_mint);
        let body = self.get_text(&url).await?;
        parse_json(&body, "launch status response")
    }
}
