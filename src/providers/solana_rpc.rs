use super::util::{parse_json, with_retry};
use crate::core::cache::Cache;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::user::{ChainClient, TokenBalance, UserNft};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, instrument};

pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct TokenAccountsResult {
    value: Vec<KeyedAccount>,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    account: AccountData,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    data: ParsedData,
}

#[derive(Debug, Deserialize)]
struct ParsedData {
    parsed: ParsedAccount,
}

#[derive(Debug, Deserialize)]
struct ParsedAccount {
    info: TokenAccountInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenAccountInfo {
    mint: String,
    token_amount: TokenAmount,
}

#[derive(Debug, Deserialize)]
struct TokenAmount {
    amount: String,
    decimals: u8,
}

impl TryFrom<TokenAccountInfo> for TokenBalance {
    type Error = ServiceError;

    fn try_from(info: TokenAccountInfo) -> ServiceResult<Self> {
        let amount = info.token_amount.amount.parse::<u64>().map_err(|e| {
            ServiceError::invalid(format!(
                "bad token amount '{}' for mint {}: {e}",
                info.token_amount.amount, info.mint
            ))
        })?;
        Ok(TokenBalance {
            mint: info.mint,
            amount,
            decimals: info.token_amount.decimals,
        })
    }
}

/// Reads token holdings over Solana JSON-RPC.
pub struct SolanaRpcClient {
    url: String,
    client: reqwest::Client,
    cache: Arc<Cache<String, Vec<TokenBalance>>>,
}

impl SolanaRpcClient {
    pub fn new(url: &str, cache: Arc<Cache<String, Vec<TokenBalance>>>) -> ServiceResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent("solmosaic/0.1")
            .build()
            .map_err(ServiceError::network)?;
        Ok(Self {
            url: url.to_string(),
            client,
            cache,
        })
    }

    async fn call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> ServiceResult<T> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        debug!("Calling RPC method {} at {}", method, self.url);

        let response = with_retry(
            || async {
                self.client
                    .post(&self.url)
                    .json(&request)
                    .send()
                    .await?
                    .error_for_status()
            },
            3,
            500,
        )
        .await
        .map_err(|e| ServiceError::network(format!("RPC {method} failed: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::network(format!("Failed to read RPC response: {e}")))?;

        let rpc: RpcResponse<T> = parse_json(&body, "RPC response")?;
        if let Some(err) = rpc.error {
            return Err(ServiceError::network(format!(
                "RPC {method} returned error {}: {}",
                err.code, err.message
            )));
        }
        rpc.result
            .ok_or_else(|| ServiceError::invalid(format!("RPC {method} returned no result")))
    }
}

#[async_trait]
impl ChainClient for SolanaRpcClient {
    #[instrument(skip(self))]
    async fn fetch_token_balances(&self, owner: &str) -> ServiceResult<Vec<TokenBalance>> {
        if let Some(cached) = self.cache.get(&owner.to_string()).await {
            return Ok(cached);
        }

        let result: TokenAccountsResult = self
            .call(
                "getTokenAccountsByOwner",
                json!([owner, {"programId": TOKEN_PROGRAM_ID}, {"encoding": "jsonParsed"}]),
            )
            .await?;

        let balances = result
            .value
            .into_iter()
            .map(|keyed| TokenBalance::try_from(keyed.account.data.parsed.info))
            .collect::<ServiceResult<Vec<_>>>()?;
        debug!("Found {} token accounts for {}", balances.len(), owner);

        self.cache.put(owner.to_string(), balances.clone()).await;
        Ok(balances)
    }

    /// NFTs held by `owner`. Names are not resolved; the mint address stands in.
    async fn fetch_nfts(&self, owner: &str) -> ServiceResult<Vec<UserNft>> {
        let balances = self.fetch_token_balances(owner).await?;
        Ok(balances
            .into_iter()
            .filter(TokenBalance::is_nft)
            .map(|balance| UserNft {
                name: balance.mint.clone(),
                mint: balance.mint,
                image_url: None,
                collection: None,
                rarity: None,
                acquired_at: None,
                acquired_price: None,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OWNER: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    const MOCK_JSON: &str = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "result": {
            "context": {"slot": 254093712},
            "value": [
                {
                    "pubkey": "4Nd1mBQtrMJVYVfKf2PJy9NZUZdTAsp7D4xWLs4gDB4T",
                    "account": {
                        "data": {
                            "parsed": {
                                "info": {
                                    "isNative": false,
                                    "mint": "MoSA1cTokenMint111111111111111111111111111",
                                    "owner": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                                    "state": "initialized",
                                    "tokenAmount": {"amount": "2500000000", "decimals": 9, "uiAmount": 2.5, "uiAmountString": "2.5"}
                                },
                                "type": "account"
                            },
                            "program": "spl-token",
                            "space": 165
                        },
                        "executable": false,
                        "lamports": 2039280,
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                        "rentEpoch": 0
                    }
                },
                {
                    "pubkey": "9RfZwn2Prux6QesG1Noo4HzMEBv3rPndJ2bN2Wwd6a7p",
                    "account": {
                        "data": {
                            "parsed": {
                                "info": {
                                    "mint": "NFT1MintAddress11111111111111111111111111",
                                    "owner": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                                    "tokenAmount": {"amount": "1", "decimals": 0, "uiAmount": 1.0, "uiAmountString": "1"}
                                },
                                "type": "account"
                            },
                            "program": "spl-token",
                            "space": 165
                        },
                        "executable": false,
                        "lamports": 2039280,
                        "owner": "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA",
                        "rentEpoch": 0
                    }
                }
            ]
        }
    }"#;

    async fn create_mock_server(mock_response: &str, expected_calls: u64) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(
                serde_json::json!({"method": "getTokenAccountsByOwner"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .expect(expected_calls)
            .mount(&mock_server)
            .await;
        mock_server
    }

    #[tokio::test]
    async fn test_fetch_token_balances() {
        let mock_server = create_mock_server(MOCK_JSON, 1).await;
        let client = SolanaRpcClient::new(&mock_server.uri(), Arc::new(Cache::new())).unwrap();

        let balances = client.fetch_token_balances(OWNER).await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].amount, 2_500_000_000);
        assert_eq!(balances[0].ui_amount(), 2.5);
        assert!(balances[1].is_nft());
    }

    #[tokio::test]
    async fn test_fetch_nfts_uses_cached_balances() {
        let mock_server = create_mock_server(MOCK_JSON, 1).await;
        let client = SolanaRpcClient::new(&mock_server.uri(), Arc::new(Cache::new())).unwrap();

        client.fetch_token_balances(OWNER).await.unwrap();
        let nfts = client.fetch_nfts(OWNER).await.unwrap();
        assert_eq!(nfts.len(), 1);
        assert_eq!(nfts[0].mint, "NFT1MintAddress11111111111111111111111111");
    }

    #[tokio::test]
    async fn test_rpc_error_is_network_failure() {
        let error_json = r#"{"jsonrpc": "2.0", "id": 1, "error": {"code": -32602, "message": "Invalid param: WrongSize"}}"#;
        let mock_server = create_mock_server(error_json, 1).await;
        let client = SolanaRpcClient::new(&mock_server.uri(), Arc::new(Cache::new())).unwrap();

        let err = client.fetch_token_balances(OWNER).await.unwrap_err();
        assert!(matches!(err, ServiceError::NetworkFailure(ref msg) if msg.contains("-32602")));
    }

    #[tokio::test]
    async fn test_bad_amount_is_invalid_input() {
        let bad = MOCK_JSON.replace("\"2500000000\"", "\"lots\"");
        let mock_server = create_mock_server(&bad, 1).await;
        let client = SolanaRpcClient::new(&mock_server.uri(), Arc::new(Cache::new())).unwrap();

        assert!(matches!(
            client.fetch_token_balances(OWNER).await,
            Err(ServiceError::InvalidInput(_))
        ));
    }
}
