use crate::core::error::{ServiceError, ServiceResult};
use anyhow::Error;
use chrono::{DateTime, TimeZone, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Retries an async operation with configurable attempts and delays
///
/// # Parameters
/// - `operation`: Closure returning a future
/// - `retries`: Number of retry attempts (total runs = 1 initial + retries)
/// - `delay_ms`: Milliseconds between retry attempts
///
/// # Returns
/// Either the successful result or the error after all attempts
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    retries: usize,
    delay_ms: u64,
) -> Result<T, Error>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, reqwest::Error>>,
{
    let mut attempt = 1;
    loop {
        match operation().await.map_err(anyhow::Error::from) {
            Ok(val) => return Ok(val),
            Err(err) => {
                if attempt > retries {
                    return Err(err);
                }
                debug!(
                    "Attempt {}/{} failed: {}. Retrying...",
                    attempt, retries, err
                );
                attempt += 1;
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

/// Converts a Unix timestamp in milliseconds, rejecting values out of range.
pub fn millis_to_datetime(millis: i64) -> ServiceResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| ServiceError::invalid(format!("timestamp {millis} is out of range")))
}

/// Parses a JSON body, logging the raw text when it does not match `T`.
pub fn parse_json<T: serde::de::DeserializeOwned>(body: &str, what: &str) -> ServiceResult<T> {
    serde_json::from_str(body).map_err(|e| {
        debug!(error = ?e, response = %body, "Failed to parse {what}");
        ServiceError::invalid(format!("malformed {what}: {e}"))
    })
}
