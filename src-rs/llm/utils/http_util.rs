use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::llm::models::provider_base::{ProviderError, ProviderResult};
use crate::llm::utils::string_util::truncate_utf8_with_ellipsis;

/// Upper bound on how much of an error body is kept as diagnostic text.
const MAX_ERROR_BODY_BYTES: usize = 2048;

pub fn build_client(timeout: Duration) -> ProviderResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::NetworkFailure(format!("failed to build HTTP client: {}", e)))
}

/// Sends the request and returns the raw body of a 2xx response. Transport
/// failures and non-2xx statuses are classified into [`ProviderError`].
pub async fn send_classified(request: RequestBuilder) -> ProviderResult<Vec<u8>> {
    let response = request.send().await.map_err(transport_error)?;
    let status = response.status().as_u16();
    let body = response.bytes().await.map_err(transport_error)?;
    classify_status(status, &body)?;
    Ok(body.to_vec())
}

pub fn classify_status(status: u16, body: &[u8]) -> ProviderResult<()> {
    match status {
        200..=299 => Ok(()),
        429 => Err(ProviderError::RateLimited),
        503 => Err(ProviderError::TransientUnavailable),
        _ => {
            let text = String::from_utf8_lossy(body);
            Err(ProviderError::Api {
                status,
                body: truncate_utf8_with_ellipsis(text.trim(), MAX_ERROR_BODY_BYTES),
            })
        }
    }
}

pub fn parse_json<T: DeserializeOwned>(body: &[u8]) -> ProviderResult<T> {
    serde_json::from_slice(body).map_err(|e| ProviderError::MalformedResponse(e.to_string()))
}

/// Drops the request URL from the message; URLs may carry secrets.
fn transport_error(e: reqwest::Error) -> ProviderError {
    let e = e.without_url();
    if e.is_timeout() {
        ProviderError::NetworkFailure(format!("request timed out: {}", e))
    } else {
        ProviderError::NetworkFailure(e.to_string())
    }
}
