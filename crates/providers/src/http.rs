//! Shared HTTP plumbing for provider endpoints.

use std::time::Duration;

use stepwise_core::error::ProviderError;
use tracing::warn;

/// Build a client with the given per-request timeout.
pub(crate) fn client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            warn!(error = %e, "Falling back to default HTTP client");
            reqwest::Client::new()
        })
}

/// Translate a transport failure.
pub(crate) fn transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(err.to_string())
    } else {
        ProviderError::Network(err.to_string())
    }
}

/// Pass a 200 through; turn anything else into a typed error.
///
/// 401 is an authentication failure, 429 is rate limiting, and every
/// other status keeps its code and body.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 200 {
        return Ok(response);
    }

    if status == 401 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key".into(),
        ));
    }

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    let body = response.text().await.unwrap_or_default();
    warn!(status, endpoint, body = %body, "Provider returned error");
    Err(ProviderError::ApiError {
        status_code: status,
        message: body,
    })
}
