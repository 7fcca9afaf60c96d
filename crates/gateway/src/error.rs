//! Mapping planning errors onto HTTP responses.
//!
//! Typed planning outcomes keep their message. Anything else is logged and
//! answered with an opaque `{"error": "Error"}` so internals never leak.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use stepwise_core::error::{Error, ProviderError};
use tracing::error;

#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::InvalidToolName(_) | Error::ToolNotEnabled(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Error::ContextOverflow { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Error::RepeatedAction { .. } => StatusCode::CONFLICT,
            Error::Provider(ProviderError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            Error::Provider(_) => StatusCode::BAD_GATEWAY,
            Error::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Error::Config { .. } | Error::Serialization(_) | Error::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if self.0.is_public() {
            ErrorBody {
                error: self.0.to_string(),
                code: Some(self.0.code()),
            }
        } else {
            error!(error = %self.0, "Request failed");
            ErrorBody {
                error: "Error".into(),
                code: None,
            }
        };
        (status, Json(body)).into_response()
    }
}
