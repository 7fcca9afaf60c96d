//! Session validation for the `/v1` routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use stepwise_core::error::Error;
use tracing::warn;

use crate::error::ApiError;

/// Decides whether a request belongs to a valid session.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn validate(&self, headers: &HeaderMap) -> bool;
}

/// Accepts `Authorization: Bearer <token>` for a fixed set of tokens.
/// With no tokens configured every request is accepted.
pub struct StaticSessionValidator {
    tokens: Vec<String>,
}

impl StaticSessionValidator {
    pub fn new(tokens: Vec<String>) -> Self {
        if tokens.is_empty() {
            warn!("No session tokens configured; /v1 routes accept any caller");
        }
        Self { tokens }
    }
}

#[async_trait]
impl SessionValidator for StaticSessionValidator {
    async fn validate(&self, headers: &HeaderMap) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .is_some_and(|token| self.tokens.iter().any(|t| t == token))
    }
}

pub(crate) async fn session_middleware(
    State(sessions): State<Arc<dyn SessionValidator>>,
    req: Request,
    next: Next,
) -> Response {
    if sessions.validate(req.headers()).await {
        return next.run(req).await;
    }
    warn!(path = %req.uri().path(), "Rejected request without a valid session");
    ApiError(Error::Unauthorized).into_response()
}
