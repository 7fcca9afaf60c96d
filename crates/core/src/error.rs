//! Error types for the stepwise domain.
//!
//! Uses `thiserror` for ergonomic error definitions. [`Error`] is the
//! planning taxonomy surfaced to callers; [`ProviderError`] is the
//! transport-level failure of an outbound call.

use thiserror::Error;

/// The top-level error type for a planning step.
#[derive(Debug, Error)]
pub enum Error {
    // --- Credential / session ---
    #[error("Unauthorized")]
    Unauthorized,

    // --- Local validation ---
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unknown tool: {0}")]
    InvalidToolName(String),

    #[error("Tool not enabled for this task: {0}")]
    ToolNotEnabled(String),

    #[error("Prompt needs {token_count} tokens but the model accepts {context_length}")]
    ContextOverflow {
        token_count: u32,
        context_length: u32,
    },

    #[error("Model repeated action '{tool}' with arguments it has already observed")]
    RepeatedAction { tool: String },

    // --- Outbound calls ---
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Request cancelled")]
    Cancelled,

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidToolName(_) => "invalid_tool_name",
            Self::ToolNotEnabled(_) => "tool_not_enabled",
            Self::ContextOverflow { .. } => "context_overflow",
            Self::RepeatedAction { .. } => "repeated_action",
            Self::Provider(_) => "provider_error",
            Self::Cancelled => "cancelled",
            Self::Config { .. } | Self::Serialization(_) | Self::Internal(_) => "internal",
        }
    }

    /// Whether the error is one of the typed planning outcomes a caller may
    /// see in full. Anything else stays server-side.
    pub fn is_public(&self) -> bool {
        !matches!(
            self,
            Self::Config { .. } | Self::Serialization(_) | Self::Internal(_)
        )
    }
}

/// Authentication failures on any outbound call collapse into `Unauthorized`;
/// everything else keeps its status and body.
impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthenticationFailed(_) => Error::Unauthorized,
            other => Error::Provider(other),
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Failures an outer retry policy may retry. The engine never retries
    /// on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Network(_) => true,
            Self::ApiError { status_code, .. } => *status_code >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 503,
            message: "upstream unavailable".into(),
        });
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("upstream unavailable"));
    }

    #[test]
    fn authentication_failure_becomes_unauthorized() {
        let err: Error = ProviderError::AuthenticationFailed("bad key".into()).into();
        assert!(matches!(err, Error::Unauthorized));
    }

    #[test]
    fn other_provider_failures_keep_status() {
        let err: Error = ProviderError::ApiError {
            status_code: 400,
            message: "bad body".into(),
        }
        .into();
        match err {
            Error::Provider(ProviderError::ApiError { status_code, .. }) => {
                assert_eq!(status_code, 400)
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn transient_classification() {
        assert!(ProviderError::RateLimited { retry_after_secs: 1 }.is_transient());
        assert!(ProviderError::Network("reset".into()).is_transient());
        assert!(
            ProviderError::ApiError {
                status_code: 502,
                message: String::new()
            }
            .is_transient()
        );
        assert!(
            !ProviderError::ApiError {
                status_code: 422,
                message: String::new()
            }
            .is_transient()
        );
        assert!(!ProviderError::AuthenticationFailed(String::new()).is_transient());
    }

    #[test]
    fn internal_errors_are_not_public() {
        assert!(!Error::Internal("db".into()).is_public());
        assert!(Error::InvalidToolName("x".into()).is_public());
        assert_eq!(
            Error::ContextOverflow {
                token_count: 3000,
                context_length: 2048
            }
            .code(),
            "context_overflow"
        );
    }
}
