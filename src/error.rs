//! Unified error types for the arbitrage scanner.

use thiserror::Error;

/// Errors raised while setting up the odds client.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loaded but failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed provider base URL.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Errors returned by the odds provider, classified by kind.
///
/// Messages held here may come from the provider's own error body. They are
/// safe to log; use [`ProviderError::public_message`] for anything shown to
/// API callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// HTTP 401: the API key was rejected.
    #[error("provider rejected credentials: {message}")]
    Auth {
        /// Provider message (never surfaced to callers).
        message: String,
    },

    /// HTTP 429: usage quota or request rate exceeded.
    #[error("provider rate limit exceeded: {}", .message.as_deref().unwrap_or("no detail"))]
    RateLimited {
        /// Provider message, when the body could be parsed.
        message: Option<String>,
    },

    /// Any other 4xx response.
    #[error("provider rejected request (HTTP {status}): {}", .message.as_deref().unwrap_or("no detail"))]
    Request {
        /// HTTP status code.
        status: u16,
        /// Provider message, when the body could be parsed.
        message: Option<String>,
    },

    /// 5xx or otherwise unclassified response.
    #[error("provider failure (HTTP {status}): {}", .message.as_deref().unwrap_or("no detail"))]
    Server {
        /// HTTP status code.
        status: u16,
        /// Provider message, when the body could be parsed.
        message: Option<String>,
    },

    /// Transport failure before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// Successful response whose body could not be decoded.
    #[error("failed to decode provider response: {0}")]
    Decode(String),

    /// The request did not settle within the per-fetch timeout.
    #[error("provider request timed out after {after_ms}ms")]
    Timeout {
        /// Timeout that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// Provider URL could not be assembled from the configured base.
    #[error("invalid provider url: {0}")]
    InvalidUrl(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status and optional provider message.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => ProviderError::Auth {
                message: message.unwrap_or_else(|| "unauthorized".to_string()),
            },
            429 => ProviderError::RateLimited { message },
            400..=499 => ProviderError::Request { status, message },
            _ => ProviderError::Server { status, message },
        }
    }

    /// Whether this failure is attributable to the caller's request
    /// (credentials, quota, parameters) rather than the provider or network.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ProviderError::Auth { .. }
                | ProviderError::RateLimited { .. }
                | ProviderError::Request { .. }
        )
    }

    /// Message safe to return to API callers.
    pub fn public_message(&self) -> String {
        match self {
            ProviderError::Auth { .. } => "Invalid or unauthorized API key".to_string(),
            ProviderError::RateLimited { message } => message
                .clone()
                .unwrap_or_else(|| "Odds provider rate limit exceeded".to_string()),
            ProviderError::Request { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Odds provider rejected the request (HTTP {})", status)),
            ProviderError::Server { status, message } => message
                .clone()
                .unwrap_or_else(|| format!("Odds provider error (HTTP {})", status)),
            ProviderError::Network(_) => "Failed to reach the odds provider".to_string(),
            ProviderError::Decode(_) => "Unexpected response from the odds provider".to_string(),
            ProviderError::Timeout { .. } => "Odds provider request timed out".to_string(),
            ProviderError::InvalidUrl(_) => "Odds provider is misconfigured".to_string(),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs carry the API key as a query parameter.
        let err = err.without_url();
        if err.is_decode() {
            ProviderError::Decode(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

/// Errors for a single arbitrage scan request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    /// No API key in the request and none configured.
    #[error("API key is required")]
    MissingApiKey,

    /// A request parameter failed validation.
    #[error("{0}")]
    InvalidParameter(String),

    /// Listing active sports failed, which aborts the scan.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl ScanError {
    /// Whether the failure should be reported as a client error (HTTP 400).
    pub fn is_client_error(&self) -> bool {
        match self {
            ScanError::MissingApiKey | ScanError::InvalidParameter(_) => true,
            ScanError::Provider(err) => err.is_client_error(),
        }
    }

    /// Message safe to return to API callers.
    pub fn public_message(&self) -> String {
        match self {
            ScanError::Provider(err) => err.public_message(),
            other => other.to_string(),
        }
    }
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
