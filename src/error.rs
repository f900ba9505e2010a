//! Unified error types for the session manager and completion gateway.

use crate::auth::AuthError;
use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Errors when loading configuration or when required settings are absent.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    /// Required settings are empty; carries the env var names that would fill them.
    Missing(Vec<String>),
    Invalid(String),
}

impl ConfigError {
    /// Build a `Missing` error from static variable names.
    pub fn missing(vars: &[&str]) -> Self {
        Self::Missing(vars.iter().map(|name| (*name).to_string()).collect())
    }

    /// Names of the missing variables, empty for every other variant.
    pub fn missing_vars(&self) -> &[String] {
        match self {
            Self::Missing(vars) => vars,
            _ => &[],
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Toml(e) => write!(f, "toml: {e}"),
            Self::Missing(vars) => {
                write!(f, "missing required configuration: {}", vars.join(", "))
            }
            Self::Invalid(msg) => write!(f, "invalid config: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        Self::Toml(e)
    }
}

// ---------------------------------------------------------------------------
// ApiError
// ---------------------------------------------------------------------------

/// Errors from a single completion or context API call.
#[derive(Debug)]
pub enum ApiError {
    /// Transport-level failure: connect, timeout, interrupted body.
    Network(reqwest::Error),
    /// Non-2xx status from the provider.
    Status { code: u16, body: String },
    /// 2xx response whose payload could not be used.
    InvalidResponse(String),
    /// Provider settings are incomplete; no request was sent.
    Config(ConfigError),
}

impl ApiError {
    pub fn status(code: u16, body: String) -> Self {
        Self::Status { code, body }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(e) => write!(f, "network error: {e}"),
            Self::Status { code, body } => write!(f, "status {code}: {body}"),
            Self::InvalidResponse(msg) => write!(f, "invalid response: {msg}"),
            Self::Config(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        // Request URLs can carry API keys as query parameters.
        let e = e.without_url();
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Network(e)
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// AiError
// ---------------------------------------------------------------------------

/// Failures surfaced by the completion gateway.
#[derive(Debug)]
pub enum AiError {
    /// Neither provider is configured, so nothing was attempted.
    Config(ConfigError),
    /// Both providers failed. `primary` is the message of the swallowed
    /// primary failure; `secondary` is kept for diagnostics.
    Unavailable { primary: String, secondary: String },
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::Unavailable { primary, .. } => write!(
                f,
                "AI services unavailable. Primary service error: {primary}. Fallback service also failed."
            ),
        }
    }
}

impl std::error::Error for AiError {}

// ---------------------------------------------------------------------------
// Error (top-level)
// ---------------------------------------------------------------------------

/// Coarse classification callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or invalid configuration.
    Config,
    /// Authorization server rejected a request or the session is unusable.
    Auth,
    /// Transport failure before any HTTP status was received.
    Network,
    /// A provider answered with an error status or an unusable body.
    Provider,
    /// Both completion providers failed.
    AiUnavailable,
}

/// Top-level error type for library consumers and the CLI.
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Auth(AuthError),
    Api(ApiError),
    Ai(AiError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::Auth(AuthError::Config(_)) => ErrorKind::Config,
            Self::Auth(AuthError::Network(_)) => ErrorKind::Network,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Api(ApiError::Config(_)) => ErrorKind::Config,
            Self::Api(ApiError::Network(_)) => ErrorKind::Network,
            Self::Api(_) => ErrorKind::Provider,
            Self::Ai(AiError::Config(_)) => ErrorKind::Config,
            Self::Ai(AiError::Unavailable { .. }) => ErrorKind::AiUnavailable,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Auth(e) => write!(f, "auth: {e}"),
            Self::Api(e) => write!(f, "api: {e}"),
            Self::Ai(e) => write!(f, "ai: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<AuthError> for Error {
    fn from(e: AuthError) -> Self {
        Self::Auth(e)
    }
}

impl From<ApiError> for Error {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl From<AiError> for Error {
    fn from(e: AiError) -> Self {
        Self::Ai(e)
    }
}
