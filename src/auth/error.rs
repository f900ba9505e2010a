//! Auth subsystem error definitions.

use crate::error::ConfigError;
use std::fmt;

/// Errors surfaced by the session manager and the OAuth client.
#[derive(Debug)]
pub enum AuthError {
    Io(std::io::Error),
    /// Transport failure talking to the authorization server.
    Network(reqwest::Error),
    /// Non-2xx from the token or user-info endpoint.
    Status(u16, String),
    Invalid(String),
    Config(ConfigError),
    /// The authorization server redirected back with `error=<code>`.
    Provider(String),
    /// Callback carried neither a code nor an error.
    MissingCode,
    /// Stored access token expired and there is no refresh token.
    Expired,
}

impl AuthError {
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Network(err) => write!(f, "network error: {err}"),
            Self::Status(code, body) => write!(f, "status {code}: {body}"),
            Self::Invalid(msg) => write!(f, "{msg}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Provider(code) => write!(f, "authorization denied by provider: {code}"),
            Self::MissingCode => write!(f, "no authorization code received"),
            Self::Expired => write!(
                f,
                "saved login has expired and cannot be refreshed; run `alchemailyst login` again"
            ),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<std::io::Error> for AuthError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Invalid(format!("malformed response from authorization server: {value}"))
        } else {
            Self::Network(value)
        }
    }
}

impl From<ConfigError> for AuthError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}
