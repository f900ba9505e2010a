//! Public auth model types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Persona attached to every profile; drives the compose prompt's tone.
pub const DEFAULT_PERSONA: &str = "Professional and friendly communication style";

/// Tokens issued by the authorization server, stamped with local timestamps.
///
/// `expires_at` is always `created_at + expires_in * 1000`, all in Unix
/// milliseconds except `expires_in` (seconds).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub scope: String,
    pub expires_in: i64,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenSet {
    pub fn new(access_token: impl Into<String>, expires_in: i64, created_at: i64) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            scope: String::new(),
            expires_in,
            created_at,
            expires_at: expires_at_for(created_at, expires_in),
            id_token: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// True once `now_ms` reaches `expires_at`.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    /// Recompute `expires_at` from the other two timestamps. Applied to
    /// every record read back from storage.
    pub fn normalized(mut self) -> Self {
        self.expires_at = expires_at_for(self.created_at, self.expires_in);
        self
    }
}

pub fn expires_at_for(created_at: i64, expires_in: i64) -> i64 {
    created_at.saturating_add(expires_in.saturating_mul(1000))
}

/// Identity of the signed-in user. Held in memory only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub persona: String,
}

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
    Refreshing,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::Refreshing => "refreshing",
        };
        f.write_str(text)
    }
}

/// Result of handing an authorization code to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Completed(UserProfile),
    /// The code was already redeemed (or is being redeemed); nothing was sent.
    AlreadyHandled,
}
