//! Authorization-server seam used by the session manager.

use async_trait::async_trait;

use super::error::AuthError;
use super::types::{TokenSet, UserProfile};

/// Operations the session manager needs from an OAuth2 authorization server.
///
/// `now_ms` is passed in so issued sets are stamped by the session's clock.
#[async_trait]
pub trait OAuthProvider: Send + Sync {
    /// Build the consent-screen URL. Fails without I/O when credentials are missing.
    fn authorization_url(&self) -> Result<String, AuthError>;

    async fn exchange_code(&self, code: &str, now_ms: i64) -> Result<TokenSet, AuthError>;

    /// Mint a new access token. The returned set's `refresh_token` is `None`
    /// when the server did not rotate it.
    async fn refresh(&self, refresh_token: &str, now_ms: i64) -> Result<TokenSet, AuthError>;

    async fn user_profile(&self, access_token: &str) -> Result<UserProfile, AuthError>;
}
