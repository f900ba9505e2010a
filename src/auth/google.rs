//! Google OAuth2 authorization-code client.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use crate::api::build_http_client;
use crate::config::GoogleConfig;

use super::error::AuthError;
use super::provider::OAuthProvider;
use super::types::{TokenSet, UserProfile, DEFAULT_PERSONA};

/// Token lifetime assumed when the server omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Token endpoint response. Every field is optional so partial payloads
/// produce a precise error instead of a decode failure.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    #[serde(deserialize_with = "deserialize_i64_option", default)]
    expires_in: Option<i64>,
    token_type: Option<String>,
    scope: Option<String>,
    id_token: Option<String>,
}

/// User-info endpoint response.
#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    id: Option<String>,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

/// Google authorization server client.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleOAuthClient {
    pub fn new(config: GoogleConfig, timeout: Duration) -> Self {
        Self::with_http(build_http_client(timeout), config)
    }

    pub fn with_http(http: reqwest::Client, config: GoogleConfig) -> Self {
        Self { http, config }
    }

    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    async fn post_token_form(
        &self,
        form: &[(&str, &str)],
        now_ms: i64,
        action: &str,
    ) -> Result<TokenSet, AuthError> {
        self.config.require_credentials()?;
        let response = self
            .http
            .post(&self.config.token_url)
            .form(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(status = code, "token {action} rejected");
            return Err(AuthError::Status(code, body));
        }

        let payload: TokenResponse = response.json().await?;
        payload.into_token_set(now_ms, action)
    }
}

impl TokenResponse {
    fn into_token_set(self, now_ms: i64, action: &str) -> Result<TokenSet, AuthError> {
        let access_token = self.access_token.unwrap_or_default().trim().to_string();
        if access_token.is_empty() {
            return Err(AuthError::Invalid(format!(
                "token {action} response did not include access_token"
            )));
        }
        let mut tokens = TokenSet::new(
            access_token,
            self.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS),
            now_ms,
        );
        tokens.refresh_token = self
            .refresh_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        if let Some(token_type) = self.token_type.filter(|t| !t.is_empty()) {
            tokens.token_type = token_type;
        }
        tokens.scope = self.scope.unwrap_or_default();
        tokens.id_token = self.id_token;
        Ok(tokens)
    }
}

#[async_trait]
impl OAuthProvider for GoogleOAuthClient {
    fn authorization_url(&self) -> Result<String, AuthError> {
        self.config.require_credentials()?;
        let mut url = Url::parse(&self.config.auth_url).map_err(|err| {
            AuthError::Invalid(format!(
                "invalid authorization url `{}`: {err}",
                self.config.auth_url
            ))
        })?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("access_type", "offline")
            .append_pair("prompt", "consent")
            .append_pair("include_granted_scopes", "true");
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str, now_ms: i64) -> Result<TokenSet, AuthError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];
        self.post_token_form(&form, now_ms, "exchange").await
    }

    async fn refresh(&self, refresh_token: &str, now_ms: i64) -> Result<TokenSet, AuthError> {
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];
        self.post_token_form(&form, now_ms, "refresh").await
    }

    async fn user_profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let response = self
            .http
            .get(&self.config.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Status(code, body));
        }

        let info: UserInfoResponse = response.json().await?;
        let id = info.id.unwrap_or_default();
        let email = info.email.unwrap_or_default();
        if id.is_empty() || email.is_empty() {
            return Err(AuthError::Invalid(
                "user-info response did not include id and email".to_string(),
            ));
        }
        Ok(UserProfile {
            id,
            email,
            name: info.name.unwrap_or_default(),
            avatar_url: info.picture.filter(|p| !p.is_empty()),
            persona: DEFAULT_PERSONA.to_string(),
        })
    }
}

/// Deserialize optional integer durations encoded as string/number/null.
fn deserialize_i64_option<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(num) => num
            .as_i64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expires_in must be an integer")),
        serde_json::Value::String(text) => text
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|err| serde::de::Error::custom(format!("invalid expires_in: {err}"))),
        _ => Err(serde::de::Error::custom(
            "expires_in must be string, number, or null",
        )),
    }
}
