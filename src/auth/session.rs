//! Authorization-code session manager.
//!
//! Owns the single session for one token store: boot-time restore, login,
//! refresh and logout. State transitions:
//!
//! ```text
//! Unauthenticated -> Authenticating -> Authenticated
//! Authenticated   -> Refreshing     -> Authenticated
//! any failure                       -> Unauthenticated (session cleared)
//! ```

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::Config;
use crate::events::{redact, EventSink, SessionEvent, TracingSink};

use super::clock::{Clock, SystemClock};
use super::error::AuthError;
use super::google::GoogleOAuthClient;
use super::provider::OAuthProvider;
use super::store::{FileTokenStore, MemoryTokenStore, TokenStore};
use super::types::{LoginOutcome, SessionState, TokenSet, UserProfile};

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    tokens: Option<TokenSet>,
    profile: Option<UserProfile>,
}

impl Default for SessionInner {
    fn default() -> Self {
        Self {
            state: SessionState::Unauthenticated,
            tokens: None,
            profile: None,
        }
    }
}

/// One authenticated session per token store.
pub struct SessionManager {
    provider: Arc<dyn OAuthProvider>,
    store: Arc<dyn TokenStore>,
    clock: Arc<dyn Clock>,
    events: Arc<dyn EventSink>,
    inner: Mutex<SessionInner>,
    /// Authorization codes already handed to the token endpoint.
    claimed_codes: Mutex<HashSet<String>>,
}

impl SessionManager {
    pub fn new(provider: Arc<dyn OAuthProvider>, store: Arc<dyn TokenStore>) -> Self {
        Self {
            provider,
            store,
            clock: Arc::new(SystemClock),
            events: Arc::new(TracingSink),
            inner: Mutex::new(SessionInner::default()),
            claimed_codes: Mutex::new(HashSet::new()),
        }
    }

    /// Google client plus the configured token file (in-memory when no
    /// config root can be resolved).
    pub fn from_config(config: &Config) -> Self {
        let provider = GoogleOAuthClient::new(
            config.google.clone(),
            std::time::Duration::from_secs(config.network.timeout_secs),
        );
        let store: Arc<dyn TokenStore> = match config.storage.resolved_token_path() {
            Some(path) => {
                Arc::new(FileTokenStore::new(path).with_encryption(config.storage.encrypt))
            }
            None => {
                tracing::warn!("no config directory found; tokens will not persist");
                Arc::new(MemoryTokenStore::new())
            }
        };
        Self::new(Arc::new(provider), store)
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.lock_inner().state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Current bearer token, if any. Does not check expiry.
    pub fn access_token(&self) -> Option<String> {
        self.lock_inner()
            .tokens
            .as_ref()
            .map(|t| t.access_token.clone())
    }

    pub fn tokens(&self) -> Option<TokenSet> {
        self.lock_inner().tokens.clone()
    }

    pub fn profile(&self) -> Option<UserProfile> {
        self.lock_inner().profile.clone()
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Restore the persisted session.
    ///
    /// Absent or undecodable storage ends unauthenticated with `Ok`. An
    /// expired set is refreshed when possible; without a refresh token it is
    /// discarded and `AuthError::Expired` is returned without any request.
    pub async fn initialize(&self) -> Result<SessionState, AuthError> {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                self.emit(SessionEvent::StoredTokensDiscarded {
                    reason: err.to_string(),
                });
                self.clear_session();
                return Ok(SessionState::Unauthenticated);
            }
        };
        let Some(tokens) = stored else {
            self.emit(SessionEvent::NoStoredTokens);
            return Ok(self.state());
        };

        self.emit(SessionEvent::StoredTokensFound {
            expires_at: tokens.expires_at,
            has_refresh_token: tokens.refresh_token.is_some(),
        });

        if tokens.is_expired_at(self.clock.now_ms()) {
            self.emit(SessionEvent::TokenExpired {
                has_refresh_token: tokens.refresh_token.is_some(),
            });
            return match tokens.refresh_token.as_deref() {
                Some(refresh_token) => {
                    self.lock_inner().tokens = Some(tokens.clone());
                    self.refresh(refresh_token).await?;
                    Ok(self.state())
                }
                None => {
                    self.fail(&AuthError::Expired);
                    Err(AuthError::Expired)
                }
            };
        }

        let profile = match self.provider.user_profile(&tokens.access_token).await {
            Ok(profile) => profile,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };
        self.adopt(tokens, profile);
        Ok(self.state())
    }

    /// Authorization URL to send the user to. No network call.
    pub fn begin_login(&self) -> Result<String, AuthError> {
        let url = self.provider.authorization_url()?;
        self.emit(SessionEvent::LoginUrlBuilt);
        Ok(url)
    }

    /// Redeem an authorization code.
    ///
    /// A code that was already claimed, whether still in flight or finished,
    /// yields [`LoginOutcome::AlreadyHandled`] without contacting the server.
    pub async fn complete_login(&self, code: &str) -> Result<LoginOutcome, AuthError> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AuthError::MissingCode);
        }
        let fresh = self
            .claimed_codes
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(code.to_string());
        if !fresh {
            self.emit(SessionEvent::DuplicateCallbackIgnored {
                code_prefix: redact(code),
            });
            return Ok(LoginOutcome::AlreadyHandled);
        }

        self.transition(SessionState::Authenticating);
        self.emit(SessionEvent::CodeExchangeStarted {
            code_prefix: redact(code),
        });

        let result = async {
            let tokens = self
                .provider
                .exchange_code(code, self.clock.now_ms())
                .await?;
            self.persist(&tokens)?;
            let profile = self.provider.user_profile(&tokens.access_token).await?;
            Ok::<_, AuthError>((tokens, profile))
        }
        .await;

        match result {
            Ok((tokens, profile)) => {
                self.adopt(tokens, profile.clone());
                Ok(LoginOutcome::Completed(profile))
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Exchange `refresh_token` for a new access token, persist it and
    /// reload the profile. Clears the session on any failure.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenSet, AuthError> {
        self.transition(SessionState::Refreshing);
        self.emit(SessionEvent::RefreshStarted);

        let result = async {
            let mut tokens = self
                .provider
                .refresh(refresh_token, self.clock.now_ms())
                .await?;
            match tokens.refresh_token.as_deref() {
                None => tokens.refresh_token = Some(refresh_token.to_string()),
                Some(rotated) if rotated != refresh_token => {
                    self.emit(SessionEvent::RefreshTokenRotated);
                }
                Some(_) => {}
            }
            self.persist(&tokens)?;
            let profile = self.provider.user_profile(&tokens.access_token).await?;
            Ok::<_, AuthError>((tokens, profile))
        }
        .await;

        match result {
            Ok((tokens, profile)) => {
                self.adopt(tokens.clone(), profile);
                Ok(tokens)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    /// Refresh the persisted set exactly once, expired or not.
    pub async fn refresh_stored(&self) -> Result<TokenSet, AuthError> {
        let tokens = self.store.load()?.ok_or_else(|| {
            AuthError::Invalid("not signed in; run `alchemailyst login`".to_string())
        })?;
        let Some(refresh_token) = tokens.refresh_token.clone() else {
            return Err(AuthError::Invalid(
                "no refresh token stored; run `alchemailyst login`".to_string(),
            ));
        };
        self.lock_inner().tokens = Some(tokens);
        self.refresh(&refresh_token).await
    }

    /// Bearer token that is valid right now, refreshing first if needed.
    pub async fn valid_access_token(&self) -> Result<String, AuthError> {
        let Some(tokens) = self.tokens() else {
            return Err(AuthError::Invalid(
                "not signed in; run `alchemailyst login`".to_string(),
            ));
        };
        if !tokens.is_expired_at(self.clock.now_ms()) {
            return Ok(tokens.access_token);
        }
        match tokens.refresh_token.as_deref() {
            Some(refresh_token) => Ok(self.refresh(refresh_token).await?.access_token),
            None => {
                self.fail(&AuthError::Expired);
                Err(AuthError::Expired)
            }
        }
    }

    /// Drop stored tokens and the in-memory profile. No network call.
    pub fn logout(&self) {
        self.clear_session();
    }

    /// Clear the session and return a fresh authorization URL.
    pub fn force_reauth(&self) -> Result<String, AuthError> {
        self.clear_session();
        self.begin_login()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn lock_inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn emit(&self, event: SessionEvent) {
        self.events.emit(event.into());
    }

    fn transition(&self, to: SessionState) {
        let from = {
            let mut inner = self.lock_inner();
            std::mem::replace(&mut inner.state, to)
        };
        if from != to {
            self.emit(SessionEvent::StateChanged { from, to });
        }
    }

    fn persist(&self, tokens: &TokenSet) -> Result<(), AuthError> {
        self.store.save(tokens)?;
        self.emit(SessionEvent::TokensStored {
            expires_at: tokens.expires_at,
        });
        Ok(())
    }

    fn adopt(&self, tokens: TokenSet, profile: UserProfile) {
        let email = profile.email.clone();
        {
            let mut inner = self.lock_inner();
            inner.tokens = Some(tokens);
            inner.profile = Some(profile);
        }
        self.emit(SessionEvent::ProfileLoaded { email });
        self.transition(SessionState::Authenticated);
    }

    fn fail(&self, err: &AuthError) {
        self.emit(SessionEvent::Failed {
            message: err.to_string(),
        });
        self.clear_session();
    }

    fn clear_session(&self) {
        if let Err(err) = self.store.clear() {
            tracing::warn!(error = %err, "failed to clear stored tokens");
        }
        {
            let mut inner = self.lock_inner();
            inner.tokens = None;
            inner.profile = None;
        }
        self.emit(SessionEvent::SessionCleared);
        self.transition(SessionState::Unauthenticated);
    }
}
