//! Google OAuth2 session management.
//!
//! Authorization-code login, expiry-driven refresh, user-info retrieval and
//! encrypted local persistence of the `google_tokens` slot.

mod browser;
mod callback;
mod clock;
mod crypto;
mod error;
mod google;
mod provider;
mod session;
mod store;
mod types;

pub use browser::open_in_browser;
pub use callback::CallbackParams;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AuthError;
pub use google::GoogleOAuthClient;
pub use provider::OAuthProvider;
pub use session::SessionManager;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore, TOKEN_SLOT};
pub use types::{
    expires_at_for, LoginOutcome, SessionState, TokenSet, UserProfile, DEFAULT_PERSONA,
};
