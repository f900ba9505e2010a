//! Built-in default values for configuration.

pub const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const DEFAULT_GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:5173";

/// Scopes requested on every authorization redirect.
pub const DEFAULT_GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.send",
    "https://www.googleapis.com/auth/gmail.modify",
    "https://www.googleapis.com/auth/gmail.compose",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
    "https://mail.google.com/",
];

pub const DEFAULT_PRIMARY_MODEL: &str = "alchemyst-ai/alchemyst-c1";
pub const DEFAULT_PRIMARY_COMPLETIONS_PATH: &str = "/v1/proxy/default/chat/completions";
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

pub const DEFAULT_SECONDARY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_SECONDARY_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_TOP_K: u32 = 1;
pub const DEFAULT_TOP_P: f32 = 1.0;

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

