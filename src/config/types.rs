//! Configuration data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults::*;
use super::sources::ConfigSource;
use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub google: GoogleConfig,
    pub primary: PrimaryConfig,
    pub secondary: SecondaryConfig,
    pub storage: StorageConfig,
    pub network: NetworkConfig,
}

/// OAuth client registration and authorization-server endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scopes: DEFAULT_GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
            auth_url: DEFAULT_GOOGLE_AUTH_URL.to_string(),
            token_url: DEFAULT_GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: DEFAULT_GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

impl GoogleConfig {
    /// Fails with the env var names of any empty client credential.
    pub fn require_credentials(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.client_id.trim().is_empty() {
            missing.push("ALCHEMAILYST_GOOGLE_CLIENT_ID");
        }
        if self.client_secret.trim().is_empty() {
            missing.push("ALCHEMAILYST_GOOGLE_CLIENT_SECRET");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::missing(&missing))
        }
    }
}

/// Primary chat-completions provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimaryConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub completions_path: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for PrimaryConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: DEFAULT_PRIMARY_MODEL.to_string(),
            completions_path: DEFAULT_PRIMARY_COMPLETIONS_PATH.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl PrimaryConfig {
    /// Fails with the env var names of the empty base URL and/or key.
    pub fn require(&self) -> Result<(), ConfigError> {
        let mut missing = Vec::new();
        if self.base_url.trim().is_empty() {
            missing.push("ALCHEMAILYST_PRIMARY_BASE_URL");
        }
        if self.api_key.trim().is_empty() {
            missing.push("ALCHEMAILYST_PRIMARY_API_KEY");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::missing(&missing))
        }
    }
}

/// Secondary (Gemini-style) provider used only as a fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondaryConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SECONDARY_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_SECONDARY_MODEL.to_string(),
            max_output_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            top_k: DEFAULT_TOP_K,
            top_p: DEFAULT_TOP_P,
        }
    }
}

impl SecondaryConfig {
    pub fn require(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            Err(ConfigError::missing(&["ALCHEMAILYST_SECONDARY_API_KEY"]))
        } else {
            Ok(())
        }
    }
}

/// Where the `google_tokens` slot is persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Token file override. Defaults to `<config root>/alchemailyst/tokens.json`.
    pub token_path: Option<PathBuf>,
    /// Encrypt the slot at rest with a machine-derived key.
    pub encrypt: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            token_path: None,
            encrypt: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Non-fatal config warnings surfaced to users.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDiagnostics {
    /// Legacy compatibility paths currently in use.
    pub deprecations: Vec<String>,
}

/// Configuration payload plus load-time diagnostics.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Which file (if any) the values came from.
    pub source: ConfigSource,
    pub diagnostics: ConfigDiagnostics,
}
