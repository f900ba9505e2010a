//! Configuration loading from TOML files and environment variables.
//!
//! Config is loaded in this order of precedence (highest wins):
//! 1. Environment variables (`ALCHEMAILYST_*`, with legacy `VITE_*` aliases)
//! 2. TOML file specified via --config CLI flag
//! 3. ./alchemailyst.toml in the current directory
//! 4. $XDG_CONFIG_HOME/alchemailyst/alchemailyst.toml (or
//!    ~/.config/alchemailyst/alchemailyst.toml)
//! 5. Built-in defaults

use std::path::PathBuf;

mod defaults;
mod env;
mod loader;
mod sources;
mod types;

pub use defaults::DEFAULT_GOOGLE_SCOPES;
pub use loader::{load_config, load_config_with_diagnostics};
pub use sources::ConfigSource;
pub use types::{
    Config, ConfigDiagnostics, GoogleConfig, LoadedConfig, NetworkConfig, PrimaryConfig,
    SecondaryConfig, StorageConfig,
};

/// Root directory for per-user config files.
pub fn config_root_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("XDG_CONFIG_HOME") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".config"))
        .or_else(dirs::config_dir)
}

/// Default token file (`~/.config/alchemailyst/tokens.json`) when resolvable.
pub fn default_token_path() -> Option<PathBuf> {
    config_root_dir().map(|dir| dir.join("alchemailyst").join("tokens.json"))
}

impl StorageConfig {
    /// Configured token path, falling back to [`default_token_path`].
    pub fn resolved_token_path(&self) -> Option<PathBuf> {
        self.token_path.clone().or_else(default_token_path)
    }
}

#[cfg(test)]
mod tests {
    use super::loader::load_config_from_sources;
    use super::*;
    use crate::error::ConfigError;
    use std::collections::HashMap;
    use std::path::Path;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    fn files_from(pairs: &[(&str, &str)]) -> impl Fn(&Path) -> Result<String, std::io::Error> {
        let map: HashMap<PathBuf, String> = pairs
            .iter()
            .map(|(k, v)| (PathBuf::from(k), v.to_string()))
            .collect();
        move |path| {
            map.get(path)
                .cloned()
                .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))
        }
    }

    fn no_root() -> Option<PathBuf> {
        None
    }

    // Verifies empty sources produce built-in defaults.
    #[test]
    fn defaults_when_nothing_configured() {
        let loaded =
            load_config_from_sources(None, files_from(&[]), env_from(&[]), no_root).unwrap();
        let c = loaded.config;
        assert_eq!(loaded.source, ConfigSource::BuiltInDefaults);
        assert_eq!(c.google.auth_url, "https://accounts.google.com/o/oauth2/v2/auth");
        assert_eq!(c.google.token_url, "https://oauth2.googleapis.com/token");
        assert_eq!(c.google.scopes.len(), 7);
        assert!(c.google.scopes.contains(&"https://mail.google.com/".to_string()));
        assert_eq!(c.primary.model, "alchemyst-ai/alchemyst-c1");
        assert_eq!(c.primary.completions_path, "/v1/proxy/default/chat/completions");
        assert_eq!(c.primary.max_tokens, 1000);
        assert_eq!(c.secondary.model, "gemini-2.0-flash");
        assert_eq!(c.network.timeout_secs, 30);
        assert!(c.storage.encrypt);
        assert!(loaded.diagnostics.deprecations.is_empty());
    }

    // Verifies the local file wins over the global one.
    #[test]
    fn local_file_beats_global_file() {
        let read = files_from(&[
            ("alchemailyst.toml", "[primary]\nmodel = \"local\"\n"),
            (
                "/cfg/alchemailyst/alchemailyst.toml",
                "[primary]\nmodel = \"global\"\n",
            ),
        ]);
        let loaded = load_config_from_sources(None, read, env_from(&[]), || {
            Some(PathBuf::from("/cfg"))
        })
        .unwrap();
        assert_eq!(loaded.source, ConfigSource::Local);
        assert_eq!(loaded.config.primary.model, "local");
    }

    // Verifies the global file is used when no local file exists.
    #[test]
    fn global_file_used_as_fallback() {
        let read = files_from(&[(
            "/cfg/alchemailyst/alchemailyst.toml",
            "[network]\ntimeout_secs = 5\n",
        )]);
        let loaded = load_config_from_sources(None, read, env_from(&[]), || {
            Some(PathBuf::from("/cfg"))
        })
        .unwrap();
        assert_eq!(
            loaded.source,
            ConfigSource::Global(PathBuf::from("/cfg/alchemailyst/alchemailyst.toml"))
        );
        assert_eq!(loaded.config.network.timeout_secs, 5);
    }

    // Verifies a missing explicit --config path is an error rather than a silent fallback.
    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from_sources(
            Some(Path::new("/nope.toml")),
            files_from(&[("alchemailyst.toml", "")]),
            env_from(&[]),
            no_root,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)), "got: {err}");
    }

    // Verifies env vars override file values and canonical names beat legacy ones.
    #[test]
    fn env_overrides_file_and_canonical_beats_legacy() {
        let read = files_from(&[(
            "/etc/a.toml",
            "[primary]\nbase_url = \"https://file\"\napi_key = \"file-key\"\n",
        )]);
        let env = env_from(&[
            ("ALCHEMAILYST_PRIMARY_BASE_URL", "https://env"),
            ("VITE_ALCHEMYST_API_BASE", "https://legacy"),
            ("VITE_GEMINI_API_KEY", "gem"),
        ]);
        let loaded =
            load_config_from_sources(Some(Path::new("/etc/a.toml")), read, env, no_root).unwrap();
        assert_eq!(loaded.config.primary.base_url, "https://env");
        assert_eq!(loaded.config.primary.api_key, "file-key");
        assert_eq!(loaded.config.secondary.api_key, "gem");
        assert_eq!(
            loaded.diagnostics.deprecations,
            vec![
                "Detected deprecated env var `VITE_GEMINI_API_KEY`. Use ALCHEMAILYST_SECONDARY_API_KEY instead."
                    .to_string()
            ]
        );
    }

    // Verifies empty env values do not clobber file values.
    #[test]
    fn empty_env_value_is_ignored() {
        let read = files_from(&[("alchemailyst.toml", "[google]\nclient_id = \"from-file\"\n")]);
        let env = env_from(&[("ALCHEMAILYST_GOOGLE_CLIENT_ID", "  ")]);
        let loaded = load_config_from_sources(None, read, env, no_root).unwrap();
        assert_eq!(loaded.config.google.client_id, "from-file");
    }

    #[test]
    fn invalid_timeout_env_is_rejected() {
        let env = env_from(&[("ALCHEMAILYST_TIMEOUT_SECS", "soon")]);
        let err = load_config_from_sources(None, files_from(&[]), env, no_root).unwrap_err();
        assert!(err.to_string().contains("ALCHEMAILYST_TIMEOUT_SECS"), "got: {err}");
    }

    #[test]
    fn zero_timeout_in_file_is_rejected() {
        let read = files_from(&[("alchemailyst.toml", "[network]\ntimeout_secs = 0\n")]);
        let err = load_config_from_sources(None, read, env_from(&[]), no_root).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_reported() {
        let read = files_from(&[("alchemailyst.toml", "[google\n")]);
        let err = load_config_from_sources(None, read, env_from(&[]), no_root).unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    // Verifies credential checks name the env vars a user should set.
    #[test]
    fn credential_checks_list_missing_vars() {
        let mut google = GoogleConfig::default();
        google.client_id = "id".into();
        let err = google.require_credentials().unwrap_err();
        assert_eq!(err.missing_vars(), ["ALCHEMAILYST_GOOGLE_CLIENT_SECRET".to_string()]);

        let err = PrimaryConfig::default().require().unwrap_err();
        assert_eq!(
            err.missing_vars(),
            [
                "ALCHEMAILYST_PRIMARY_BASE_URL".to_string(),
                "ALCHEMAILYST_PRIMARY_API_KEY".to_string()
            ]
        );
        assert!(SecondaryConfig::default().require().is_err());
    }

    #[test]
    fn storage_path_override_wins() {
        let storage = StorageConfig {
            token_path: Some(PathBuf::from("/tmp/t.json")),
            encrypt: false,
        };
        assert_eq!(storage.resolved_token_path(), Some(PathBuf::from("/tmp/t.json")));
    }
}
