//! Top-level config loading pipeline.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::env::{apply_env_overrides, collect_legacy_env_warnings};
use super::sources::{read_config_text_with_sources, ConfigSource};
use super::{config_root_dir, Config, ConfigDiagnostics, LoadedConfig};

/// Load configuration from disk and environment.
///
/// `path_override` is an explicit config file path (from --config flag).
pub fn load_config(path_override: Option<&Path>) -> Result<Config, ConfigError> {
    Ok(load_config_with_diagnostics(path_override)?.config)
}

/// Load configuration and return compatibility diagnostics.
pub fn load_config_with_diagnostics(
    path_override: Option<&Path>,
) -> Result<LoadedConfig, ConfigError> {
    load_config_from_sources(
        path_override,
        |path| std::fs::read_to_string(path),
        |name| std::env::var(name).ok(),
        config_root_dir,
    )
}

pub(super) fn load_config_from_sources<FRead, FEnv, FRoot>(
    path_override: Option<&Path>,
    read_file: FRead,
    env_lookup: FEnv,
    config_root: FRoot,
) -> Result<LoadedConfig, ConfigError>
where
    FRead: Fn(&Path) -> Result<String, std::io::Error>,
    FEnv: Fn(&str) -> Option<String>,
    FRoot: Fn() -> Option<PathBuf>,
{
    let (config_text, source) =
        read_config_text_with_sources(path_override, &read_file, &config_root)?;
    let mut config: Config = toml::from_str(&config_text)?;
    apply_env_overrides(&mut config, &env_lookup)?;
    validate(&config)?;

    let mut diagnostics = ConfigDiagnostics::default();
    collect_legacy_env_warnings(&mut diagnostics, &env_lookup);
    if let ConfigSource::Explicit(path) | ConfigSource::Global(path) = &source {
        tracing::debug!(path = %path.display(), "loaded config file");
    }

    Ok(LoadedConfig {
        config,
        source,
        diagnostics,
    })
}

/// Reject values that can never work. Empty credentials are not errors here;
/// each operation reports them when it needs them.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.network.timeout_secs == 0 {
        return Err(ConfigError::Invalid(
            "network.timeout_secs must be at least 1".to_string(),
        ));
    }
    if !(0.0..=2.0).contains(&config.primary.temperature)
        || !(0.0..=2.0).contains(&config.secondary.temperature)
    {
        return Err(ConfigError::Invalid(
            "temperature must be between 0.0 and 2.0".to_string(),
        ));
    }
    if config.google.scopes.is_empty() {
        return Err(ConfigError::Invalid(
            "google.scopes must list at least one scope".to_string(),
        ));
    }
    Ok(())
}
