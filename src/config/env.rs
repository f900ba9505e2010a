//! Environment overrides and legacy env-alias handling.
//!
//! Canonical `ALCHEMAILYST_*` variables take precedence. The `VITE_*` names
//! used by the web dashboard are accepted as aliases and reported as
//! deprecated.

use std::path::PathBuf;

use crate::error::ConfigError;

use super::{Config, ConfigDiagnostics};

type Apply = fn(&mut Config, String) -> Result<(), ConfigError>;

/// One overridable setting: canonical name, optional legacy alias, setter.
struct EnvBinding {
    canonical: &'static str,
    legacy: Option<&'static str>,
    apply: Apply,
}

const ENV_BINDINGS: &[EnvBinding] = &[
    EnvBinding {
        canonical: "ALCHEMAILYST_GOOGLE_CLIENT_ID",
        legacy: Some("VITE_GOOGLE_CLIENT_ID"),
        apply: |c, v| {
            c.google.client_id = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_GOOGLE_CLIENT_SECRET",
        legacy: Some("VITE_GOOGLE_CLIENT_SECRET"),
        apply: |c, v| {
            c.google.client_secret = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_GOOGLE_REDIRECT_URI",
        legacy: Some("VITE_GOOGLE_REDIRECT_URI"),
        apply: |c, v| {
            c.google.redirect_uri = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_PRIMARY_BASE_URL",
        legacy: Some("VITE_ALCHEMYST_API_BASE"),
        apply: |c, v| {
            c.primary.base_url = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_PRIMARY_API_KEY",
        legacy: Some("VITE_ALCHEMYST_API_KEY"),
        apply: |c, v| {
            c.primary.api_key = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_PRIMARY_MODEL",
        legacy: None,
        apply: |c, v| {
            c.primary.model = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_SECONDARY_API_KEY",
        legacy: Some("VITE_GEMINI_API_KEY"),
        apply: |c, v| {
            c.secondary.api_key = v;
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_TOKEN_PATH",
        legacy: None,
        apply: |c, v| {
            c.storage.token_path = Some(PathBuf::from(v));
            Ok(())
        },
    },
    EnvBinding {
        canonical: "ALCHEMAILYST_TIMEOUT_SECS",
        legacy: None,
        apply: |c, v| {
            let parsed = v.trim().parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "invalid ALCHEMAILYST_TIMEOUT_SECS value `{v}`: expected positive integer seconds"
                ))
            })?;
            // Zero would mean "no timeout" to reqwest.
            c.network.timeout_secs = parsed.max(1);
            Ok(())
        },
    },
];

/// Apply every env override that is set to a non-empty value.
pub(super) fn apply_env_overrides<FEnv>(
    config: &mut Config,
    env_lookup: &FEnv,
) -> Result<(), ConfigError>
where
    FEnv: Fn(&str) -> Option<String>,
{
    for binding in ENV_BINDINGS {
        let value = match binding.legacy {
            Some(legacy) => env_with_legacy(env_lookup, binding.canonical, legacy),
            None => non_empty(env_lookup(binding.canonical)),
        };
        if let Some(value) = value {
            (binding.apply)(config, value)?;
        }
    }
    Ok(())
}

/// Resolve a value from canonical env var or, if absent, its legacy alias.
pub(super) fn env_with_legacy<FEnv>(
    env_lookup: &FEnv,
    canonical: &str,
    legacy: &str,
) -> Option<String>
where
    FEnv: Fn(&str) -> Option<String>,
{
    non_empty(env_lookup(canonical)).or_else(|| non_empty(env_lookup(legacy)))
}

/// Record diagnostics for legacy env alias usage when canonical vars are absent.
pub(super) fn collect_legacy_env_warnings<FEnv>(
    diagnostics: &mut ConfigDiagnostics,
    env_lookup: &FEnv,
) where
    FEnv: Fn(&str) -> Option<String>,
{
    for binding in ENV_BINDINGS {
        let Some(legacy) = binding.legacy else {
            continue;
        };
        if non_empty(env_lookup(binding.canonical)).is_none()
            && non_empty(env_lookup(legacy)).is_some()
        {
            diagnostics.deprecations.push(format!(
                "Detected deprecated env var `{legacy}`. Use {} instead.",
                binding.canonical
            ));
        }
    }
    diagnostics.deprecations.sort();
    diagnostics.deprecations.dedup();
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
