//! Persistent token storage.
//!
//! Tokens live in a single named slot (`google_tokens`) holding the
//! serialized [`TokenSet`] as a JSON string. Other slots in the same file are
//! preserved untouched.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::crypto::{looks_sealed, open_slots, seal_slots, SealedFile};
use super::error::AuthError;
use super::types::TokenSet;

/// Storage key for the Google token set.
pub const TOKEN_SLOT: &str = "google_tokens";

/// Persistence seam for the session's token set.
pub trait TokenStore: Send + Sync {
    /// Read the stored set. `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<TokenSet>, AuthError>;
    fn save(&self, tokens: &TokenSet) -> Result<(), AuthError>;
    /// Remove the stored set. Succeeds when nothing was stored.
    fn clear(&self) -> Result<(), AuthError>;
}

fn encode_slot(tokens: &TokenSet) -> Result<String, AuthError> {
    serde_json::to_string(tokens)
        .map_err(|err| AuthError::Invalid(format!("failed to serialize tokens: {err}")))
}

fn decode_slot(text: &str) -> Result<TokenSet, AuthError> {
    serde_json::from_str::<TokenSet>(text)
        .map(TokenSet::normalized)
        .map_err(|err| AuthError::Invalid(format!("stored `{TOKEN_SLOT}` is unreadable: {err}")))
}

// ---------------------------------------------------------------------------
// In-memory store
// ---------------------------------------------------------------------------

/// Process-local store. Holds the slot as serialized JSON so decoding
/// behaves the same as the file store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: &TokenSet) -> Result<Self, AuthError> {
        Ok(Self {
            slot: Mutex::new(Some(encode_slot(tokens)?)),
        })
    }

    /// Seed the slot with raw text, including text that will not decode.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<TokenSet>, AuthError> {
        match self.raw() {
            Some(text) => decode_slot(&text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, tokens: &TokenSet) -> Result<(), AuthError> {
        let text = encode_slot(tokens)?;
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = Some(text);
        Ok(())
    }

    fn clear(&self) -> Result<(), AuthError> {
        *self.slot.lock().unwrap_or_else(|p| p.into_inner()) = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// File store
// ---------------------------------------------------------------------------

/// Plaintext file layout, also the pre-encryption format that gets migrated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlainFile {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    slots: BTreeMap<String, String>,
}

/// JSON file store, encrypted at rest unless disabled.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
    encrypt: bool,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            encrypt: true,
        }
    }

    pub fn with_encryption(mut self, encrypt: bool) -> Self {
        self.encrypt = encrypt;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read all slots, migrating a plaintext file to the sealed format.
    fn read_slots(&self) -> Result<BTreeMap<String, String>, AuthError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new())
            }
            Err(err) => return Err(AuthError::Io(err)),
        };
        let value: serde_json::Value = serde_json::from_str(&text).map_err(|err| {
            AuthError::Invalid(format!(
                "failed to parse token file `{}`: {err}",
                self.path.display()
            ))
        })?;

        if looks_sealed(&value) {
            let sealed: SealedFile = serde_json::from_value(value).map_err(|err| {
                AuthError::Invalid(format!(
                    "failed to parse encrypted token file `{}`: {err}",
                    self.path.display()
                ))
            })?;
            return open_slots(&sealed);
        }

        let plain: PlainFile = serde_json::from_value(value).map_err(|err| {
            AuthError::Invalid(format!(
                "failed to parse token file `{}`: {err}",
                self.path.display()
            ))
        })?;
        if self.encrypt && !plain.slots.is_empty() {
            // Best effort: a failed rewrite still leaves a readable file.
            if let Err(err) = self.write_slots(&plain.slots) {
                tracing::warn!(error = %err, "failed to migrate plaintext token file");
            }
        }
        Ok(plain.slots)
    }

    /// Write all slots with owner-only permissions.
    fn write_slots(&self, slots: &BTreeMap<String, String>) -> Result<(), AuthError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ = std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700));
            }
        }

        let text = if self.encrypt {
            serde_json::to_string_pretty(&seal_slots(slots)?)
        } else {
            serde_json::to_string_pretty(&PlainFile {
                version: 1,
                slots: slots.clone(),
            })
        }
        .map_err(|err| AuthError::Invalid(format!("failed to serialize token file: {err}")))?;

        let mut options = std::fs::OpenOptions::new();
        options.create(true).truncate(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        file.write_all(text.as_bytes())?;
        file.flush()?;
        #[cfg(unix)]
        {
            // The mode above only applies when the file is created.
            use std::os::unix::fs::PermissionsExt;
            let _ = std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600));
        }
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<TokenSet>, AuthError> {
        let slots = self.read_slots()?;
        match slots.get(TOKEN_SLOT) {
            Some(text) => decode_slot(text).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, tokens: &TokenSet) -> Result<(), AuthError> {
        // An unreadable file is replaced rather than blocking a fresh login.
        let mut slots = self.read_slots().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "discarding unreadable token file");
            BTreeMap::new()
        });
        slots.insert(TOKEN_SLOT.to_string(), encode_slot(tokens)?);
        self.write_slots(&slots)
    }

    fn clear(&self) -> Result<(), AuthError> {
        let mut slots = match self.read_slots() {
            Ok(slots) => slots,
            Err(AuthError::Io(err)) => return Err(AuthError::Io(err)),
            Err(_) => BTreeMap::new(),
        };
        slots.remove(TOKEN_SLOT);
        if slots.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(err) => Err(AuthError::Io(err)),
            };
        }
        self.write_slots(&slots)
    }
}
