//! Machine-derived encryption-at-rest for the token file.
//!
//! One key per file is derived with scrypt from host identity plus a random
//! salt. Each slot is sealed separately with AES-256-GCM-SIV, with the slot
//! name bound in as associated data so records cannot be swapped between
//! slots.

use aes_gcm_siv::aead::{Aead, KeyInit, Payload};
use aes_gcm_siv::{Aes256GcmSiv, Nonce};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine;
use rand::RngCore;
use scrypt::{scrypt, Params as ScryptParams};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use super::error::AuthError;

pub(crate) const SEALED_FILE_VERSION: u32 = 2;
const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;
const MACHINE_KEY_CONTEXT: &str = "alchemailyst-token-kek-v1";

#[cfg(not(test))]
const SCRYPT_LOG_N: u8 = 15;
#[cfg(test)]
const SCRYPT_LOG_N: u8 = 10;

/// On-disk shape of an encrypted token file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SealedFile {
    #[serde(default)]
    pub(crate) version: u32,
    #[serde(default)]
    pub(crate) encryption: SealedEnvelope,
    #[serde(default)]
    pub(crate) slots: BTreeMap<String, SealedSlot>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SealedEnvelope {
    #[serde(default)]
    pub(crate) kdf: String,
    #[serde(default)]
    pub(crate) salt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct SealedSlot {
    #[serde(default)]
    pub(crate) nonce: String,
    #[serde(default)]
    pub(crate) ciphertext: String,
}

pub(crate) fn looks_sealed(value: &serde_json::Value) -> bool {
    value
        .get("encryption")
        .and_then(|inner| inner.as_object())
        .is_some()
}

/// Seal every plaintext slot value under a freshly salted key.
pub(crate) fn seal_slots(slots: &BTreeMap<String, String>) -> Result<SealedFile, AuthError> {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let key = derive_machine_key(&salt)?;

    let mut sealed = BTreeMap::new();
    for (name, value) in slots {
        let (nonce, ciphertext) = encrypt_blob(&key, name, value.as_bytes())?;
        sealed.insert(
            name.clone(),
            SealedSlot {
                nonce: B64.encode(nonce),
                ciphertext: B64.encode(ciphertext),
            },
        );
    }

    Ok(SealedFile {
        version: SEALED_FILE_VERSION,
        encryption: SealedEnvelope {
            kdf: format!("scrypt-log{SCRYPT_LOG_N}"),
            salt: B64.encode(salt),
        },
        slots: sealed,
    })
}

/// Open every slot. A slot that fails to decrypt is reported by name.
pub(crate) fn open_slots(file: &SealedFile) -> Result<BTreeMap<String, String>, AuthError> {
    let salt = decode_fixed::<SALT_LEN>(&file.encryption.salt, "salt")?;
    let log_n = kdf_log_n(&file.encryption.kdf)?;
    let key = derive_key_with(&salt, log_n)?;

    let mut out = BTreeMap::new();
    for (name, slot) in &file.slots {
        let nonce = decode_fixed::<NONCE_LEN>(&slot.nonce, "nonce")?;
        let ciphertext = decode_bytes(&slot.ciphertext, "ciphertext")?;
        let plain = decrypt_blob(&key, name, &nonce, &ciphertext).map_err(|_| {
            AuthError::Invalid(format!(
                "failed to decrypt stored slot `{name}` (machine identity may have changed)"
            ))
        })?;
        let text = String::from_utf8(plain).map_err(|_| {
            AuthError::Invalid(format!("stored slot `{name}` is not valid UTF-8"))
        })?;
        out.insert(name.clone(), text);
    }
    Ok(out)
}

fn kdf_log_n(kdf: &str) -> Result<u8, AuthError> {
    kdf.strip_prefix("scrypt-log")
        .and_then(|n| n.parse::<u8>().ok())
        .ok_or_else(|| AuthError::Invalid(format!("unsupported token file kdf `{kdf}`")))
}

fn derive_machine_key(salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN], AuthError> {
    derive_key_with(salt, SCRYPT_LOG_N)
}

fn derive_key_with(salt: &[u8; SALT_LEN], log_n: u8) -> Result<[u8; KEY_LEN], AuthError> {
    let mut hashed = Sha256::new();
    hashed.update(MACHINE_KEY_CONTEXT.as_bytes());
    hashed.update(machine_secret_material());
    hashed.update(salt);
    let seed = hashed.finalize();

    let params = ScryptParams::new(log_n, 8, 1, KEY_LEN)
        .map_err(|err| AuthError::Invalid(format!("invalid scrypt parameters: {err}")))?;
    let mut key = [0u8; KEY_LEN];
    scrypt(&seed, salt, &params, &mut key)
        .map_err(|err| AuthError::Invalid(format!("failed to derive storage key: {err}")))?;
    Ok(key)
}

fn machine_secret_material() -> Vec<u8> {
    let hostname = hostname::get()
        .map(|value| value.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "unknown-host".to_string());
    let username = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown-user".to_string());
    let home = dirs::home_dir()
        .map(|path| path.display().to_string())
        .unwrap_or_default();
    let machine_id = ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .find_map(|path| {
            let text = std::fs::read_to_string(path).ok()?;
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_default();
    format!(
        "{}|{hostname}|{username}|{home}|{machine_id}",
        std::env::consts::OS
    )
    .into_bytes()
}

fn encrypt_blob(
    key: &[u8; KEY_LEN],
    slot: &str,
    plaintext: &[u8],
) -> Result<([u8; NONCE_LEN], Vec<u8>), AuthError> {
    let cipher = Aes256GcmSiv::new_from_slice(key)
        .map_err(|_| AuthError::Invalid("invalid encryption key length".to_string()))?;
    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);
    let payload = Payload {
        msg: plaintext,
        aad: slot.as_bytes(),
    };
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), payload)
        .map_err(|_| AuthError::Invalid("failed to encrypt token slot".to_string()))?;
    Ok((nonce, ciphertext))
}

fn decrypt_blob(
    key: &[u8; KEY_LEN],
    slot: &str,
    nonce: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, AuthError> {
    let cipher = Aes256GcmSiv::new_from_slice(key)
        .map_err(|_| AuthError::Invalid("invalid encryption key length".to_string()))?;
    let payload = Payload {
        msg: ciphertext,
        aad: slot.as_bytes(),
    };
    cipher
        .decrypt(Nonce::from_slice(nonce), payload)
        .map_err(|_| AuthError::Invalid("failed to decrypt token slot".to_string()))
}

fn decode_bytes(value: &str, field: &str) -> Result<Vec<u8>, AuthError> {
    B64.decode(value)
        .map_err(|err| AuthError::Invalid(format!("failed to decode token file field `{field}`: {err}")))
}

fn decode_fixed<const N: usize>(value: &str, field: &str) -> Result<[u8; N], AuthError> {
    let bytes = decode_bytes(value, field)?;
    bytes.as_slice().try_into().map_err(|_| {
        AuthError::Invalid(format!(
            "invalid token file field `{field}` length: expected {N}, got {}",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn seal_then_open_restores_slots() {
        let input = slots(&[("google_tokens", r#"{"access_token":"a"}"#)]);
        let sealed = seal_slots(&input).unwrap();
        assert_eq!(sealed.version, SEALED_FILE_VERSION);
        assert!(!sealed.slots["google_tokens"].ciphertext.contains("access_token"));
        assert_eq!(open_slots(&sealed).unwrap(), input);
    }

    // Verifies ciphertext moved to another slot name fails authentication.
    #[test]
    fn slot_name_is_bound_to_ciphertext() {
        let mut sealed = seal_slots(&slots(&[("google_tokens", "secret")])).unwrap();
        let record = sealed.slots.remove("google_tokens").unwrap();
        sealed.slots.insert("other".to_string(), record);
        let err = open_slots(&sealed).unwrap_err();
        assert!(err.to_string().contains("`other`"), "got: {err}");
    }

    #[test]
    fn looks_sealed_checks_for_envelope() {
        assert!(looks_sealed(&serde_json::json!({"encryption": {"salt": ""}})));
        assert!(!looks_sealed(&serde_json::json!({"slots": {}})));
    }

    #[test]
    fn unknown_kdf_is_rejected() {
        let mut sealed = seal_slots(&slots(&[])).unwrap();
        sealed.encryption.kdf = "argon2".into();
        assert!(open_slots(&sealed).is_err());
    }
}
