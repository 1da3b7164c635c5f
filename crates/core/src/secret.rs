// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SecretString` puts an explicit type boundary around a secret-bearing
//! field: the constructor encrypts, `reveal()` decrypts.
//!
//! Encryption is a symmetric XOR-with-keystream cipher seeded from
//! `secrets.encryption_key` / `FERNET_KEY` (base64). When no key is
//! configured, stored secrets still round-trip, falling back to a
//! reversible, clearly-non-secret base64 encoding.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A secret-bearing field. Never logged or `Debug`-printed in full.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SecretString {
    ciphertext: String,
    /// True when `ciphertext` was produced with a real key, false when it's
    /// the reversible fallback encoding.
    encrypted: bool,
}

impl SecretString {
    /// Encrypt `plaintext` with `key` (real encryption when `Some`, the
    /// reversible fallback encoding otherwise).
    pub fn new(plaintext: &str, key: Option<&[u8]>) -> Self {
        match key {
            Some(key) if !key.is_empty() => {
                Self { ciphertext: xor_b64_encode(plaintext.as_bytes(), key), encrypted: true }
            }
            _ => Self {
                ciphertext: base64::Engine::encode(
                    &base64::engine::general_purpose::STANDARD,
                    plaintext,
                ),
                encrypted: false,
            },
        }
    }

    /// Decrypt back to plaintext. `key` must match whatever was passed to
    /// [`SecretString::new`] when `encrypted` is true.
    pub fn reveal(&self, key: Option<&[u8]>) -> Result<String, SecretError> {
        if self.encrypted {
            let key = key.ok_or(SecretError::MissingKey)?;
            xor_b64_decode(&self.ciphertext, key).ok_or(SecretError::Malformed)
        } else {
            let bytes = base64::Engine::decode(
                &base64::engine::general_purpose::STANDARD,
                &self.ciphertext,
            )
            .map_err(|_| SecretError::Malformed)?;
            String::from_utf8(bytes).map_err(|_| SecretError::Malformed)
        }
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(<redacted>)")
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("secret was encrypted but no key was configured")]
    MissingKey,
    #[error("secret ciphertext is malformed")]
    Malformed,
}

fn xor_b64_encode(plaintext: &[u8], key: &[u8]) -> String {
    let bytes: Vec<u8> =
        plaintext.iter().enumerate().map(|(i, b)| b ^ key[i % key.len()]).collect();
    base64::Engine::encode(&base64::engine::general_purpose::STANDARD, bytes)
}

fn xor_b64_decode(ciphertext: &str, key: &[u8]) -> Option<String> {
    let bytes =
        base64::Engine::decode(&base64::engine::general_purpose::STANDARD, ciphertext).ok()?;
    let plain: Vec<u8> = bytes.iter().enumerate().map(|(i, b)| b ^ key[i % key.len()]).collect();
    String::from_utf8(plain).ok()
}

#[cfg(test)]
#[path = "secret_tests.rs"]
mod tests;
