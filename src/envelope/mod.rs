// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Encrypted request/response envelopes.
//!
//! Every `/sns` payload travels as `{"data": "<base64>"}` where `data` is the
//! JSON body encrypted with AES-256-CBC and PKCS#7 padding under a fixed IV.
//! The AES key is SHA-256 of the configured passphrase. Mobile clients
//! implement the same scheme, so the byte layout must not change.

mod extract;

pub use extract::{seal_response, Sealed};

use std::fmt;

use base64ct::{Base64, Encoding};
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use utoipa::ToSchema;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Length of the CBC initialization vector.
pub const IV_LEN: usize = 16;

/// Wire form of an encrypted payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Envelope {
    /// Base64 ciphertext
    pub data: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("Invalid encryption IV: {0}")]
    InvalidIv(String),

    #[error("Failed to decrypt payload: {0}")]
    Decryption(String),

    #[error("Failed to encode payload: {0}")]
    Encoding(String),
}

/// Parse the configured IV: 16 raw UTF-8 bytes or 32 hex characters.
pub fn parse_iv(raw: &str) -> Result<[u8; IV_LEN], EnvelopeError> {
    let bytes = match raw.len() {
        IV_LEN => raw.as_bytes().to_vec(),
        n if n == IV_LEN * 2 => hex::decode(raw)
            .map_err(|e| EnvelopeError::InvalidIv(format!("invalid hex: {e}")))?,
        n => {
            return Err(EnvelopeError::InvalidIv(format!(
                "expected 16 bytes or 32 hex characters, got {n} bytes"
            )))
        }
    };
    bytes
        .try_into()
        .map_err(|_| EnvelopeError::InvalidIv("expected 16 bytes".to_string()))
}

/// Symmetric cipher shared by every request for the process lifetime.
pub struct EncryptionGateway {
    key: [u8; 32],
    iv: [u8; IV_LEN],
}

impl fmt::Debug for EncryptionGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionGateway").finish_non_exhaustive()
    }
}

impl EncryptionGateway {
    pub fn new(passphrase: &str, iv: [u8; IV_LEN]) -> Self {
        Self {
            key: Sha256::digest(passphrase.as_bytes()).into(),
            iv,
        }
    }

    pub fn encrypt_text(&self, plaintext: &str) -> String {
        let ciphertext = Aes256CbcEnc::new(&self.key.into(), &self.iv.into())
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
        Base64::encode_string(&ciphertext)
    }

    pub fn decrypt_text(&self, ciphertext: &str) -> Result<String, EnvelopeError> {
        let bytes = Base64::decode_vec(ciphertext.trim())
            .map_err(|_| EnvelopeError::Decryption("ciphertext is not valid base64".to_string()))?;
        let plaintext = Aes256CbcDec::new(&self.key.into(), &self.iv.into())
            .decrypt_padded_vec_mut::<Pkcs7>(&bytes)
            .map_err(|_| EnvelopeError::Decryption("wrong key or corrupted ciphertext".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| EnvelopeError::Decryption("plaintext is not UTF-8".to_string()))
    }

    /// Encrypt the JSON encoding of `value`.
    pub fn encrypt_response<T: Serialize>(&self, value: &T) -> Result<String, EnvelopeError> {
        let json =
            serde_json::to_string(value).map_err(|e| EnvelopeError::Encoding(e.to_string()))?;
        Ok(self.encrypt_text(&json))
    }

    /// Decrypt a ciphertext into a JSON object or array.
    pub fn decrypt_request(&self, raw: &str) -> Result<Value, EnvelopeError> {
        let plaintext = self.decrypt_text(raw)?;
        let value: Value = serde_json::from_str(&plaintext)
            .map_err(|_| EnvelopeError::Decryption("plaintext is not JSON".to_string()))?;
        if !(value.is_object() || value.is_array()) {
            return Err(EnvelopeError::Decryption(
                "plaintext is not a JSON object or array".to_string(),
            ));
        }
        Ok(value)
    }

    pub fn seal<T: Serialize>(&self, value: &T) -> Result<Envelope, EnvelopeError> {
        Ok(Envelope {
            data: self.encrypt_response(value)?,
        })
    }

    pub fn open(&self, envelope: &Envelope) -> Result<Value, EnvelopeError> {
        self.decrypt_request(&envelope.data)
    }
}
