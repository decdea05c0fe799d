// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Relayer key loading and partial transaction signing.
//!
//! The relayer pays network fees for every transaction it assembles. Its key
//! is loaded once at startup and is the only signature this service ever
//! produces; the end user's signature is added client-side.

use std::{fmt, path::Path};

use ed25519_dalek::SigningKey;

use super::message::Message;
use super::transaction::{PartiallySignedPayload, Transaction};
use super::types::Pubkey;
use super::ChainError;
use crate::sns::assembler::OperationSet;

/// Signs assembled operation sets as fee payer.
pub struct RelayerSigner {
    key: SigningKey,
    pubkey: Pubkey,
}

impl fmt::Debug for RelayerSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayerSigner")
            .field("pubkey", &self.pubkey)
            .finish_non_exhaustive()
    }
}

impl RelayerSigner {
    pub fn new(key: SigningKey) -> Self {
        let pubkey = Pubkey::new_from_array(key.verifying_key().to_bytes());
        Self { key, pubkey }
    }

    /// Parse key material given inline.
    ///
    /// Accepts a JSON byte array (the `solana-keygen` file format) or a
    /// base-58 string, each holding either a 64-byte keypair
    /// (secret || public) or a bare 32-byte secret.
    pub fn from_key_material(material: &str) -> Result<Self, ChainError> {
        let material = material.trim();
        let bytes: Vec<u8> = if material.starts_with('[') {
            serde_json::from_str(material)
                .map_err(|e| ChainError::InvalidKeypair(format!("invalid JSON byte array: {e}")))?
        } else {
            bs58::decode(material)
                .into_vec()
                .map_err(|e| ChainError::InvalidKeypair(format!("invalid base-58: {e}")))?
        };
        Self::from_bytes(&bytes)
    }

    /// Read a `solana-keygen` style keypair file.
    pub fn from_keypair_file(path: &Path) -> Result<Self, ChainError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ChainError::InvalidKeypair(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_key_material(&contents)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        match bytes.len() {
            32 => {
                let mut secret = [0u8; 32];
                secret.copy_from_slice(bytes);
                Ok(Self::new(SigningKey::from_bytes(&secret)))
            }
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(bytes);
                // Rejects keypairs whose public half does not match the secret.
                let key = SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|_| ChainError::InvalidKeypair("public key mismatch".to_string()))?;
                Ok(Self::new(key))
            }
            n => Err(ChainError::InvalidKeypair(format!(
                "expected 32 or 64 bytes, got {n}"
            ))),
        }
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    /// Designate the relayer as fee payer and add its signature.
    ///
    /// Every other signer slot is left empty for the client to fill.
    pub fn sign(&self, mut operations: OperationSet) -> Result<PartiallySignedPayload, ChainError> {
        operations.fee_payer = self.pubkey;

        let instructions = operations.instructions()?;
        let message = Message::compile(
            &instructions,
            &operations.fee_payer,
            operations.freshness.hash,
        )?;

        let mut tx = Transaction::new_unsigned(message);
        tx.partial_sign(&self.key)?;

        let missing = tx.missing_signers();
        tracing::debug!(
            relayer = %self.pubkey,
            missing_signers = missing.len(),
            "Partially signed transaction"
        );

        PartiallySignedPayload::from_transaction(&tx)
    }
}
