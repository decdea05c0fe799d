// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Partially signed transactions.
//!
//! A transaction is `short_vec<[u8; 64]> signatures || message`. Slots for
//! signers that have not signed yet hold 64 zero bytes; the encoding stays
//! well-formed and a downstream wallet fills its own slot before submitting.

use base64ct::{Base64, Encoding};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};

use super::message::{short_vec, Message, Reader};
use super::types::{Pubkey, PACKET_DATA_SIZE};
use super::ChainError;

/// Length of an ed25519 signature.
pub const SIGNATURE_BYTES: usize = 64;

const EMPTY_SIGNATURE: [u8; SIGNATURE_BYTES] = [0u8; SIGNATURE_BYTES];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub signatures: Vec<[u8; SIGNATURE_BYTES]>,
    pub message: Message,
}

impl Transaction {
    /// Wrap a message with one empty slot per required signer.
    pub fn new_unsigned(message: Message) -> Self {
        let slots = usize::from(message.header.num_required_signatures);
        Self {
            signatures: vec![EMPTY_SIGNATURE; slots],
            message,
        }
    }

    /// Fill the slot belonging to `key`, leaving every other slot untouched.
    pub fn partial_sign(&mut self, key: &SigningKey) -> Result<(), ChainError> {
        let signer = Pubkey::new_from_array(key.verifying_key().to_bytes());
        let slot = self
            .message
            .signer_keys()
            .iter()
            .position(|k| *k == signer)
            .ok_or(ChainError::SignerNotRequired(signer))?;

        let signature = key.sign(&self.message.serialize());
        self.signatures[slot] = signature.to_bytes();
        Ok(())
    }

    /// Signer keys whose slots are still empty.
    pub fn missing_signers(&self) -> Vec<Pubkey> {
        self.message
            .signer_keys()
            .iter()
            .zip(&self.signatures)
            .filter(|(_, sig)| **sig == EMPTY_SIGNATURE)
            .map(|(key, _)| *key)
            .collect()
    }

    /// Verify every filled slot against the message; empty slots are skipped.
    pub fn verify_present_signatures(&self) -> Result<(), ChainError> {
        let message = self.message.serialize();
        for (key, sig) in self.message.signer_keys().iter().zip(&self.signatures) {
            if *sig == EMPTY_SIGNATURE {
                continue;
            }
            let verifying = VerifyingKey::from_bytes(key.as_bytes())
                .map_err(|_| ChainError::InvalidSignature(*key))?;
            verifying
                .verify(&message, &Signature::from_bytes(sig))
                .map_err(|_| ChainError::InvalidSignature(*key))?;
        }
        Ok(())
    }

    pub fn serialize(&self) -> Vec<u8> {
        let message = self.message.serialize();
        let mut out = Vec::with_capacity(3 + self.signatures.len() * SIGNATURE_BYTES + message.len());
        short_vec::encode_len(&mut out, self.signatures.len());
        for sig in &self.signatures {
            out.extend_from_slice(sig);
        }
        out.extend_from_slice(&message);
        out
    }

    /// Parse a transaction without requiring any signature to be present.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ChainError> {
        let mut reader = Reader::new(bytes);
        let count = reader.short_vec_len()?;
        let mut signatures = Vec::with_capacity(count);
        for _ in 0..count {
            let mut sig = [0u8; SIGNATURE_BYTES];
            sig.copy_from_slice(reader.take(SIGNATURE_BYTES)?);
            signatures.push(sig);
        }
        let message = Message::deserialize(reader.rest())?;

        if signatures.len() != usize::from(message.header.num_required_signatures) {
            return Err(ChainError::Encoding(format!(
                "{} signature slots for {} required signers",
                signatures.len(),
                message.header.num_required_signatures
            )));
        }
        Ok(Self {
            signatures,
            message,
        })
    }
}

/// A serialized transaction carrying only the relayer's signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartiallySignedPayload {
    bytes: Vec<u8>,
}

impl PartiallySignedPayload {
    pub fn from_transaction(tx: &Transaction) -> Result<Self, ChainError> {
        let bytes = tx.serialize();
        if bytes.len() > PACKET_DATA_SIZE {
            return Err(ChainError::TransactionTooLarge(bytes.len()));
        }
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base58(&self) -> String {
        bs58::encode(&self.bytes).into_string()
    }

    pub fn to_base64(&self) -> String {
        Base64::encode_string(&self.bytes)
    }
}
