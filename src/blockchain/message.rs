// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Legacy transaction message compilation and wire encoding.
//!
//! Wire layout:
//!
//! ```text
//! header (3 bytes) | short_vec<pubkey> | recent blockhash (32 bytes) |
//! short_vec<{program_id_index: u8, short_vec<u8> accounts, short_vec<u8> data}>
//! ```

use super::types::{Hash, Pubkey, PUBKEY_BYTES};
use super::ChainError;

/// An account referenced by an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountMeta {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    pub fn new(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Pubkey, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A single program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Pubkey,
    pub accounts: Vec<AccountMeta>,
    pub data: Vec<u8>,
}

/// Signature/read-only counts that prefix every message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MessageHeader {
    pub num_required_signatures: u8,
    pub num_readonly_signed_accounts: u8,
    pub num_readonly_unsigned_accounts: u8,
}

/// An instruction with accounts replaced by indices into the key table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

/// A compiled legacy message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: MessageHeader,
    pub account_keys: Vec<Pubkey>,
    pub recent_blockhash: Hash,
    pub instructions: Vec<CompiledInstruction>,
}

#[derive(Debug, Clone, Copy)]
struct KeyMeta {
    pubkey: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl Message {
    /// Compile instructions into a message paid for by `payer`.
    ///
    /// Keys are ordered payer first, then writable signers, readonly
    /// signers, writable non-signers and readonly non-signers. Within each
    /// group keys keep the order in which they first appear.
    pub fn compile(
        instructions: &[Instruction],
        payer: &Pubkey,
        recent_blockhash: Hash,
    ) -> Result<Self, ChainError> {
        let mut metas: Vec<KeyMeta> = vec![KeyMeta {
            pubkey: *payer,
            is_signer: true,
            is_writable: true,
        }];

        let mut upsert = |pubkey: Pubkey, is_signer: bool, is_writable: bool| {
            if let Some(meta) = metas.iter_mut().find(|m| m.pubkey == pubkey) {
                meta.is_signer |= is_signer;
                meta.is_writable |= is_writable;
            } else {
                metas.push(KeyMeta {
                    pubkey,
                    is_signer,
                    is_writable,
                });
            }
        };

        for ix in instructions {
            for account in &ix.accounts {
                upsert(account.pubkey, account.is_signer, account.is_writable);
            }
            upsert(ix.program_id, false, false);
        }

        let group = |signer: bool, writable: bool| {
            metas
                .iter()
                .filter(move |m| m.is_signer == signer && m.is_writable == writable)
                .map(|m| m.pubkey)
        };

        let mut account_keys: Vec<Pubkey> = Vec::with_capacity(metas.len());
        account_keys.extend(group(true, true));
        account_keys.extend(group(true, false));
        account_keys.extend(group(false, true));
        account_keys.extend(group(false, false));

        if account_keys.len() > usize::from(u8::MAX) {
            return Err(ChainError::Encoding(format!(
                "too many account keys: {}",
                account_keys.len()
            )));
        }

        let count = |signer: bool, writable: bool| group(signer, writable).count() as u8;
        let header = MessageHeader {
            num_required_signatures: count(true, true) + count(true, false),
            num_readonly_signed_accounts: count(true, false),
            num_readonly_unsigned_accounts: count(false, false),
        };

        let position = |key: &Pubkey| -> u8 {
            // Every key was inserted above, so the lookup cannot miss.
            account_keys.iter().position(|k| k == key).unwrap_or_default() as u8
        };

        let compiled = instructions
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: position(&ix.program_id),
                accounts: ix.accounts.iter().map(|a| position(&a.pubkey)).collect(),
                data: ix.data.clone(),
            })
            .collect();

        Ok(Self {
            header,
            account_keys,
            recent_blockhash,
            instructions: compiled,
        })
    }

    /// Keys that must sign, in signature-slot order.
    pub fn signer_keys(&self) -> &[Pubkey] {
        let n = usize::from(self.header.num_required_signatures).min(self.account_keys.len());
        &self.account_keys[..n]
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(256);
        out.push(self.header.num_required_signatures);
        out.push(self.header.num_readonly_signed_accounts);
        out.push(self.header.num_readonly_unsigned_accounts);

        short_vec::encode_len(&mut out, self.account_keys.len());
        for key in &self.account_keys {
            out.extend_from_slice(key.as_bytes());
        }

        out.extend_from_slice(self.recent_blockhash.as_bytes());

        short_vec::encode_len(&mut out, self.instructions.len());
        for ix in &self.instructions {
            out.push(ix.program_id_index);
            short_vec::encode_len(&mut out, ix.accounts.len());
            out.extend_from_slice(&ix.accounts);
            short_vec::encode_len(&mut out, ix.data.len());
            out.extend_from_slice(&ix.data);
        }
        out
    }

    /// Parse a message and check that it is structurally sound.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ChainError> {
        let mut reader = Reader::new(bytes);

        let header = MessageHeader {
            num_required_signatures: reader.u8()?,
            num_readonly_signed_accounts: reader.u8()?,
            num_readonly_unsigned_accounts: reader.u8()?,
        };

        let key_count = reader.short_vec_len()?;
        let mut account_keys = Vec::with_capacity(key_count);
        for _ in 0..key_count {
            account_keys.push(Pubkey::try_from_slice(reader.take(PUBKEY_BYTES)?)?);
        }

        let mut blockhash = [0u8; 32];
        blockhash.copy_from_slice(reader.take(32)?);

        let ix_count = reader.short_vec_len()?;
        let mut instructions = Vec::with_capacity(ix_count);
        for _ in 0..ix_count {
            let program_id_index = reader.u8()?;
            let n_accounts = reader.short_vec_len()?;
            let accounts = reader.take(n_accounts)?.to_vec();
            let n_data = reader.short_vec_len()?;
            let data = reader.take(n_data)?.to_vec();
            instructions.push(CompiledInstruction {
                program_id_index,
                accounts,
                data,
            });
        }

        if !reader.is_empty() {
            return Err(ChainError::Encoding("trailing bytes after message".to_string()));
        }

        let message = Self {
            header,
            account_keys,
            recent_blockhash: Hash::new_from_array(blockhash),
            instructions,
        };
        message.sanitize()?;
        Ok(message)
    }

    /// Structural checks mirroring what a verifier runs before signatures.
    pub fn sanitize(&self) -> Result<(), ChainError> {
        let keys = self.account_keys.len();
        let h = &self.header;
        let signed = usize::from(h.num_required_signatures);

        if signed == 0 {
            return Err(ChainError::Encoding("message has no fee payer".to_string()));
        }
        if signed + usize::from(h.num_readonly_unsigned_accounts) > keys {
            return Err(ChainError::Encoding("header counts exceed key table".to_string()));
        }
        if h.num_readonly_signed_accounts >= h.num_required_signatures {
            return Err(ChainError::Encoding("fee payer must be writable".to_string()));
        }

        for ix in &self.instructions {
            let program = usize::from(ix.program_id_index);
            if program == 0 || program >= keys {
                return Err(ChainError::Encoding(format!(
                    "invalid program id index {program}"
                )));
            }
            if let Some(bad) = ix.accounts.iter().find(|&&i| usize::from(i) >= keys) {
                return Err(ChainError::Encoding(format!("invalid account index {bad}")));
            }
        }
        Ok(())
    }
}

/// Compact-u16 length prefix ("short vec"): 7 bits per byte, high bit set
/// on every byte but the last.
pub mod short_vec {
    pub fn encode_len(out: &mut Vec<u8>, len: usize) {
        let mut rem = len as u16;
        loop {
            let mut elem = (rem & 0x7f) as u8;
            rem >>= 7;
            if rem == 0 {
                out.push(elem);
                break;
            }
            elem |= 0x80;
            out.push(elem);
        }
    }

    /// Decode a length, returning it and the number of bytes consumed.
    pub fn decode_len(bytes: &[u8]) -> Option<(usize, usize)> {
        let mut len: usize = 0;
        for (i, byte) in bytes.iter().take(3).enumerate() {
            let elem = usize::from(*byte);
            len |= (elem & 0x7f) << (i * 7);
            if elem & 0x80 == 0 {
                // Reject non-canonical encodings (a trailing zero byte).
                if i > 0 && elem == 0 {
                    return None;
                }
                if len > usize::from(u16::MAX) {
                    return None;
                }
                return Some((len, i + 1));
            }
        }
        None
    }
}

/// Cursor over a byte slice for wire decoding.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn take(&mut self, n: usize) -> Result<&'a [u8], ChainError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.bytes.len())
            .ok_or_else(|| ChainError::Encoding("unexpected end of input".to_string()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, ChainError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn short_vec_len(&mut self) -> Result<usize, ChainError> {
        let (len, used) = short_vec::decode_len(&self.bytes[self.pos..])
            .ok_or_else(|| ChainError::Encoding("invalid compact-u16 length".to_string()))?;
        self.pos += used;
        Ok(len)
    }

    pub(crate) fn rest(&mut self) -> &'a [u8] {
        let slice = &self.bytes[self.pos..];
        self.pos = self.bytes.len();
        slice
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}
