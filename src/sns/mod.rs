// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana Name Service (`.sol` domains).
//!
//! - `derive` - name → registry address derivation
//! - `state` - registry account and record decoding
//! - `instructions` - name-service program instructions
//! - `assembler` - ordered operation sets with a freshness token
//! - `pricing` - domain price table
//! - `lookup` - external record-lookup API
//! - `records` - record aggregation across sources

pub mod assembler;
pub mod derive;
pub mod instructions;
pub mod lookup;
pub mod pricing;
pub mod records;
pub mod state;

pub use assembler::{Operation, OperationSet, TransactionAssembler};
pub use derive::{KeyDeriver, RegistryKey, SnsPrograms};
pub use lookup::{LookupError, RecordLookup, SnsProxyClient};
pub use state::{NameRecordHeader, Record};

use crate::blockchain::ChainError;

/// Errors raised while deriving, decoding or assembling registry data.
#[derive(Debug, thiserror::Error)]
pub enum SnsError {
    #[error("{0}")]
    InvalidName(String),

    #[error("Invalid registry data: {0}")]
    InvalidData(String),

    #[error("Operation set is empty")]
    EmptyOperationSet,

    #[error(transparent)]
    Chain(#[from] ChainError),
}
