// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana integration module.
//!
//! This module provides functionality for:
//! - Account addresses, program-derived addresses and token accounts
//! - Compiling and encoding legacy transactions
//! - Reading accounts and freshness tokens over JSON-RPC
//! - Partially signing transactions with the relayer key

pub mod client;
pub mod message;
pub mod pda;
pub mod signing;
pub mod token;
pub mod transaction;
pub mod types;

pub use client::{ChainError, RegistryClient, SolanaRpcClient};
pub use message::{AccountMeta, Instruction, Message};
pub use pda::find_program_address;
pub use signing::RelayerSigner;
pub use transaction::{PartiallySignedPayload, Transaction};
pub use types::*;
