// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SNS Relayer - Gasless .sol Domain Gateway
//!
//! This crate assembles Solana Name Service transactions for clients that
//! hold no SOL. The relayer pays the network fee and signs as fee payer;
//! the client adds its own signature and submits. Request and response
//! bodies travel inside an AES-256-CBC envelope.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `blockchain` - Solana wire format, RPC client and relayer signing
//! - `envelope` - Encrypted request/response envelopes
//! - `sns` - Name derivation, registry layouts, operation assembly

pub mod api;
pub mod blockchain;
pub mod config;
pub mod envelope;
pub mod error;
pub mod models;
pub mod sns;
pub mod state;

#[cfg(test)]
mod test_support;
