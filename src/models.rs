// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures of the `/sns` API, in their plaintext
//! form. On the wire, POST bodies and every response are wrapped in an
//! encrypted [`Envelope`](crate::envelope::Envelope); query parameters are
//! sent in the clear.
//!
//! Field names follow the mobile client's camelCase JSON.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize, IntoParams)]
pub struct CheckDomainQuery {
    /// Domain to check, e.g. `abc.sol`
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LookupQuery {
    /// Owner wallet, base-58
    pub pubkey: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DomainQuery {
    /// Domain, e.g. `abc.sol`
    pub domain: Option<String>,
}

// =============================================================================
// Domain Purchase & Update
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct CheckDomainResponse {
    pub domain: String,
    pub available: bool,
    #[serde(rename = "priceUSDC")]
    pub price_usdc: f64,
    pub message: String,
}

/// Purchase request, sent encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDomainRequest {
    pub name: String,
    /// Buyer wallet; pays the price and owns the domain
    pub buyer_pubkey: String,
    /// Price the client quoted, checked against the price table
    #[serde(rename = "domainPriceUSDC")]
    pub domain_price_usdc: f64,
    #[serde(rename = "serviceFeeUSDC", default)]
    pub service_fee_usdc: Option<f64>,
    #[serde(default)]
    pub service_fee_address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseDomainResponse {
    pub success: bool,
    /// Partially signed transaction, base-58
    pub transaction: String,
    /// Same transaction, base64
    pub transaction_base64: String,
    pub message: String,
}

/// Ownership transfer request, sent encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDomainRequest {
    pub domain: String,
    pub new_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UpdateDomainResponse {
    pub success: bool,
    /// Partially signed transaction, base-58
    pub transaction: String,
    pub message: String,
}

// =============================================================================
// Lookups
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LookupResponse {
    pub success: bool,
    pub pubkey: String,
    pub domains: Vec<String>,
    pub total_domains: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DomainRecordsResponse {
    pub domain: String,
    pub owner: String,
    /// Record label → value, e.g. `"SOL"`, `"twitter"`
    pub records: BTreeMap<String, String>,
    pub record_count: usize,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReverseLookupResponse {
    pub domain: String,
    pub owner: String,
    /// Owner first, then wallet addresses from the domain's records
    pub connected_wallets: Vec<String>,
    pub total_connected_wallets: usize,
    pub message: String,
}
