// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Owner and record lookups.

use axum::{
    extract::{Query, State},
    Json,
};

use super::{parse_pubkey, required};
use crate::{
    blockchain::Pubkey,
    error::GatewayError,
    models::{DomainQuery, DomainRecordsResponse, LookupQuery, LookupResponse, ReverseLookupResponse},
    sns::{
        records::{connected_wallets, resolve, RecordSet},
        NameRecordHeader, Record, RegistryKey,
    },
    state::AppState,
};

/// List the domains owned by a wallet.
#[utoipa::path(
    get,
    path = "/sns/lookup",
    tag = "Lookup",
    params(LookupQuery),
    responses(
        (status = 200, description = "Owned domains (sealed)", body = LookupResponse),
        (status = 400, description = "Invalid public key"),
        (status = 500, description = "Lookup API unavailable")
    )
)]
pub async fn lookup(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<LookupResponse>, GatewayError> {
    let raw = required(query.pubkey, "pubkey is required")?;
    let owner = parse_pubkey(&raw, "pubkey")?;

    let domains = state.lookup.domains_for_owner(&owner).await?;
    let total = domains.len();

    Ok(Json(LookupResponse {
        success: true,
        pubkey: owner.to_string(),
        domains,
        total_domains: total,
        message: format!("Found {total} domain(s)"),
    }))
}

/// Every known record of a domain.
#[utoipa::path(
    get,
    path = "/sns/domain-records",
    tag = "Lookup",
    params(DomainQuery),
    responses(
        (status = 200, description = "Domain records (sealed)", body = DomainRecordsResponse),
        (status = 400, description = "Invalid domain name"),
        (status = 404, description = "Domain not found"),
        (status = 500, description = "Registry unavailable")
    )
)]
pub async fn domain_records(
    State(state): State<AppState>,
    Query(query): Query<DomainQuery>,
) -> Result<Json<DomainRecordsResponse>, GatewayError> {
    let (key, owner, records) = load_records(&state, query.domain, &Record::ALL).await?;
    let count = records.len();

    Ok(Json(DomainRecordsResponse {
        domain: key.name,
        owner: owner.to_string(),
        records: records.to_map(),
        record_count: count,
        message: format!("Found {count} record(s)"),
    }))
}

/// Wallets linked to a domain: its owner and its address records.
#[utoipa::path(
    get,
    path = "/sns/reverse-lookup",
    tag = "Lookup",
    params(DomainQuery),
    responses(
        (status = 200, description = "Connected wallets (sealed)", body = ReverseLookupResponse),
        (status = 400, description = "Invalid domain name"),
        (status = 404, description = "Domain not found"),
        (status = 500, description = "Registry unavailable")
    )
)]
pub async fn reverse_lookup(
    State(state): State<AppState>,
    Query(query): Query<DomainQuery>,
) -> Result<Json<ReverseLookupResponse>, GatewayError> {
    let wallet_records: Vec<Record> = Record::ALL.into_iter().filter(|r| r.is_wallet()).collect();
    let (key, owner, records) = load_records(&state, query.domain, &wallet_records).await?;

    let wallets = connected_wallets(&owner, &records);
    let total = wallets.len();

    Ok(Json(ReverseLookupResponse {
        domain: key.name,
        owner: owner.to_string(),
        connected_wallets: wallets,
        total_connected_wallets: total,
        message: format!("Found {total} connected wallet(s)"),
    }))
}

/// Resolve the domain's owner, then its records. The owner read must
/// succeed; record sources are best-effort.
async fn load_records(
    state: &AppState,
    domain: Option<String>,
    kinds: &[Record],
) -> Result<(RegistryKey, Pubkey, RecordSet), GatewayError> {
    let name = required(domain, "Domain name is required")?;
    let key = state.deriver.derive(&name)?;

    let account = state
        .registry
        .get_account(&key.address)
        .await?
        .ok_or_else(|| GatewayError::NotFound("Domain not found".to_string()))?;
    let header = NameRecordHeader::unpack(&account.data)?;

    let records = resolve(
        state.registry.as_ref(),
        state.lookup.as_ref(),
        &state.deriver,
        &key,
        kinds,
    )
    .await;

    Ok((key, header.owner, records))
}
