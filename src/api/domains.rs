// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Domain availability, purchase and ownership transfer endpoints.
//!
//! Purchase and update return a transaction signed only by the relayer (as
//! fee payer). The client adds the remaining signatures and submits it.
//!
//! Availability is checked against the registry at request time and is not
//! reserved: two concurrent purchases of the same name can both pass the
//! check, and the network accepts whichever lands first.

use axum::{
    extract::{Query, State},
    Json,
};

use super::{parse_pubkey, required};
use crate::{
    blockchain::token::to_base_units,
    envelope::{Envelope, Sealed},
    error::GatewayError,
    models::{
        CheckDomainQuery, CheckDomainResponse, PurchaseDomainRequest, PurchaseDomainResponse,
        UpdateDomainRequest, UpdateDomainResponse,
    },
    sns::{
        assembler::{update_operations, Purchase},
        pricing::{domain_price_usdc, price_matches},
        state::HEADER_LEN,
        NameRecordHeader,
    },
    state::AppState,
};

/// Check whether a domain is still available and what it costs.
#[utoipa::path(
    get,
    path = "/sns/check-domain",
    tag = "Domains",
    params(CheckDomainQuery),
    responses(
        (status = 200, description = "Availability (sealed)", body = CheckDomainResponse),
        (status = 400, description = "Invalid domain name"),
        (status = 500, description = "Registry unavailable")
    )
)]
pub async fn check_domain(
    State(state): State<AppState>,
    Query(query): Query<CheckDomainQuery>,
) -> Result<Json<CheckDomainResponse>, GatewayError> {
    let name = required(query.name, "Domain name is required")?;
    let key = state.deriver.derive(&name)?;

    let available = state.registry.get_account(&key.address).await?.is_none();
    let message = if available {
        "Domain is available"
    } else {
        "Domain is already registered"
    };

    Ok(Json(CheckDomainResponse {
        price_usdc: domain_price_usdc(&key.name),
        domain: key.name,
        available,
        message: message.to_string(),
    }))
}

/// Assemble a purchase: USDC payment from the buyer, then registration.
#[utoipa::path(
    post,
    path = "/sns/purchase-domain",
    tag = "Domains",
    request_body(content = Envelope, description = "Encrypted PurchaseDomainRequest"),
    responses(
        (status = 200, description = "Partially signed transaction (sealed)", body = PurchaseDomainResponse),
        (status = 400, description = "Invalid input, price mismatch or domain taken"),
        (status = 500, description = "Assembly or signing failed")
    )
)]
pub async fn purchase_domain(
    State(state): State<AppState>,
    Sealed(request): Sealed<PurchaseDomainRequest>,
) -> Result<Json<PurchaseDomainResponse>, GatewayError> {
    let key = state.deriver.derive(&request.name)?;
    if key.parent != Some(state.deriver.programs().root_domain) {
        return Err(GatewayError::InvalidInput(
            "Only top-level domains can be purchased".to_string(),
        ));
    }
    let buyer = parse_pubkey(&request.buyer_pubkey, "buyerPubkey")?;

    if !price_matches(&key.name, request.domain_price_usdc) {
        tracing::info!(
            domain = %key.name,
            quoted = request.domain_price_usdc,
            expected = domain_price_usdc(&key.name),
            "Rejected purchase with stale price"
        );
        return Err(GatewayError::InvalidInput("Invalid domain price".to_string()));
    }

    if state.registry.get_account(&key.address).await?.is_some() {
        return Err(GatewayError::InvalidInput(
            "Domain is already registered".to_string(),
        ));
    }

    let payment = state.payment;
    let price = to_base_units(domain_price_usdc(&key.name), payment.mint.decimals)?;
    let service_fee = match (request.service_fee_usdc, request.service_fee_address.as_deref()) {
        (Some(fee), _) if fee == 0.0 => None,
        (Some(fee), Some(address)) => Some((
            parse_pubkey(address, "serviceFeeAddress")?,
            to_base_units(fee, payment.mint.decimals)?,
        )),
        (Some(_), None) => {
            return Err(GatewayError::InvalidInput(
                "serviceFeeAddress is required with serviceFeeUSDC".to_string(),
            ))
        }
        (None, _) => None,
    };

    let rent_lamports = state
        .registry
        .minimum_balance_for_rent_exemption(HEADER_LEN + payment.domain_space as usize)
        .await?;

    let relayer = state.signer.pubkey();
    let operations = Purchase {
        domain: &key,
        buyer,
        mint: payment.mint,
        treasury: payment.treasury,
        price,
        service_fee,
        rent_payer: relayer,
        rent_lamports,
        space: payment.domain_space,
    }
    .operations();

    let set = state.assembler.assemble(operations, relayer).await?;
    let payload = state.signer.sign(set)?;

    tracing::info!(
        domain = %key.name,
        buyer = %buyer,
        mint = payment.mint.symbol,
        price_units = price,
        bytes = payload.as_bytes().len(),
        "Purchase transaction assembled"
    );

    Ok(Json(PurchaseDomainResponse {
        success: true,
        transaction: payload.to_base58(),
        transaction_base64: payload.to_base64(),
        message: format!("Sign with {buyer} and submit to register {}", key.name),
    }))
}

/// Assemble an ownership transfer signed later by the current owner.
#[utoipa::path(
    post,
    path = "/sns/update-domain",
    tag = "Domains",
    request_body(content = Envelope, description = "Encrypted UpdateDomainRequest"),
    responses(
        (status = 200, description = "Partially signed transaction (sealed)", body = UpdateDomainResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Domain not found"),
        (status = 500, description = "Assembly or signing failed")
    )
)]
pub async fn update_domain(
    State(state): State<AppState>,
    Sealed(request): Sealed<UpdateDomainRequest>,
) -> Result<Json<UpdateDomainResponse>, GatewayError> {
    let key = state.deriver.derive(&request.domain)?;
    let new_owner = parse_pubkey(&request.new_owner, "newOwner")?;

    let account = state
        .registry
        .get_account(&key.address)
        .await?
        .ok_or_else(|| GatewayError::NotFound("Domain not found".to_string()))?;
    let header = NameRecordHeader::unpack(&account.data)?;

    let operations = update_operations(&key, header.owner, header.class, new_owner);
    let set = state
        .assembler
        .assemble(operations, state.signer.pubkey())
        .await?;
    let payload = state.signer.sign(set)?;

    tracing::info!(
        domain = %key.name,
        owner = %header.owner,
        new_owner = %new_owner,
        "Ownership transfer assembled"
    );

    Ok(Json(UpdateDomainResponse {
        success: true,
        transaction: payload.to_base58(),
        message: format!("Sign with {} and submit to transfer {}", header.owner, key.name),
    }))
}
