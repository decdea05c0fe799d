// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum glue for envelopes.
//!
//! `Sealed<T>` opens an encrypted request body and deserializes it into the
//! endpoint's request type in one step:
//!
//! ```rust,ignore
//! async fn purchase(
//!     State(state): State<AppState>,
//!     Sealed(request): Sealed<PurchaseDomainRequest>,
//! ) -> Result<Json<PurchaseDomainResponse>, GatewayError> {
//!     // request is plaintext here
//! }
//! ```
//!
//! [`seal_response`] encrypts every response body leaving the router it is
//! layered on, errors included.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Bytes},
    extract::{FromRequest, Request, State},
    http::header::{CONTENT_LENGTH, CONTENT_TYPE},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use super::{EncryptionGateway, Envelope};
use crate::error::{ApiError, GatewayError};
use crate::state::AppState;

/// Decrypted and typed request body.
pub struct Sealed<T>(pub T);

impl<T> FromRequest<AppState> for Sealed<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = GatewayError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| GatewayError::InvalidInput(format!("Failed to read body: {e}")))?;

        let envelope: Envelope = serde_json::from_slice(&body).map_err(|_| {
            GatewayError::Decryption("Request body is not an encrypted envelope".to_string())
        })?;
        let value = state.gateway.open(&envelope)?;

        let request = serde_json::from_value(value)
            .map_err(|e| GatewayError::InvalidInput(format!("Invalid request: {e}")))?;
        Ok(Sealed(request))
    }
}

/// Replace the response body with its encrypted envelope.
pub async fn seal_response(
    State(gateway): State<Arc<EncryptionGateway>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    let (parts, body) = response.into_parts();

    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!(error = %e, "Failed to buffer response body for sealing");
            return ApiError::internal().into_response();
        }
    };
    let Ok(plaintext) = std::str::from_utf8(&bytes) else {
        tracing::error!(status = %parts.status, "Response body is not UTF-8, cannot seal");
        return ApiError::internal().into_response();
    };

    let mut sealed = Json(Envelope {
        data: gateway.encrypt_text(plaintext),
    })
    .into_response();
    *sealed.status_mut() = parts.status;
    for (name, value) in &parts.headers {
        if name != CONTENT_TYPE && name != CONTENT_LENGTH {
            sealed.headers_mut().append(name.clone(), value.clone());
        }
    }
    sealed
}
