// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::blockchain::ChainError;
use crate::envelope::EnvelopeError;
use crate::sns::{LookupError, SnsError};

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Generic 500. Details belong in the logs, not the response.
    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Failure kinds surfaced by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Missing or malformed input, price mismatch, name already taken
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    /// RPC node or lookup API failure
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    /// Envelope could not be opened
    #[error("{0}")]
    Decryption(String),

    #[error("{0}")]
    Internal(String),
}

impl From<ChainError> for GatewayError {
    fn from(err: ChainError) -> Self {
        match err {
            ChainError::InvalidPubkey(_) | ChainError::InvalidAmount(_) => {
                GatewayError::InvalidInput(err.to_string())
            }
            ChainError::Rpc { status, message } => GatewayError::Upstream {
                status,
                message: format!("RPC error: {message}"),
            },
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<SnsError> for GatewayError {
    fn from(err: SnsError) -> Self {
        match err {
            SnsError::InvalidName(message) => GatewayError::InvalidInput(message),
            SnsError::Chain(chain) => chain.into(),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<EnvelopeError> for GatewayError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Decryption(_) => GatewayError::Decryption(err.to_string()),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<LookupError> for GatewayError {
    fn from(err: LookupError) -> Self {
        let status = match &err {
            LookupError::Status { status, .. } => Some(*status),
            LookupError::Transport(_) | LookupError::Api(_) => None,
        };
        GatewayError::Upstream {
            status,
            message: err.to_string(),
        }
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::InvalidInput(message) | GatewayError::Decryption(message) => {
                ApiError::bad_request(message)
            }
            GatewayError::NotFound(message) => ApiError::not_found(message),
            GatewayError::Upstream { status, message } => {
                tracing::warn!(?status, %message, "Upstream failure");
                let status = status
                    .and_then(|s| StatusCode::from_u16(s).ok())
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                ApiError::new(status, message)
            }
            GatewayError::Internal(detail) => {
                tracing::error!(%detail, "Internal error");
                ApiError::internal()
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
