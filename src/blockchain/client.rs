// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Solana JSON-RPC client for registry reads and freshness tokens.

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};

use super::types::*;

/// Commitment level used for every read.
const COMMITMENT: &str = "confirmed";

/// Read-only access to the chain, as needed by the relayer.
///
/// The service never writes: it only reads registry state and fetches the
/// freshness token for the transactions it assembles.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Fetch an account, `None` if it does not exist.
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError>;

    /// Fetch several accounts in one round trip, preserving input order.
    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, ChainError>;

    /// Fetch a fresh blockhash. Must be called immediately before signing.
    async fn latest_blockhash(&self) -> Result<Blockhash, ChainError>;

    /// Lamports needed to keep an account of `data_len` bytes rent-exempt.
    async fn minimum_balance_for_rent_exemption(&self, data_len: usize)
        -> Result<u64, ChainError>;
}

/// JSON-RPC backed [`RegistryClient`].
pub struct SolanaRpcClient {
    http: reqwest::Client,
    rpc_url: url::Url,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WithContext<T> {
    value: T,
}

#[derive(Debug, Deserialize)]
struct UiAccount {
    lamports: u64,
    owner: String,
    data: (String, String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UiBlockhash {
    blockhash: String,
    last_valid_block_height: u64,
}

impl SolanaRpcClient {
    pub fn new(rpc_url: url::Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            rpc_url,
        }
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, ChainError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .http
            .post(self.rpc_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| ChainError::Rpc {
                status: e.status().map(|s| s.as_u16()),
                message: format!("{method}: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChainError::Rpc {
                status: Some(status.as_u16()),
                message: format!("{method}: HTTP {status}: {text}"),
            });
        }

        let parsed: RpcResponse<T> = response.json().await.map_err(|e| ChainError::Rpc {
            status: None,
            message: format!("{method}: invalid response: {e}"),
        })?;

        if let Some(err) = parsed.error {
            return Err(ChainError::Rpc {
                status: None,
                message: format!("{method}: {} (code {})", err.message, err.code),
            });
        }
        parsed.result.ok_or_else(|| ChainError::Rpc {
            status: None,
            message: format!("{method}: empty result"),
        })
    }
}

fn decode_account(ui: UiAccount) -> Result<Account, ChainError> {
    let (encoded, encoding) = ui.data;
    if encoding != "base64" {
        return Err(ChainError::Encoding(format!("unexpected account encoding {encoding}")));
    }
    let data = Base64::decode_vec(&encoded)
        .map_err(|e| ChainError::Encoding(format!("account data: {e}")))?;
    Ok(Account {
        lamports: ui.lamports,
        owner: ui.owner.parse()?,
        data,
    })
}

#[async_trait]
impl RegistryClient for SolanaRpcClient {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError> {
        let response: WithContext<Option<UiAccount>> = self
            .call(
                "getAccountInfo",
                json!([address.to_string(), { "encoding": "base64", "commitment": COMMITMENT }]),
            )
            .await?;
        response.value.map(decode_account).transpose()
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, ChainError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = addresses.iter().map(ToString::to_string).collect();
        let response: WithContext<Vec<Option<UiAccount>>> = self
            .call(
                "getMultipleAccounts",
                json!([keys, { "encoding": "base64", "commitment": COMMITMENT }]),
            )
            .await?;
        response
            .value
            .into_iter()
            .map(|account| account.map(decode_account).transpose())
            .collect()
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, ChainError> {
        let response: WithContext<UiBlockhash> = self
            .call("getLatestBlockhash", json!([{ "commitment": COMMITMENT }]))
            .await?;
        Ok(Blockhash {
            hash: response.value.blockhash.parse()?,
            last_valid_block_height: response.value.last_valid_block_height,
        })
    }

    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ChainError> {
        self.call("getMinimumBalanceForRentExemption", json!([data_len]))
            .await
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("Invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("Invalid hash: {0}")]
    InvalidHash(String),

    #[error("Invalid seeds: {0}")]
    InvalidSeeds(String),

    #[error("Invalid keypair: {0}")]
    InvalidKeypair(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid signature for {0}")]
    InvalidSignature(Pubkey),

    #[error("{0} is not a required signer of this transaction")]
    SignerNotRequired(Pubkey),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Transaction too large: {0} bytes (max 1232)")]
    TransactionTooLarge(usize),

    #[error("RPC error: {message}")]
    Rpc { status: Option<u16>, message: String },
}
