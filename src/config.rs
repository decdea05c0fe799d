// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! once at startup; any invalid value aborts startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `SOLANA_RPC_URL` | Solana JSON-RPC endpoint | `https://api.mainnet-beta.solana.com` |
//! | `SNS_LOOKUP_URL` | Record-lookup API base URL | `https://sns-sdk-proxy.bonfida.workers.dev` |
//! | `RELAYER_PRIVATE_KEY` | Relayer key, base-58 or JSON byte array | One of this or `RELAYER_KEYPAIR_PATH` |
//! | `RELAYER_KEYPAIR_PATH` | Relayer keypair file (`solana-keygen` format) | - |
//! | `USDC_MINT` | Payment token mint | Mainnet USDC |
//! | `USDC_DECIMALS` | Payment token decimals | `6` |
//! | `TREASURY_ADDRESS` | Wallet receiving domain payments | Relayer address |
//! | `SNS_PROGRAM_ID` | Name-service program | `namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX` |
//! | `SNS_ROOT_DOMAIN` | `.sol` root account | `58PwtjSDuFHuUkYjH9BYnnQKHfwo9reZhC2zMJv9JPkx` |
//! | `SNS_RECORDS_CLASS` | Records v2 class | `2pMnqHvei2N5oDcVGCRdZx48gqti199wr5CsyTTafsbo` |
//! | `DOMAIN_SPACE` | Data bytes allocated per registered domain | `1000` |
//! | `ENCRYPTION_KEY` | Envelope passphrase | Required |
//! | `ENCRYPTION_IV` | Envelope IV, 16 bytes or 32 hex characters | Required |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::{fmt, path::PathBuf, str::FromStr};

use crate::blockchain::token::USDC_MINT;
use crate::blockchain::{ChainError, Pubkey, RelayerSigner};
use crate::envelope::{parse_iv, IV_LEN};
use crate::sns::SnsPrograms;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const SOLANA_RPC_URL_ENV: &str = "SOLANA_RPC_URL";
pub const SNS_LOOKUP_URL_ENV: &str = "SNS_LOOKUP_URL";

/// Relayer secret given inline. Takes precedence over [`RELAYER_KEYPAIR_PATH_ENV`].
pub const RELAYER_PRIVATE_KEY_ENV: &str = "RELAYER_PRIVATE_KEY";
pub const RELAYER_KEYPAIR_PATH_ENV: &str = "RELAYER_KEYPAIR_PATH";

pub const USDC_MINT_ENV: &str = "USDC_MINT";
pub const USDC_DECIMALS_ENV: &str = "USDC_DECIMALS";
pub const TREASURY_ADDRESS_ENV: &str = "TREASURY_ADDRESS";
pub const SNS_PROGRAM_ID_ENV: &str = "SNS_PROGRAM_ID";
pub const SNS_ROOT_DOMAIN_ENV: &str = "SNS_ROOT_DOMAIN";
pub const SNS_RECORDS_CLASS_ENV: &str = "SNS_RECORDS_CLASS";
pub const DOMAIN_SPACE_ENV: &str = "DOMAIN_SPACE";

/// Passphrase hashed with SHA-256 into the envelope key.
pub const ENCRYPTION_KEY_ENV: &str = "ENCRYPTION_KEY";
pub const ENCRYPTION_IV_ENV: &str = "ENCRYPTION_IV";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const RUST_LOG_ENV: &str = "RUST_LOG";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";
pub const DEFAULT_SNS_LOOKUP_URL: &str = "https://sns-sdk-proxy.bonfida.workers.dev";
pub const DEFAULT_DOMAIN_SPACE: u32 = 1000;
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{var} is invalid: {message}")]
    Invalid { var: &'static str, message: String },

    #[error("Relayer key could not be loaded: {0}")]
    Relayer(#[from] ChainError),
}

/// Where the relayer key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum RelayerKeySource {
    Inline(String),
    File(PathBuf),
}

impl fmt::Debug for RelayerKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayerKeySource::Inline(_) => f.write_str("Inline(<redacted>)"),
            RelayerKeySource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

/// Process-wide settings, read once at startup.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rpc_url: url::Url,
    pub lookup_url: url::Url,
    pub relayer_key: RelayerKeySource,
    pub usdc_mint: Pubkey,
    pub usdc_decimals: u8,
    /// `None` sends payments to the relayer itself
    pub treasury: Option<Pubkey>,
    pub programs: SnsPrograms,
    pub domain_space: u32,
    pub encryption_key: String,
    pub encryption_iv: [u8; IV_LEN],
    pub log_format: LogFormat,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("rpc_url", &self.rpc_url.as_str())
            .field("lookup_url", &self.lookup_url.as_str())
            .field("relayer_key", &self.relayer_key)
            .field("usdc_mint", &self.usdc_mint)
            .field("usdc_decimals", &self.usdc_decimals)
            .field("treasury", &self.treasury)
            .field("programs", &self.programs)
            .field("domain_space", &self.domain_space)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let relayer_key = match (get(RELAYER_PRIVATE_KEY_ENV), get(RELAYER_KEYPAIR_PATH_ENV)) {
            (Some(inline), _) => RelayerKeySource::Inline(inline),
            (None, Some(path)) => RelayerKeySource::File(PathBuf::from(path)),
            (None, None) => return Err(ConfigError::Missing(RELAYER_PRIVATE_KEY_ENV)),
        };

        let encryption_key =
            get(ENCRYPTION_KEY_ENV).ok_or(ConfigError::Missing(ENCRYPTION_KEY_ENV))?;
        let raw_iv = get(ENCRYPTION_IV_ENV).ok_or(ConfigError::Missing(ENCRYPTION_IV_ENV))?;
        let encryption_iv = parse_iv(&raw_iv).map_err(|e| ConfigError::Invalid {
            var: ENCRYPTION_IV_ENV,
            message: e.to_string(),
        })?;

        let defaults = SnsPrograms::default();
        let programs = SnsPrograms {
            name_program: parse_or(&get, SNS_PROGRAM_ID_ENV, defaults.name_program)?,
            root_domain: parse_or(&get, SNS_ROOT_DOMAIN_ENV, defaults.root_domain)?,
            records_class: parse_or(&get, SNS_RECORDS_CLASS_ENV, defaults.records_class)?,
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            None => LogFormat::default(),
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            Some(v) if v.eq_ignore_ascii_case("pretty") => LogFormat::Pretty,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: LOG_FORMAT_ENV,
                    message: format!("expected json or pretty, got {other}"),
                })
            }
        };

        Ok(Self {
            host: get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or(&get, PORT_ENV, DEFAULT_PORT)?,
            rpc_url: parse_or_str(&get, SOLANA_RPC_URL_ENV, DEFAULT_SOLANA_RPC_URL)?,
            lookup_url: parse_or_str(&get, SNS_LOOKUP_URL_ENV, DEFAULT_SNS_LOOKUP_URL)?,
            relayer_key,
            usdc_mint: parse_or(&get, USDC_MINT_ENV, USDC_MINT.address)?,
            usdc_decimals: parse_or(&get, USDC_DECIMALS_ENV, USDC_MINT.decimals)?,
            treasury: get(TREASURY_ADDRESS_ENV)
                .map(|v| parse_value(TREASURY_ADDRESS_ENV, &v))
                .transpose()?,
            programs,
            domain_space: parse_or(&get, DOMAIN_SPACE_ENV, DEFAULT_DOMAIN_SPACE)?,
            encryption_key,
            encryption_iv,
            log_format,
        })
    }

    /// Load the relayer key. Called once at startup; failure is fatal.
    pub fn relayer_signer(&self) -> Result<RelayerSigner, ConfigError> {
        let signer = match &self.relayer_key {
            RelayerKeySource::Inline(material) => RelayerSigner::from_key_material(material)?,
            RelayerKeySource::File(path) => RelayerSigner::from_keypair_file(path)?,
        };
        Ok(signer)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_value<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        message: e.to_string(),
    })
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        Some(raw) => parse_value(var, &raw),
        None => Ok(default),
    }
}

fn parse_or_str<T, G>(get: &G, var: &'static str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    let raw = get(var).unwrap_or_else(|| default.to_string());
    parse_value(var, &raw)
}
