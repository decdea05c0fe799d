// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::blockchain::{Pubkey, RegistryClient, RelayerSigner, TokenMint};
use crate::config::{Config, ConfigError};
use crate::envelope::EncryptionGateway;
use crate::sns::{KeyDeriver, RecordLookup, TransactionAssembler};

/// Payment terms for domain purchases.
#[derive(Debug, Clone, Copy)]
pub struct PaymentConfig {
    pub mint: TokenMint,
    pub treasury: Pubkey,
    /// Data bytes allocated for each registered domain
    pub domain_space: u32,
}

/// Shared, immutable per-process state.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn RegistryClient>,
    pub lookup: Arc<dyn RecordLookup>,
    pub signer: Arc<RelayerSigner>,
    pub gateway: Arc<EncryptionGateway>,
    pub deriver: KeyDeriver,
    pub assembler: TransactionAssembler,
    pub payment: PaymentConfig,
}

impl AppState {
    /// Wire state from configuration. Fails if the relayer key cannot be loaded.
    pub fn new(
        config: &Config,
        registry: Arc<dyn RegistryClient>,
        lookup: Arc<dyn RecordLookup>,
    ) -> Result<Self, ConfigError> {
        let signer = config.relayer_signer()?;
        let payment = PaymentConfig {
            mint: TokenMint {
                symbol: "USDC",
                address: config.usdc_mint,
                decimals: config.usdc_decimals,
            },
            treasury: config.treasury.unwrap_or_else(|| signer.pubkey()),
            domain_space: config.domain_space,
        };
        let gateway = EncryptionGateway::new(&config.encryption_key, config.encryption_iv);

        Ok(Self::from_parts(
            registry,
            lookup,
            signer,
            gateway,
            KeyDeriver::new(config.programs),
            payment,
        ))
    }

    pub fn from_parts(
        registry: Arc<dyn RegistryClient>,
        lookup: Arc<dyn RecordLookup>,
        signer: RelayerSigner,
        gateway: EncryptionGateway,
        deriver: KeyDeriver,
        payment: PaymentConfig,
    ) -> Self {
        let assembler =
            TransactionAssembler::new(registry.clone(), deriver.programs().name_program);
        Self {
            registry,
            lookup,
            signer: Arc::new(signer),
            gateway: Arc::new(gateway),
            deriver,
            assembler,
            payment,
        }
    }
}
