// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory registry and lookup doubles for unit and router tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::blockchain::{Account, Blockhash, ChainError, Hash, Pubkey, RegistryClient};
use crate::sns::derive::NAME_PROGRAM_ID;
use crate::sns::{LookupError, Record, RecordLookup};

#[derive(Default)]
struct RegistryInner {
    accounts: HashMap<Pubkey, Account>,
    blockhash_requests: u8,
}

/// Registry backed by a map of accounts. Clones share state.
#[derive(Clone, Default)]
pub struct MockRegistry {
    inner: Arc<Mutex<RegistryInner>>,
}

impl MockRegistry {
    pub fn insert(&self, address: Pubkey, data: Vec<u8>) {
        self.inner.lock().unwrap().accounts.insert(
            address,
            Account {
                lamports: 1,
                owner: NAME_PROGRAM_ID,
                data,
            },
        );
    }

    /// Register a name account with the given owner and no class.
    pub fn insert_name(&self, address: Pubkey, parent: Pubkey, owner: Pubkey) {
        let mut data = Vec::with_capacity(96);
        data.extend_from_slice(parent.as_bytes());
        data.extend_from_slice(owner.as_bytes());
        data.extend_from_slice(&[0u8; 32]);
        self.insert(address, data);
    }

    pub fn blockhash_requests(&self) -> u8 {
        self.inner.lock().unwrap().blockhash_requests
    }
}

#[async_trait]
impl RegistryClient for MockRegistry {
    async fn get_account(&self, address: &Pubkey) -> Result<Option<Account>, ChainError> {
        Ok(self.inner.lock().unwrap().accounts.get(address).cloned())
    }

    async fn get_multiple_accounts(
        &self,
        addresses: &[Pubkey],
    ) -> Result<Vec<Option<Account>>, ChainError> {
        let inner = self.inner.lock().unwrap();
        Ok(addresses.iter().map(|a| inner.accounts.get(a).cloned()).collect())
    }

    async fn latest_blockhash(&self) -> Result<Blockhash, ChainError> {
        let mut inner = self.inner.lock().unwrap();
        inner.blockhash_requests += 1;
        Ok(Blockhash {
            hash: Hash::new_from_array([inner.blockhash_requests; 32]),
            last_valid_block_height: 100 + u64::from(inner.blockhash_requests),
        })
    }

    async fn minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<u64, ChainError> {
        Ok((128 + data_len as u64) * 6960)
    }
}

/// Lookup API returning canned data, or failing every call.
#[derive(Clone, Default)]
pub struct MockLookup {
    domains: Vec<String>,
    records: Vec<(Record, String)>,
    fail_status: Option<u16>,
}

impl MockLookup {
    pub fn failing() -> Self {
        Self::failing_with(502)
    }

    pub fn failing_with(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub fn with_domains(mut self, domains: Vec<String>) -> Self {
        self.domains = domains;
        self
    }

    pub fn with_records(mut self, records: Vec<(Record, String)>) -> Self {
        self.records = records;
        self
    }

    fn check(&self) -> Result<(), LookupError> {
        match self.fail_status {
            Some(status) => Err(LookupError::Status {
                status,
                message: "unavailable".to_string(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RecordLookup for MockLookup {
    async fn domains_for_owner(&self, _owner: &Pubkey) -> Result<Vec<String>, LookupError> {
        self.check()?;
        Ok(self.domains.clone())
    }

    async fn records(
        &self,
        _domain: &str,
        records: &[Record],
    ) -> Result<Vec<(Record, String)>, LookupError> {
        self.check()?;
        Ok(self
            .records
            .iter()
            .filter(|(r, _)| records.contains(r))
            .cloned()
            .collect())
    }
}
