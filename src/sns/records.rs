// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Record aggregation across the registry and the lookup API.
//!
//! Sources are consulted in a fixed order (registry v2, registry v1, lookup
//! API). A later source only fills records still missing; it never replaces
//! a value an earlier source produced. Failure of one source is logged and
//! the remaining sources still run.

use std::collections::BTreeMap;

use super::derive::{KeyDeriver, RecordVersion, RegistryKey};
use super::lookup::RecordLookup;
use super::state::{decode_v1, decode_v2, Record};
use crate::blockchain::{Pubkey, RegistryClient};

/// Record values keyed by kind, filled first-writer-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    values: BTreeMap<Record, String>,
}

impl RecordSet {
    /// Add values for records not yet present. Returns how many were added.
    pub fn fill<I>(&mut self, source: I) -> usize
    where
        I: IntoIterator<Item = (Record, String)>,
    {
        let mut added = 0;
        for (record, value) in source {
            if let std::collections::btree_map::Entry::Vacant(slot) = self.values.entry(record) {
                slot.insert(value);
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, record: Record) -> Option<&str> {
        self.values.get(&record).map(String::as_str)
    }

    pub fn contains(&self, record: Record) -> bool {
        self.values.contains_key(&record)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Record, &str)> {
        self.values.iter().map(|(r, v)| (*r, v.as_str()))
    }

    /// Labels to values, as exposed over the API.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(r, v)| (r.as_str().to_string(), v.to_string()))
            .collect()
    }
}

/// Resolve `kinds` on `domain` from every source.
pub async fn resolve(
    registry: &dyn RegistryClient,
    lookup: &dyn RecordLookup,
    deriver: &KeyDeriver,
    domain: &RegistryKey,
    kinds: &[Record],
) -> RecordSet {
    let mut set = RecordSet::default();

    for version in [RecordVersion::V2, RecordVersion::V1] {
        let pending: Vec<Record> = kinds.iter().copied().filter(|r| !set.contains(*r)).collect();
        if pending.is_empty() {
            return set;
        }
        match read_registry(registry, deriver, domain, &pending, version).await {
            Ok(found) => {
                let added = set.fill(found);
                tracing::debug!(domain = %domain.name, ?version, added, "Registry records read");
            }
            Err(e) => {
                tracing::warn!(domain = %domain.name, ?version, error = %e, "Registry record read failed");
            }
        }
    }

    let pending: Vec<Record> = kinds.iter().copied().filter(|r| !set.contains(*r)).collect();
    if pending.is_empty() {
        return set;
    }
    match lookup.records(domain.bare_name(), &pending).await {
        Ok(found) => {
            let added = set.fill(found.into_iter().filter(|(r, _)| pending.contains(r)));
            tracing::debug!(domain = %domain.name, added, "Lookup API records read");
        }
        Err(e) => {
            tracing::warn!(domain = %domain.name, error = %e, "Lookup API record read failed");
        }
    }

    set
}

async fn read_registry(
    registry: &dyn RegistryClient,
    deriver: &KeyDeriver,
    domain: &RegistryKey,
    kinds: &[Record],
    version: RecordVersion,
) -> Result<Vec<(Record, String)>, super::SnsError> {
    let keys = kinds
        .iter()
        .map(|r| deriver.record_key(domain, *r, version).map(|k| k.address))
        .collect::<Result<Vec<Pubkey>, _>>()?;
    let accounts = registry.get_multiple_accounts(&keys).await?;

    let mut found = Vec::new();
    for (record, account) in kinds.iter().zip(accounts) {
        let Some(account) = account else { continue };
        let decoded = match version {
            RecordVersion::V1 => decode_v1(*record, &account.data),
            RecordVersion::V2 => decode_v2(*record, &account.data),
        };
        match decoded {
            Ok(Some(value)) => found.push((*record, value)),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(domain = %domain.name, %record, error = %e, "Skipping undecodable record");
            }
        }
    }
    Ok(found)
}

/// Owner first, then every wallet-kind record value, without duplicates.
pub fn connected_wallets(owner: &Pubkey, records: &RecordSet) -> Vec<String> {
    let mut wallets = vec![owner.to_string()];
    for (record, value) in records.iter() {
        if record.is_wallet() && !wallets.iter().any(|w| w == value) {
            wallets.push(value.to_string());
        }
    }
    wallets
}
