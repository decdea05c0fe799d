// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Name → registry address derivation.
//!
//! A registry address is the program-derived address of
//! `[SHA-256("SPL Name Service" || label), class, parent]` under the
//! name-service program, with the all-zero key standing in for an absent
//! class or parent. Derivation is pure: no network access.

use sha2::{Digest, Sha256};

use super::state::Record;
use super::SnsError;
use crate::blockchain::{find_program_address, Pubkey};

/// Domain-separation prefix shared with the name-service program.
pub const HASH_PREFIX: &str = "SPL Name Service";

/// Top-level suffix served by this gateway.
pub const SOL_SUFFIX: &str = ".sol";

/// Name-service program id (`namesLPneVptA9Z5rqUDD9tMTWEJwofgaYwp8cawRkX`).
pub const NAME_PROGRAM_ID: Pubkey = Pubkey::new_from_array([
    11, 173, 81, 244, 19, 193, 243, 169, 148, 96, 217, 0, 216, 191, 46, 214, 146, 126, 202, 52,
    215, 183, 132, 43, 248, 16, 169, 115, 8, 45, 30, 220,
]);

/// Parent account of every `.sol` domain (`58PwtjSDuFHuUkYjH9BYnnQKHfwo9reZhC2zMJv9JPkx`).
pub const ROOT_DOMAIN_ACCOUNT: Pubkey = Pubkey::new_from_array([
    61, 83, 194, 75, 56, 54, 14, 211, 129, 58, 35, 223, 178, 223, 216, 32, 171, 88, 33, 203, 121,
    41, 163, 141, 46, 170, 178, 82, 232, 56, 37, 149,
]);

/// Class of v2 record accounts (`2pMnqHvei2N5oDcVGCRdZx48gqti199wr5CsyTTafsbo`).
pub const RECORDS_CENTRAL_STATE: Pubkey = Pubkey::new_from_array([
    26, 253, 126, 22, 60, 117, 251, 235, 169, 206, 162, 129, 201, 20, 44, 12, 197, 46, 140, 248,
    228, 201, 213, 102, 236, 186, 150, 127, 18, 19, 242, 170,
]);

/// Label prefixes that keep subdomains and records from colliding.
const SUBDOMAIN_PREFIX: &str = "\0";
const RECORD_V1_PREFIX: &str = "\x01";
const RECORD_V2_PREFIX: &str = "\x02";

/// Program namespace the deriver works in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnsPrograms {
    pub name_program: Pubkey,
    pub root_domain: Pubkey,
    pub records_class: Pubkey,
}

impl Default for SnsPrograms {
    fn default() -> Self {
        Self {
            name_program: NAME_PROGRAM_ID,
            root_domain: ROOT_DOMAIN_ACCOUNT,
            records_class: RECORDS_CENTRAL_STATE,
        }
    }
}

/// Record account layout generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordVersion {
    V1,
    V2,
}

/// Registry address of a domain, subdomain or record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryKey {
    /// Normalized name, including the `.sol` suffix for domains
    pub name: String,
    pub address: Pubkey,
    pub hashed_name: [u8; 32],
    pub parent: Option<Pubkey>,
    pub class: Option<Pubkey>,
}

impl RegistryKey {
    /// The name without its `.sol` suffix, as the lookup API expects it.
    pub fn bare_name(&self) -> &str {
        self.name.strip_suffix(SOL_SUFFIX).unwrap_or(&self.name)
    }
}

/// `SHA-256(HASH_PREFIX || label)`.
pub fn hash_name(label: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(HASH_PREFIX.as_bytes());
    hasher.update(label.as_bytes());
    hasher.finalize().into()
}

/// Lowercase and trim a domain name, requiring the `.sol` suffix.
///
/// Returns the normalized name and its labels without the suffix, outermost
/// label last (`"a.b.sol"` → `["a", "b"]`).
pub fn normalize(name: &str) -> Result<(String, Vec<String>), SnsError> {
    let normalized = name.trim().to_lowercase();
    let stem = normalized
        .strip_suffix(SOL_SUFFIX)
        .ok_or_else(|| SnsError::InvalidName("Domain must end with .sol".to_string()))?;

    if stem.is_empty() {
        return Err(SnsError::InvalidName("Domain name is empty".to_string()));
    }

    let labels: Vec<String> = stem.split('.').map(str::to_string).collect();
    if labels.len() > 2 {
        return Err(SnsError::InvalidName(
            "Only domains and one level of subdomain are supported".to_string(),
        ));
    }
    if labels
        .iter()
        .any(|l| l.is_empty() || l.chars().any(|c| c.is_whitespace() || c.is_control()))
    {
        return Err(SnsError::InvalidName(format!("Invalid domain name: {normalized}")));
    }

    Ok((normalized, labels))
}

/// Derives registry addresses within one program namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyDeriver {
    programs: SnsPrograms,
}

impl KeyDeriver {
    pub fn new(programs: SnsPrograms) -> Self {
        Self { programs }
    }

    pub fn programs(&self) -> &SnsPrograms {
        &self.programs
    }

    /// Derive the key of `name` (`"abc.sol"` or `"sub.abc.sol"`).
    pub fn derive(&self, name: &str) -> Result<RegistryKey, SnsError> {
        let (normalized, labels) = normalize(name)?;

        match labels.as_slice() {
            [domain] => self.key_for(normalized, domain, None, Some(self.programs.root_domain)),
            [sub, domain] => {
                let parent = self.derive_domain(domain)?;
                self.key_for(
                    normalized,
                    &format!("{SUBDOMAIN_PREFIX}{sub}"),
                    None,
                    Some(parent.address),
                )
            }
            _ => Err(SnsError::InvalidName(format!("Invalid domain name: {normalized}"))),
        }
    }

    /// Derive the key of the record `record` attached to `domain`.
    pub fn record_key(
        &self,
        domain: &RegistryKey,
        record: Record,
        version: RecordVersion,
    ) -> Result<RegistryKey, SnsError> {
        let (prefix, class) = match version {
            RecordVersion::V1 => (RECORD_V1_PREFIX, None),
            RecordVersion::V2 => (RECORD_V2_PREFIX, Some(self.programs.records_class)),
        };
        self.key_for(
            format!("{}.{}", record.as_str(), domain.name),
            &format!("{prefix}{}", record.as_str()),
            class,
            Some(domain.address),
        )
    }

    fn derive_domain(&self, label: &str) -> Result<RegistryKey, SnsError> {
        self.key_for(
            format!("{label}{SOL_SUFFIX}"),
            label,
            None,
            Some(self.programs.root_domain),
        )
    }

    fn key_for(
        &self,
        name: String,
        hashed_label: &str,
        class: Option<Pubkey>,
        parent: Option<Pubkey>,
    ) -> Result<RegistryKey, SnsError> {
        let hashed_name = hash_name(hashed_label);
        let class_seed = class.unwrap_or_default();
        let parent_seed = parent.unwrap_or_default();

        let seeds: [&[u8]; 3] = [&hashed_name, class_seed.as_bytes(), parent_seed.as_bytes()];
        let (address, _) = find_program_address(&seeds, &self.programs.name_program)?;

        Ok(RegistryKey {
            name,
            address,
            hashed_name,
            parent,
            class,
        })
    }
}
