// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Program-derived addresses.
//!
//! A program-derived address is `SHA-256(seeds || bump || program_id ||
//! "ProgramDerivedAddress")` for the highest bump whose hash is *not* a valid
//! ed25519 point.

use sha2::{Digest, Sha256};

use super::types::Pubkey;
use super::ChainError;

/// Maximum length of a single seed.
pub const MAX_SEED_LEN: usize = 32;

/// Maximum number of seeds, including the bump.
pub const MAX_SEEDS: usize = 16;

const PDA_MARKER: &[u8] = b"ProgramDerivedAddress";

fn hash_seeds(seeds: &[&[u8]], bump: u8, program_id: &Pubkey) -> Pubkey {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    hasher.update([bump]);
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    Pubkey::new_from_array(hasher.finalize().into())
}

fn check_seeds(seeds: &[&[u8]], max_seeds: usize) -> Result<(), ChainError> {
    if seeds.len() > max_seeds {
        return Err(ChainError::InvalidSeeds(format!(
            "too many seeds: {} (max {max_seeds})",
            seeds.len()
        )));
    }
    if let Some(seed) = seeds.iter().find(|s| s.len() > MAX_SEED_LEN) {
        return Err(ChainError::InvalidSeeds(format!(
            "seed of {} bytes exceeds {MAX_SEED_LEN}",
            seed.len()
        )));
    }
    Ok(())
}

/// Find the canonical (highest-bump) program-derived address for `seeds`.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), ChainError> {
    check_seeds(seeds, MAX_SEEDS - 1)?;

    for bump in (0..=u8::MAX).rev() {
        let address = hash_seeds(seeds, bump, program_id);
        if !address.is_on_curve() {
            return Ok((address, bump));
        }
    }

    Err(ChainError::InvalidSeeds("no viable bump seed".to_string()))
}
