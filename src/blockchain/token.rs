// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! SPL Token program interactions.

use super::message::{AccountMeta, Instruction};
use super::pda::find_program_address;
use super::types::{
    Pubkey, TokenMint, ASSOCIATED_TOKEN_PROGRAM_ID, SYSTEM_PROGRAM_ID, TOKEN_PROGRAM_ID,
};
use super::ChainError;

/// Token program instruction tag for `TransferChecked`.
const TRANSFER_CHECKED: u8 = 12;

/// Associated token program instruction tag for `CreateIdempotent`.
const CREATE_IDEMPOTENT: u8 = 1;

/// Mainnet USDC.
pub const USDC_MINT: TokenMint = TokenMint {
    symbol: "USDC",
    address: Pubkey::new_from_array([
        198, 250, 122, 243, 190, 219, 173, 58, 61, 101, 243, 106, 171, 201, 116, 49, 177, 187, 228,
        194, 210, 246, 224, 228, 124, 166, 2, 3, 69, 47, 93, 97,
    ]),
    decimals: 6,
};

/// Derive the associated token account holding `mint` for `wallet`.
pub fn associated_token_address(wallet: &Pubkey, mint: &Pubkey) -> Result<Pubkey, ChainError> {
    let seeds: [&[u8]; 3] = [wallet.as_bytes(), TOKEN_PROGRAM_ID.as_bytes(), mint.as_bytes()];
    let (address, _) = find_program_address(&seeds, &ASSOCIATED_TOKEN_PROGRAM_ID)?;
    Ok(address)
}

/// Open `wallet`'s token account for `mint` if it does not exist yet.
pub fn create_associated_token_account_idempotent(
    payer: &Pubkey,
    wallet: &Pubkey,
    mint: &Pubkey,
) -> Result<Instruction, ChainError> {
    let account = associated_token_address(wallet, mint)?;
    Ok(Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*payer, true),
            AccountMeta::new(account, false),
            AccountMeta::new_readonly(*wallet, false),
            AccountMeta::new_readonly(*mint, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),
        ],
        data: vec![CREATE_IDEMPOTENT],
    })
}

/// Move `amount` base units of `mint` between two token accounts.
pub fn transfer_checked(
    source: &Pubkey,
    mint: &TokenMint,
    destination: &Pubkey,
    authority: &Pubkey,
    amount: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(10);
    data.push(TRANSFER_CHECKED);
    data.extend_from_slice(&amount.to_le_bytes());
    data.push(mint.decimals);

    Instruction {
        program_id: TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*source, false),
            AccountMeta::new_readonly(mint.address, false),
            AccountMeta::new(*destination, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data,
    }
}

/// Convert a human-readable amount to base units, truncating extra precision.
///
/// `1.2345678` USDC becomes `1_234_567`: fractional digits beyond the mint's
/// decimals are floored away, never rounded. Truncation works on the
/// shortest decimal text of `amount`, so `2.01` is exactly `2_010_000`.
pub fn to_base_units(amount: f64, decimals: u8) -> Result<u64, ChainError> {
    if !amount.is_finite() || amount < 0.0 {
        return Err(ChainError::InvalidAmount(amount.to_string()));
    }
    if amount == 0.0 {
        return Ok(0);
    }
    let text = amount.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));

    let decimals = usize::from(decimals);
    let mut digits = String::with_capacity(whole.len() + decimals);
    digits.push_str(whole);
    digits.extend(fraction.chars().take(decimals));
    digits.extend(std::iter::repeat('0').take(decimals.saturating_sub(fraction.len())));

    digits
        .parse()
        .map_err(|_| ChainError::InvalidAmount(amount.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usdc_mint_matches_base58() {
        assert_eq!(
            USDC_MINT.address.to_string(),
            "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v"
        );
    }

    #[test]
    fn transfer_checked_layout() {
        let source = Pubkey::new_from_array([1; 32]);
        let destination = Pubkey::new_from_array([2; 32]);
        let authority = Pubkey::new_from_array([3; 32]);

        let ix = transfer_checked(&source, &USDC_MINT, &destination, &authority, 5_000_000);

        assert_eq!(ix.program_id, TOKEN_PROGRAM_ID);
        assert_eq!(ix.data, vec![12, 0x40, 0x4b, 0x4c, 0, 0, 0, 0, 0, 6]);
        assert_eq!(ix.accounts[0], AccountMeta::new(source, false));
        assert_eq!(ix.accounts[3], AccountMeta::new_readonly(authority, true));
    }

    #[test]
    fn base_units_truncate() {
        assert_eq!(to_base_units(10.0, 6).unwrap(), 10_000_000);
        assert_eq!(to_base_units(1.2345678, 6).unwrap(), 1_234_567);
        assert_eq!(to_base_units(0.0, 6).unwrap(), 0);
        assert_eq!(to_base_units(-0.0, 6).unwrap(), 0);
        assert_eq!(to_base_units(0.5, 0).unwrap(), 0);
        assert!(to_base_units(1e30, 6).is_err());
        assert!(to_base_units(-1.0, 6).is_err());
        assert!(to_base_units(f64::NAN, 6).is_err());
    }

    #[test]
    fn cent_amounts_convert_exactly() {
        assert_eq!(to_base_units(2.01, 6).unwrap(), 2_010_000);
        assert_eq!(to_base_units(4.1, 6).unwrap(), 4_100_000);
        assert_eq!(to_base_units(2.03, 6).unwrap(), 2_030_000);
        assert_eq!(to_base_units(0.000001, 6).unwrap(), 1);

        for cents in 0..100_000u64 {
            let amount = cents as f64 / 100.0;
            assert_eq!(to_base_units(amount, 6).unwrap(), cents * 10_000, "{amount}");
        }
    }

    #[test]
    fn idempotent_create_targets_derived_account() {
        let payer = Pubkey::new_from_array([1; 32]);
        let wallet: Pubkey = "HKKp49qGWXd639QsuH7JiLijfVW5UtCVY4s1n2HANwEA".parse().unwrap();
        let ix = create_associated_token_account_idempotent(&payer, &wallet, &USDC_MINT.address)
            .unwrap();
        assert_eq!(ix.data, vec![1]);
        assert_eq!(
            ix.accounts[1].pubkey.to_string(),
            "4bxx62vaCJm46dfhWkz31x78FJo5bZTAmrkmoVAu2jns"
        );
    }
}
