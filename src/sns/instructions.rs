// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Name-service program instructions.

use crate::blockchain::{AccountMeta, Instruction, Pubkey, SYSTEM_PROGRAM_ID};

const CREATE: u8 = 0;
const TRANSFER: u8 = 2;

/// Accounts and funding of a new name account.
#[derive(Debug, Clone)]
pub struct CreateName {
    pub name_account: Pubkey,
    pub hashed_name: [u8; 32],
    pub owner: Pubkey,
    pub payer: Pubkey,
    /// Rent-exempt balance moved from `payer` into the new account
    pub lamports: u64,
    /// Data bytes allocated after the header
    pub space: u32,
    pub class: Option<Pubkey>,
    pub parent: Option<Pubkey>,
}

/// `Create`: allocate a name account and assign its owner.
///
/// Data: `0u8 | u32 len | hashed_name | u64 lamports | u32 space`.
pub fn create(program_id: &Pubkey, args: &CreateName) -> Instruction {
    let mut data = Vec::with_capacity(1 + 4 + 32 + 8 + 4);
    data.push(CREATE);
    data.extend_from_slice(&(args.hashed_name.len() as u32).to_le_bytes());
    data.extend_from_slice(&args.hashed_name);
    data.extend_from_slice(&args.lamports.to_le_bytes());
    data.extend_from_slice(&args.space.to_le_bytes());

    let mut accounts = vec![
        AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
        AccountMeta::new(args.payer, true),
        AccountMeta::new(args.name_account, false),
        AccountMeta::new_readonly(args.owner, false),
    ];
    accounts.push(match args.class {
        Some(class) => AccountMeta::new_readonly(class, true),
        None => AccountMeta::new_readonly(Pubkey::default(), false),
    });
    accounts.push(AccountMeta::new_readonly(
        args.parent.unwrap_or_default(),
        false,
    ));

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// `Transfer`: hand `name_account` to `new_owner`. Signed by the current owner.
pub fn transfer(
    program_id: &Pubkey,
    name_account: &Pubkey,
    new_owner: &Pubkey,
    current_owner: &Pubkey,
    class: Option<&Pubkey>,
) -> Instruction {
    let mut data = Vec::with_capacity(33);
    data.push(TRANSFER);
    data.extend_from_slice(new_owner.as_bytes());

    let mut accounts = vec![
        AccountMeta::new(*name_account, false),
        AccountMeta::new_readonly(*current_owner, true),
    ];
    if let Some(class) = class {
        accounts.push(AccountMeta::new_readonly(*class, true));
    }

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}
