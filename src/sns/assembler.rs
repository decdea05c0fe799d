// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ordered operation sets for purchases and ownership updates.
//!
//! An [`OperationSet`] lists funds operations (token account opening and
//! transfers) strictly before registry operations, so a name is never
//! registered in a transaction that does not first attempt the payment.
//! The set carries the freshness token it must be signed with.

use std::sync::Arc;

use super::derive::RegistryKey;
use super::instructions::{self, CreateName};
use super::SnsError;
use crate::blockchain::token::{
    associated_token_address, create_associated_token_account_idempotent, transfer_checked,
};
use crate::blockchain::{Blockhash, ChainError, Instruction, Pubkey, RegistryClient, TokenMint};

/// One step of an operation set.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Open `wallet`'s associated token account for `mint` if missing,
    /// paid by the fee payer.
    OpenTokenAccount { wallet: Pubkey, mint: Pubkey },

    /// Move `amount` base units between the associated token accounts of
    /// two wallets. Signed by `from`.
    Transfer {
        from: Pubkey,
        to: Pubkey,
        mint: TokenMint,
        amount: u64,
    },

    /// Create the name account `target` owned by `owner`.
    Register {
        target: Pubkey,
        owner: Pubkey,
        payer: Pubkey,
        hashed_name: [u8; 32],
        /// Lamports funding the new account
        price: u64,
        space: u32,
        parent: Option<Pubkey>,
        class: Option<Pubkey>,
    },

    /// Hand `target` to `new_owner`. Signed by the current owner.
    ReassignOwner {
        target: Pubkey,
        new_owner: Pubkey,
        authority: Pubkey,
        class: Option<Pubkey>,
    },
}

impl Operation {
    /// Whether the operation moves or prepares funds.
    pub fn is_funds(&self) -> bool {
        matches!(
            self,
            Operation::OpenTokenAccount { .. } | Operation::Transfer { .. }
        )
    }

    fn to_instruction(
        &self,
        fee_payer: &Pubkey,
        name_program: &Pubkey,
    ) -> Result<Instruction, ChainError> {
        match self {
            Operation::OpenTokenAccount { wallet, mint } => {
                create_associated_token_account_idempotent(fee_payer, wallet, mint)
            }
            Operation::Transfer {
                from,
                to,
                mint,
                amount,
            } => {
                let source = associated_token_address(from, &mint.address)?;
                let destination = associated_token_address(to, &mint.address)?;
                Ok(transfer_checked(&source, mint, &destination, from, *amount))
            }
            Operation::Register {
                target,
                owner,
                payer,
                hashed_name,
                price,
                space,
                parent,
                class,
            } => Ok(instructions::create(
                name_program,
                &CreateName {
                    name_account: *target,
                    hashed_name: *hashed_name,
                    owner: *owner,
                    payer: *payer,
                    lamports: *price,
                    space: *space,
                    class: *class,
                    parent: *parent,
                },
            )),
            Operation::ReassignOwner {
                target,
                new_owner,
                authority,
                class,
            } => Ok(instructions::transfer(
                name_program,
                target,
                new_owner,
                authority,
                class.as_ref(),
            )),
        }
    }
}

/// Operations ready for signing.
#[derive(Debug, Clone)]
pub struct OperationSet {
    pub operations: Vec<Operation>,
    pub fee_payer: Pubkey,
    /// Recent blockhash; valid for a short window only
    pub freshness: Blockhash,
    pub name_program: Pubkey,
}

impl OperationSet {
    pub fn instructions(&self) -> Result<Vec<Instruction>, ChainError> {
        self.operations
            .iter()
            .map(|op| op.to_instruction(&self.fee_payer, &self.name_program))
            .collect()
    }
}

/// Builds operation sets against the live registry.
#[derive(Clone)]
pub struct TransactionAssembler {
    registry: Arc<dyn RegistryClient>,
    name_program: Pubkey,
}

impl TransactionAssembler {
    pub fn new(registry: Arc<dyn RegistryClient>, name_program: Pubkey) -> Self {
        Self {
            registry,
            name_program,
        }
    }

    /// Order `operations` funds-first and attach a fresh blockhash.
    ///
    /// Callers must have checked registry preconditions (availability,
    /// ownership) beforehand. The blockhash is fetched last and is never
    /// shared between two sets.
    pub async fn assemble(
        &self,
        operations: Vec<Operation>,
        fee_payer: Pubkey,
    ) -> Result<OperationSet, SnsError> {
        if operations.is_empty() {
            return Err(SnsError::EmptyOperationSet);
        }

        let (mut ordered, registry_ops): (Vec<_>, Vec<_>) =
            operations.into_iter().partition(Operation::is_funds);
        ordered.extend(registry_ops);

        let freshness = self.registry.latest_blockhash().await?;
        tracing::debug!(
            operations = ordered.len(),
            blockhash = %freshness.hash,
            last_valid_block_height = freshness.last_valid_block_height,
            "Assembled operation set"
        );

        Ok(OperationSet {
            operations: ordered,
            fee_payer,
            freshness,
            name_program: self.name_program,
        })
    }
}

/// A domain purchase paid in a stable token.
#[derive(Debug, Clone)]
pub struct Purchase<'a> {
    pub domain: &'a RegistryKey,
    pub buyer: Pubkey,
    pub mint: TokenMint,
    pub treasury: Pubkey,
    /// Domain price in base units
    pub price: u64,
    /// Optional service fee receiver and amount in base units
    pub service_fee: Option<(Pubkey, u64)>,
    /// Account funding the name account's rent
    pub rent_payer: Pubkey,
    pub rent_lamports: u64,
    pub space: u32,
}

impl Purchase<'_> {
    /// Payment transfers followed by the registration.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops = vec![
            Operation::OpenTokenAccount {
                wallet: self.treasury,
                mint: self.mint.address,
            },
            Operation::Transfer {
                from: self.buyer,
                to: self.treasury,
                mint: self.mint,
                amount: self.price,
            },
        ];

        if let Some((receiver, amount)) = self.service_fee.filter(|(_, amount)| *amount > 0) {
            ops.push(Operation::OpenTokenAccount {
                wallet: receiver,
                mint: self.mint.address,
            });
            ops.push(Operation::Transfer {
                from: self.buyer,
                to: receiver,
                mint: self.mint,
                amount,
            });
        }

        ops.push(Operation::Register {
            target: self.domain.address,
            owner: self.buyer,
            payer: self.rent_payer,
            hashed_name: self.domain.hashed_name,
            price: self.rent_lamports,
            space: self.space,
            parent: self.domain.parent,
            class: self.domain.class,
        });
        ops
    }
}

/// Ownership change of an existing name, authorised by its current owner.
pub fn update_operations(
    domain: &RegistryKey,
    current_owner: Pubkey,
    class: Option<Pubkey>,
    new_owner: Pubkey,
) -> Vec<Operation> {
    vec![Operation::ReassignOwner {
        target: domain.address,
        new_owner,
        authority: current_owner,
        class,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blockchain::token::USDC_MINT;
    use crate::blockchain::{RelayerSigner, Transaction};
    use crate::sns::derive::{KeyDeriver, NAME_PROGRAM_ID};
    use crate::test_support::MockRegistry;
    use ed25519_dalek::SigningKey;

    fn purchase_ops(domain: &RegistryKey, relayer: Pubkey, buyer: Pubkey) -> Vec<Operation> {
        Purchase {
            domain,
            buyer,
            mint: USDC_MINT,
            treasury: relayer,
            price: 10_000_000,
            service_fee: Some((Pubkey::new_from_array([8; 32]), 250_000)),
            rent_payer: relayer,
            rent_lamports: 7_850_880,
            space: 1000,
        }
        .operations()
    }

    fn assembler(registry: MockRegistry) -> TransactionAssembler {
        TransactionAssembler::new(Arc::new(registry), NAME_PROGRAM_ID)
    }

    #[tokio::test]
    async fn registration_follows_every_transfer() {
        let domain = KeyDeriver::default().derive("abc.sol").unwrap();
        let relayer = Pubkey::new_from_array([1; 32]);
        let buyer = Pubkey::new_from_array([2; 32]);

        let mut ops = purchase_ops(&domain, relayer, buyer);
        // Scramble: registry op first.
        ops.rotate_right(1);
        assert!(!ops[0].is_funds());

        let set = assembler(MockRegistry::default())
            .assemble(ops, relayer)
            .await
            .unwrap();

        let register = set
            .operations
            .iter()
            .position(|op| matches!(op, Operation::Register { .. }))
            .unwrap();
        for (i, op) in set.operations.iter().enumerate() {
            if matches!(op, Operation::Transfer { .. }) {
                assert!(register > i);
            }
        }
        assert_eq!(register, set.operations.len() - 1);
    }

    #[tokio::test]
    async fn partition_is_stable() {
        let a = Pubkey::new_from_array([1; 32]);
        let b = Pubkey::new_from_array([2; 32]);
        let ops = vec![
            Operation::ReassignOwner {
                target: a,
                new_owner: b,
                authority: a,
                class: None,
            },
            Operation::OpenTokenAccount { wallet: a, mint: b },
            Operation::OpenTokenAccount { wallet: b, mint: b },
        ];
        let set = assembler(MockRegistry::default()).assemble(ops, a).await.unwrap();
        assert_eq!(set.operations[0], Operation::OpenTokenAccount { wallet: a, mint: b });
        assert_eq!(set.operations[1], Operation::OpenTokenAccount { wallet: b, mint: b });
        assert!(matches!(set.operations[2], Operation::ReassignOwner { .. }));
    }

    #[tokio::test]
    async fn rejects_empty_sets() {
        let result = assembler(MockRegistry::default())
            .assemble(Vec::new(), Pubkey::default())
            .await;
        assert!(matches!(result, Err(SnsError::EmptyOperationSet)));
    }

    #[tokio::test]
    async fn each_set_fetches_its_own_blockhash() {
        let registry = MockRegistry::default();
        let assembler = TransactionAssembler::new(Arc::new(registry.clone()), NAME_PROGRAM_ID);
        let op = Operation::OpenTokenAccount {
            wallet: Pubkey::new_from_array([1; 32]),
            mint: USDC_MINT.address,
        };
        let first = assembler.assemble(vec![op.clone()], Pubkey::default()).await.unwrap();
        let second = assembler.assemble(vec![op], Pubkey::default()).await.unwrap();
        assert_eq!(registry.blockhash_requests(), 2);
        assert_ne!(first.freshness.hash, second.freshness.hash);
    }

    #[tokio::test]
    async fn signed_purchase_parses_with_missing_buyer_signature() {
        let signer = RelayerSigner::new(SigningKey::from_bytes(&[7; 32]));
        let buyer = Pubkey::new_from_array(SigningKey::from_bytes(&[9; 32]).verifying_key().to_bytes());
        let domain = KeyDeriver::default().derive("abc.sol").unwrap();

        let set = assembler(MockRegistry::default())
            .assemble(purchase_ops(&domain, signer.pubkey(), buyer), Pubkey::default())
            .await
            .unwrap();
        let blockhash = set.freshness.hash;
        let payload = signer.sign(set).unwrap();

        let tx = Transaction::from_bytes(payload.as_bytes()).unwrap();
        assert_eq!(tx.message.account_keys[0], signer.pubkey());
        assert_eq!(tx.message.recent_blockhash, blockhash);
        assert_eq!(tx.missing_signers(), vec![buyer]);
        tx.verify_present_signatures().unwrap();

        assert_eq!(bs58::decode(payload.to_base58()).into_vec().unwrap(), payload.as_bytes());
    }

    #[test]
    fn update_is_a_single_reassignment() {
        let domain = KeyDeriver::default().derive("abc.sol").unwrap();
        let owner = Pubkey::new_from_array([1; 32]);
        let new_owner = Pubkey::new_from_array([2; 32]);
        let ops = update_operations(&domain, owner, None, new_owner);
        assert_eq!(
            ops,
            vec![Operation::ReassignOwner {
                target: domain.address,
                new_owner,
                authority: owner,
                class: None,
            }]
        );
    }
}
