use super::{RpcProvider, parse_pubkey};
use crate::error::ProtocolError;
use crate::transaction::PendingTransaction;
use crate::{TokenAccountProvider, TransactionSubmitter};
use async_trait::async_trait;
use clmm_autopilot_domain::entities::TokenBalance;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use tracing::info;

/// SPL token program ID.
pub const TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA");

/// Associated token program ID.
pub const ASSOCIATED_TOKEN_PROGRAM_ID: Pubkey =
    Pubkey::from_str_const("ATokenGPvbdGVxr1b2hvZbsiqW5xWH25efTNsLJA8knL");

/// System program ID.
pub const SYSTEM_PROGRAM_ID: Pubkey = Pubkey::from_str_const("11111111111111111111111111111111");

/// Rent sysvar ID.
pub const RENT_SYSVAR_ID: Pubkey =
    Pubkey::from_str_const("SysvarRent111111111111111111111111111111111");

/// `CreateIdempotent` in the associated token program.
const CREATE_IDEMPOTENT: u8 = 1;

/// Associated token account of `owner` for `mint`.
pub fn derive_ata(owner: &Pubkey, mint: &Pubkey) -> Pubkey {
    let (ata, _bump) = Pubkey::find_program_address(
        &[owner.as_ref(), TOKEN_PROGRAM_ID.as_ref(), mint.as_ref()],
        &ASSOCIATED_TOKEN_PROGRAM_ID,
    );
    ata
}

/// Creates the associated account unless it already exists.
pub fn create_ata_idempotent_instruction(funder: &Pubkey, owner: &Pubkey, mint: &Pubkey) -> Instruction {
    let ata = derive_ata(owner, mint);
    Instruction {
        program_id: ASSOCIATED_TOKEN_PROGRAM_ID,
        accounts: vec![
            AccountMeta::new(*funder, true),                     // funder
            AccountMeta::new(ata, false),                        // associated account
            AccountMeta::new_readonly(*owner, false),            // wallet
            AccountMeta::new_readonly(*mint, false),             // mint
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false), // system_program
            AccountMeta::new_readonly(TOKEN_PROGRAM_ID, false),  // token_program
        ],
        data: vec![CREATE_IDEMPOTENT],
    }
}

/// Associated token accounts of the submitting wallet.
pub struct RpcTokenAccounts {
    provider: Arc<RpcProvider>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl RpcTokenAccounts {
    pub fn new(provider: Arc<RpcProvider>, submitter: Arc<dyn TransactionSubmitter>) -> Self {
        Self {
            provider,
            submitter,
        }
    }
}

#[async_trait]
impl TokenAccountProvider for RpcTokenAccounts {
    async fn resolve_or_create(&self, mint: &str, create: bool) -> Result<String, ProtocolError> {
        let owner = parse_pubkey(&self.submitter.wallet())?;
        let mint = parse_pubkey(mint)?;
        let ata = derive_ata(&owner, &mint);

        if create && !self.provider.account_exists(&ata).await? {
            info!(%mint, account = %ata, "Creating associated token account");
            let tx = PendingTransaction::new(
                format!("create token account for {mint}"),
                vec![create_ata_idempotent_instruction(&owner, &owner, &mint)],
            );
            self.submitter.submit(&tx).await?;
        }
        Ok(ata.to_string())
    }

    async fn balance_of(&self, account: &str) -> Result<TokenBalance, ProtocolError> {
        let account = parse_pubkey(account)?;
        self.provider.get_token_account_balance(&account).await
    }

    async fn mint_decimals(&self, mint: &str) -> Result<u8, ProtocolError> {
        let mint = parse_pubkey(mint)?;
        self.provider.get_mint_decimals(&mint).await
    }
}
