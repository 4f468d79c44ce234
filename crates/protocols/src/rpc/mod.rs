//! Solana RPC access.

mod submitter;
mod token_accounts;

pub use submitter::WalletSubmitter;
pub use token_accounts::{
    ASSOCIATED_TOKEN_PROGRAM_ID, RENT_SYSVAR_ID, RpcTokenAccounts, SYSTEM_PROGRAM_ID,
    TOKEN_PROGRAM_ID, create_ata_idempotent_instruction, derive_ata,
};

use crate::error::ProtocolError;
use clmm_autopilot_domain::entities::TokenBalance;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::str::FromStr;
use tracing::debug;

/// Byte offset of `decimals` in an SPL mint account.
const MINT_DECIMALS_OFFSET: usize = 44;

pub(crate) fn parse_pubkey(address: &str) -> Result<Pubkey, ProtocolError> {
    Pubkey::from_str(address).map_err(|_| ProtocolError::InvalidAddress(address.to_string()))
}

/// Thin async wrapper over the RPC client.
pub struct RpcProvider {
    client: RpcClient,
}

impl RpcProvider {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: RpcClient::new(url.into()),
        }
    }

    pub fn url(&self) -> String {
        self.client.url()
    }

    /// Raw account data; [`ProtocolError::NotFound`] when the account does not exist.
    pub async fn get_account_data(&self, address: &Pubkey) -> Result<Vec<u8>, ProtocolError> {
        debug!(%address, "Fetching account");
        let response = self
            .client
            .get_account_with_commitment(address, self.client.commitment())
            .await?;
        response
            .value
            .map(|account| account.data)
            .ok_or_else(|| ProtocolError::NotFound(address.to_string()))
    }

    pub async fn account_exists(&self, address: &Pubkey) -> Result<bool, ProtocolError> {
        match self.get_account_data(address).await {
            Ok(_) => Ok(true),
            Err(ProtocolError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn get_mint_decimals(&self, mint: &Pubkey) -> Result<u8, ProtocolError> {
        let data = self.get_account_data(mint).await?;
        data.get(MINT_DECIMALS_OFFSET)
            .copied()
            .ok_or_else(|| ProtocolError::Decode {
                kind: "mint",
                address: mint.to_string(),
                reason: format!("account data is only {} bytes", data.len()),
            })
    }

    pub async fn get_token_account_balance(
        &self,
        account: &Pubkey,
    ) -> Result<TokenBalance, ProtocolError> {
        let ui_amount = self.client.get_token_account_balance(account).await?;
        let amount = ui_amount
            .amount
            .parse::<u64>()
            .map_err(|err| ProtocolError::Decode {
                kind: "token account",
                address: account.to_string(),
                reason: err.to_string(),
            })?;
        Ok(TokenBalance::new(amount, ui_amount.decimals))
    }

    pub async fn get_latest_blockhash(&self) -> Result<Hash, ProtocolError> {
        Ok(self.client.get_latest_blockhash().await?)
    }

    pub async fn send_and_confirm_transaction(
        &self,
        transaction: &Transaction,
    ) -> Result<Signature, ProtocolError> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|err| ProtocolError::Transaction(err.to_string()))
    }

    pub async fn send_and_confirm_versioned_transaction(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, ProtocolError> {
        self.client
            .send_and_confirm_transaction(transaction)
            .await
            .map_err(|err| ProtocolError::Transaction(err.to_string()))
    }
}
