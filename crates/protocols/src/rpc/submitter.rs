use super::RpcProvider;
use crate::TransactionSubmitter;
use crate::error::ProtocolError;
use crate::transaction::{PendingTransaction, TransactionPayload, TransactionReceipt};
use async_trait::async_trait;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use std::sync::Arc;
use tracing::{debug, info};

/// Signs with the wallet keypair and sends through an [`RpcProvider`].
pub struct WalletSubmitter {
    provider: Arc<RpcProvider>,
    wallet: Arc<Keypair>,
}

impl WalletSubmitter {
    pub fn new(provider: Arc<RpcProvider>, wallet: Arc<Keypair>) -> Self {
        Self { provider, wallet }
    }
}

#[async_trait]
impl TransactionSubmitter for WalletSubmitter {
    fn wallet(&self) -> String {
        self.wallet.pubkey().to_string()
    }

    async fn submit(
        &self,
        transaction: &PendingTransaction,
    ) -> Result<TransactionReceipt, ProtocolError> {
        debug!(label = %transaction.label, "Sending transaction");

        let signature = match &transaction.payload {
            TransactionPayload::Instructions(instructions) => {
                let blockhash = self.provider.get_latest_blockhash().await?;
                let mut signers: Vec<&Keypair> = vec![self.wallet.as_ref()];
                signers.extend(transaction.signers.iter().map(|signer| signer.as_ref()));

                let mut tx = Transaction::new_with_payer(instructions, Some(&self.wallet.pubkey()));
                tx.try_sign(&signers, blockhash)
                    .map_err(|err| ProtocolError::Transaction(err.to_string()))?;
                self.provider.send_and_confirm_transaction(&tx).await?
            }
            TransactionPayload::Serialized(bytes) => {
                let unsigned: VersionedTransaction =
                    bincode::deserialize(bytes).map_err(|err| ProtocolError::Decode {
                        kind: "versioned transaction",
                        address: transaction.label.clone(),
                        reason: err.to_string(),
                    })?;
                let tx = VersionedTransaction::try_new(unsigned.message, &[self.wallet.as_ref()])
                    .map_err(|err| ProtocolError::Transaction(err.to_string()))?;
                self.provider
                    .send_and_confirm_versioned_transaction(&tx)
                    .await?
            }
        };

        info!(label = %transaction.label, signature = %signature, "Transaction confirmed");
        Ok(TransactionReceipt {
            signature: signature.to_string(),
            label: transaction.label.clone(),
        })
    }
}
