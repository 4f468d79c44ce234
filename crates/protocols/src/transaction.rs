//! Transaction requests handed to a [`TransactionSubmitter`](crate::TransactionSubmitter).

use crate::error::ProtocolError;
use solana_sdk::instruction::Instruction;
use solana_sdk::signature::Keypair;
use solana_sdk::signer::Signer;
use std::fmt;
use std::sync::Arc;

/// Body of a pending transaction.
#[derive(Debug, Clone)]
pub enum TransactionPayload {
    /// Instructions to be signed by the wallet plus any extra signers.
    Instructions(Vec<Instruction>),
    /// A bincode-serialised versioned transaction built by an external service.
    Serialized(Vec<u8>),
}

/// A transaction that has been built but not yet submitted.
#[derive(Clone)]
pub struct PendingTransaction {
    /// Short description used in logs and reports.
    pub label: String,
    pub payload: TransactionPayload,
    /// Signers besides the wallet, e.g. a fresh position mint.
    pub signers: Vec<Arc<Keypair>>,
}

impl PendingTransaction {
    pub fn new(label: impl Into<String>, instructions: Vec<Instruction>) -> Self {
        Self {
            label: label.into(),
            payload: TransactionPayload::Instructions(instructions),
            signers: Vec::new(),
        }
    }

    pub fn serialized(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            payload: TransactionPayload::Serialized(bytes),
            signers: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Arc<Keypair>) -> Self {
        self.signers.push(signer);
        self
    }

    /// Instructions of an instruction payload; empty for serialised ones.
    pub fn instructions(&self) -> &[Instruction] {
        match &self.payload {
            TransactionPayload::Instructions(instructions) => instructions,
            TransactionPayload::Serialized(_) => &[],
        }
    }

    /// Concatenates instruction payloads into a single transaction.
    ///
    /// Serialised transactions cannot be merged and are rejected.
    pub fn batch(
        label: impl Into<String>,
        parts: impl IntoIterator<Item = PendingTransaction>,
    ) -> Result<Self, ProtocolError> {
        let mut batched = Self::new(label, Vec::new());
        for part in parts {
            match part.payload {
                TransactionPayload::Instructions(instructions) => {
                    if let TransactionPayload::Instructions(all) = &mut batched.payload {
                        all.extend(instructions);
                    }
                }
                TransactionPayload::Serialized(_) => {
                    return Err(ProtocolError::Transaction(format!(
                        "cannot batch serialized transaction '{}'",
                        part.label
                    )));
                }
            }
            for signer in part.signers {
                if !batched
                    .signers
                    .iter()
                    .any(|existing| existing.pubkey() == signer.pubkey())
                {
                    batched.signers.push(signer);
                }
            }
        }
        Ok(batched)
    }
}

impl fmt::Debug for PendingTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let signers: Vec<String> = self
            .signers
            .iter()
            .map(|signer| signer.pubkey().to_string())
            .collect();
        f.debug_struct("PendingTransaction")
            .field("label", &self.label)
            .field("payload", &self.payload)
            .field("signers", &signers)
            .finish()
    }
}

/// Confirmed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionReceipt {
    pub signature: String,
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::pubkey::Pubkey;

    fn ix(tag: u8) -> Instruction {
        Instruction {
            program_id: Pubkey::new_unique(),
            accounts: Vec::new(),
            data: vec![tag],
        }
    }

    #[test]
    fn test_batch_concatenates_in_order() {
        let mint = Arc::new(Keypair::new());
        let first = PendingTransaction::new("update", vec![ix(1)]);
        let second = PendingTransaction::new("collect", vec![ix(2), ix(3)]).with_signer(mint.clone());
        let third = PendingTransaction::new("reward", vec![ix(4)]).with_signer(mint);

        let batch = PendingTransaction::batch("harvest", [first, second, third]).unwrap();
        let tags: Vec<u8> = batch.instructions().iter().map(|ix| ix.data[0]).collect();
        assert_eq!(tags, vec![1, 2, 3, 4]);
        assert_eq!(batch.signers.len(), 1);
        assert_eq!(batch.label, "harvest");
    }

    #[test]
    fn test_batch_rejects_serialized() {
        let parts = [
            PendingTransaction::new("a", vec![ix(1)]),
            PendingTransaction::serialized("swap", vec![0, 1, 2]),
        ];
        let err = PendingTransaction::batch("mixed", parts).unwrap_err();
        assert!(matches!(err, ProtocolError::Transaction(_)));
    }
}
