//! Transaction confirmation monitoring.
//!
//! # Responsibilities
//! - Poll receipts for a broadcast transaction
//! - Count confirmations against the configured depth
//! - Report reverts and timeouts as errors

use alloy::network::ReceiptResponse;
use alloy::primitives::TxHash;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ConfirmationStatus, SubmissionReceipt};

/// How often receipts are polled while waiting.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Wait for a transaction to be confirmed.
///
/// # Arguments
/// * `client` - RPC client used for receipts and block height
/// * `tx_hash` - Transaction hash to monitor
/// * `timeout_secs` - Maximum time to wait for confirmation
pub async fn wait_for_confirmation(
    client: &BlockchainClient,
    tx_hash: TxHash,
    timeout_secs: u64,
) -> BlockchainResult<ConfirmationStatus> {
    let required_confirmations = client.confirmation_blocks();
    let timeout_duration = Duration::from_secs(timeout_secs);

    let result = timeout(timeout_duration, async {
        let mut ticker = interval(RECEIPT_POLL_INTERVAL);

        loop {
            ticker.tick().await;

            let receipt = match client.get_transaction_receipt(tx_hash).await? {
                Some(r) => r,
                None => {
                    tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                    continue;
                }
            };

            if !receipt.status() {
                return Ok(ConfirmationStatus::Failed(
                    "Transaction reverted".to_string(),
                ));
            }

            let current_block = client.get_block_number().await?;
            let tx_block = receipt.block_number.unwrap_or(current_block);
            let status = confirmation_status(tx_block, current_block, required_confirmations);

            if let ConfirmationStatus::Confirming { current, required } = status {
                tracing::debug!(
                    tx_hash = %tx_hash,
                    confirmations = current,
                    required,
                    "Waiting for confirmations"
                );
                continue;
            }
            return Ok(status);
        }
    })
    .await;

    match result {
        Ok(status) => status,
        Err(_) => Err(BlockchainError::ConfirmationTimeout(required_confirmations)),
    }
}

/// Wait for confirmation and turn the final status into a receipt.
pub async fn settle(
    client: &BlockchainClient,
    tx_hash: TxHash,
    timeout_secs: u64,
) -> BlockchainResult<SubmissionReceipt> {
    match wait_for_confirmation(client, tx_hash, timeout_secs).await? {
        ConfirmationStatus::Confirmed { block_number } => Ok(SubmissionReceipt {
            tx_hash,
            block_number,
        }),
        ConfirmationStatus::Failed(reason) => Err(BlockchainError::Reverted(reason)),
        ConfirmationStatus::Confirming { required, .. } => {
            Err(BlockchainError::ConfirmationTimeout(required))
        }
    }
}

/// Classify a mined transaction by how deep it is buried.
///
/// A transaction in the head block counts as one confirmation.
fn confirmation_status(tx_block: u64, current_block: u64, required: u32) -> ConfirmationStatus {
    let confirmations = current_block.saturating_sub(tx_block).saturating_add(1);
    let confirmations = u32::try_from(confirmations).unwrap_or(u32::MAX);

    if confirmations >= required {
        ConfirmationStatus::Confirmed { block_number: tx_block }
    } else {
        ConfirmationStatus::Confirming {
            current: confirmations,
            required,
        }
    }
}
