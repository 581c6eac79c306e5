//! Chain-specific types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

pub use crate::config::schema::NetworkConfig;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

impl std::fmt::Display for ChainId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Errors that can occur during blockchain operations.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Transaction was not confirmed within expected time.
    #[error("Transaction not confirmed after {0} blocks")]
    ConfirmationTimeout(u32),

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Invalid private key format or signer error.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// The user or signer refused to authorize an account.
    #[error("Authorization rejected: {0}")]
    Rejected(String),

    /// Contract call or return data could not be decoded.
    #[error("Contract error: {0}")]
    Contract(String),
}

/// Result type for blockchain operations.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

/// Transaction confirmation status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationStatus {
    /// Transaction has been mined but not enough confirmations.
    Confirming { current: u32, required: u32 },
    /// Transaction is confirmed with required block depth.
    Confirmed { block_number: u64 },
    /// Transaction failed or was dropped.
    Failed(String),
}

/// Outcome of a settled submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Hash of the confirmed transaction.
    pub tx_hash: TxHash,
    /// Block the transaction was included in.
    pub block_number: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_conversion() {
        let chain_id = ChainId::from(4u64);
        assert_eq!(chain_id.0, 4);
        assert_eq!(u64::from(chain_id), 4);
        assert_eq!(chain_id.to_string(), "0x4");
    }

    #[test]
    fn test_default_config() {
        let config = NetworkConfig::default();
        assert_eq!(config.rpc_timeout_secs, 10);
        assert_eq!(config.confirmation_blocks, 1);
    }

    #[test]
    fn test_error_display() {
        let err = BlockchainError::ConfirmationTimeout(3);
        assert_eq!(err.to_string(), "Transaction not confirmed after 3 blocks");

        let err = BlockchainError::Rejected("user denied".to_string());
        assert!(err.to_string().contains("user denied"));
    }
}
