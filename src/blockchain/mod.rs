//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Environment Variables (private key)
//!     → wallet.rs (key loading, account authorization)
//!     → client.rs (RPC connection with timeouts and failover)
//!     → transaction.rs (confirmation tracking)
//! ```
//!
//! # Security Constraints
//! - Private keys ONLY from environment variables
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::BlockchainClient;
pub use types::{BlockchainError, BlockchainResult, ChainId, NetworkConfig, SubmissionReceipt};
pub use wallet::{LocalWalletProvider, Wallet};
