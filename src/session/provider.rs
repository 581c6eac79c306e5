//! Wallet provider seam.

use alloy::primitives::Address;
use std::future::Future;

use crate::blockchain::{BlockchainResult, ChainId};

/// The host's wallet capability.
///
/// The provider owns the credential; the portal only learns which accounts
/// it may use and which network the wallet is on.
pub trait WalletProvider: Send + Sync {
    /// Accounts already authorized for this portal, without prompting.
    fn get_authorized_accounts(&self) -> impl Future<Output = BlockchainResult<Vec<Address>>> + Send;

    /// Prompt the user to authorize an account.
    fn request_accounts(&self) -> impl Future<Output = BlockchainResult<Vec<Address>>> + Send;

    /// Network the wallet is currently on.
    fn get_chain_id(&self) -> impl Future<Output = BlockchainResult<ChainId>> + Send;
}
