//! Local signer wallet.
//!
//! Stands in for a browser wallet extension: it owns the credential, decides
//! which accounts the portal may see, and reports the network it is on.
//!
//! # Security
//! - Private keys are loaded ONLY from environment variables
//! - Keys are never logged or serialized

use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::blockchain::client::BlockchainClient;
use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId};
use crate::config::WalletConfig;
use crate::session::provider::WalletProvider;

/// Wallet holding a signing key and its authorization state.
#[derive(Debug, Clone)]
pub struct Wallet {
    /// The underlying signer (private key).
    signer: PrivateKeySigner,
    /// Whether the account has been revealed to the portal.
    authorized: Arc<AtomicBool>,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    /// * `authorized` - Whether the account is already visible to the portal
    pub fn from_private_key(private_key_hex: &str, authorized: bool) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(
            address = %signer.address(),
            authorized,
            "Wallet initialized"
        );

        Ok(Self {
            signer,
            authorized: Arc::new(AtomicBool::new(authorized)),
        })
    }

    /// Load wallet from the environment variable named in the config.
    pub fn from_env(config: &WalletConfig) -> BlockchainResult<Self> {
        let private_key = std::env::var(&config.key_env).map_err(|_| {
            BlockchainError::Wallet(format!(
                "Environment variable {} not set",
                config.key_env
            ))
        })?;

        Self::from_private_key(&private_key, config.auto_connect)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Whether the account is currently revealed to the portal.
    pub fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::SeqCst)
    }

    /// Reveal the account to the portal.
    pub fn authorize(&self) {
        self.authorized.store(true, Ordering::SeqCst);
    }

    /// Signing wallet for transaction providers.
    pub fn ethereum_wallet(&self) -> EthereumWallet {
        EthereumWallet::from(self.signer.clone())
    }
}

/// [`WalletProvider`] backed by a local [`Wallet`] and an RPC endpoint.
#[derive(Debug, Clone)]
pub struct LocalWalletProvider {
    wallet: Wallet,
    client: BlockchainClient,
}

impl LocalWalletProvider {
    /// Pair a wallet with the client used to report the active network.
    pub fn new(wallet: Wallet, client: BlockchainClient) -> Self {
        Self { wallet, client }
    }
}

impl WalletProvider for LocalWalletProvider {
    async fn get_authorized_accounts(&self) -> BlockchainResult<Vec<Address>> {
        if self.wallet.is_authorized() {
            Ok(vec![self.wallet.address()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        self.wallet.authorize();
        tracing::info!(address = %self.wallet.address(), "Account authorized");
        Ok(vec![self.wallet.address()])
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.client.get_chain_id().await
    }
}
