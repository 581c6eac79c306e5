//! Blockchain RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to JSON-RPC endpoint
//! - Query chain state (chain id, block number, receipts, logs)
//! - Handle timeouts and network errors gracefully
//! - Fail over to secondary endpoints

use alloy::providers::{Provider, ProviderBuilder};
use alloy::primitives::TxHash;
use alloy::rpc::types::{Filter, Log, TransactionReceipt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::blockchain::types::{BlockchainError, BlockchainResult, ChainId, NetworkConfig};
use crate::observability::metrics;

/// Blockchain RPC client wrapper with failover support.
#[derive(Clone)]
pub struct BlockchainClient {
    /// List of providers (primary + failovers).
    providers: Vec<Arc<dyn Provider + Send + Sync>>,
    /// Configuration.
    config: NetworkConfig,
    /// Request timeout duration.
    timeout_duration: Duration,
}

impl BlockchainClient {
    /// Create a new blockchain client.
    ///
    /// Does not touch the network; an unreachable endpoint surfaces on the
    /// first query instead.
    pub fn new(config: NetworkConfig) -> BlockchainResult<Self> {
        let timeout_duration = Duration::from_secs(config.rpc_timeout_secs);
        let mut providers = Vec::new();

        let primary_url: url::Url = config.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;
        providers.push(Arc::new(ProviderBuilder::new().connect_http(primary_url)) as Arc<dyn Provider + Send + Sync>);

        for url_str in &config.failover_urls {
            if let Ok(url) = url_str.parse() {
                providers.push(Arc::new(ProviderBuilder::new().connect_http(url)) as Arc<dyn Provider + Send + Sync>);
            } else {
                tracing::warn!(url = %url_str, "Ignoring invalid failover RPC URL");
            }
        }

        tracing::debug!(
            rpc_url = %config.rpc_url,
            providers = providers.len(),
            "Blockchain client initialized"
        );

        Ok(Self {
            providers,
            config,
            timeout_duration,
        })
    }

    /// Get the chain ID from the RPC.
    pub async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.with_failover("get chain id", |p| async move { p.get_chain_id().await })
            .await
            .map(ChainId)
    }

    /// Get the latest block number.
    pub async fn get_block_number(&self) -> BlockchainResult<u64> {
        self.with_failover("get block number", |p| async move { p.get_block_number().await })
            .await
    }

    /// Get a transaction receipt by hash.
    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> BlockchainResult<Option<TransactionReceipt>> {
        self.with_failover("get receipt", |p| async move {
            p.get_transaction_receipt(tx_hash).await
        })
        .await
    }

    /// Get logs matching a filter.
    pub async fn get_logs(&self, filter: &Filter) -> BlockchainResult<Vec<Log>> {
        self.with_failover("get logs", |p| async move { p.get_logs(filter).await })
            .await
    }

    /// Run `call` against each provider in turn until one answers in time.
    async fn with_failover<T, E, F, Fut>(&self, op: &str, call: F) -> BlockchainResult<T>
    where
        E: std::fmt::Display,
        F: Fn(Arc<dyn Provider + Send + Sync>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        for (i, provider) in self.providers.iter().enumerate() {
            match timeout(self.timeout_duration, call(Arc::clone(provider))).await {
                Ok(Ok(result)) => return Ok(result),
                Ok(Err(e)) => {
                    tracing::warn!(provider_idx = i, op, error = %e, "RPC error, trying next provider")
                }
                Err(_) => tracing::warn!(provider_idx = i, op, "RPC timeout, trying next provider"),
            }
        }
        Err(BlockchainError::Rpc(format!("All RPC providers failed to {}", op)))
    }

    /// Check if the blockchain is reachable and healthy.
    ///
    /// Returns true if we can query the block number.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.get_block_number().await.is_ok();
        metrics::record_rpc_health(healthy);
        healthy
    }

    /// Get the configuration.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// Get the number of confirmation blocks required.
    pub fn confirmation_blocks(&self) -> u32 {
        self.config.confirmation_blocks
    }
}

impl std::fmt::Debug for BlockchainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockchainClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("chain_id", &self.config.chain_id)
            .field("timeout_secs", &self.config.rpc_timeout_secs)
            .finish()
    }
}
