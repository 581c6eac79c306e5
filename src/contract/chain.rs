//! Chain-backed portal contract.
//!
//! # Responsibilities
//! - Send poke/wave transactions with the configured gas hint
//! - Wait for confirmation before reporting success
//! - Read history as a snapshot call or as paged event-log windows
//! - Run the live event poller while anyone is listening, starting at the
//!   head read when the subscription is made

use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::Filter;
use std::sync::Arc;
use std::time::Duration;

use crate::blockchain::transaction::settle;
use crate::blockchain::{BlockchainClient, BlockchainError, BlockchainResult, SubmissionReceipt, Wallet};
use crate::config::{ContractConfig, ContractVariant, HistoryMode, PortalConfig, RetryConfig};
use crate::contract::abi::{PokePortal, WavePortal};
use crate::contract::poller::{EventPoller, RunningFlag};
use crate::contract::{HistoryPage, HistorySource, InteractionContract, PageCursor};
use crate::events::{Listener, ListenerRegistry, Subscription};
use crate::lifecycle::Shutdown;
use crate::session::Interaction;

/// The deployed portal contract, reached over JSON-RPC.
pub struct ChainContract {
    /// Contract-call provider; signs when a wallet was supplied.
    provider: DynProvider,
    /// Read client with failover, used for receipts and logs.
    client: BlockchainClient,
    address: Address,
    contract: ContractConfig,
    retry: RetryConfig,
    confirmation_timeout_secs: u64,
    registry: ListenerRegistry<Interaction>,
    poller_running: RunningFlag,
    shutdown: Shutdown,
}

impl ChainContract {
    /// Connect to the configured deployment.
    ///
    /// Without a wallet the adapter is read-only and submissions fail.
    pub fn connect(config: &PortalConfig, wallet: Option<&Wallet>) -> BlockchainResult<Self> {
        let address: Address = config.contract.address.parse().map_err(|e| {
            BlockchainError::Contract(format!(
                "Invalid contract address '{}': {}",
                config.contract.address, e
            ))
        })?;
        let rpc_url: url::Url = config.network.rpc_url.parse().map_err(|e| {
            BlockchainError::Rpc(format!("Invalid RPC URL '{}': {}", config.network.rpc_url, e))
        })?;

        let provider = match wallet {
            Some(wallet) => ProviderBuilder::new()
                .wallet(wallet.ethereum_wallet())
                .connect_http(rpc_url)
                .erased(),
            None => ProviderBuilder::new().connect_http(rpc_url).erased(),
        };

        let client = BlockchainClient::new(config.network.clone())?;

        tracing::info!(
            contract = %address,
            variant = ?config.contract.variant,
            history = ?config.contract.history_mode,
            signing = wallet.is_some(),
            "Portal contract connected"
        );

        Ok(Self {
            provider,
            client,
            address,
            contract: config.contract.clone(),
            retry: config.retry.clone(),
            confirmation_timeout_secs: config.network.confirmation_timeout_secs,
            registry: ListenerRegistry::new(),
            poller_running: RunningFlag::default(),
            shutdown: Shutdown::new(),
        })
    }

    /// Read client shared with the wallet provider.
    pub fn client(&self) -> &BlockchainClient {
        &self.client
    }

    /// Contract address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Number of live listeners.
    pub fn live_listeners(&self) -> usize {
        self.registry.len()
    }

    /// Total interactions the contract has recorded.
    pub async fn total_interactions(&self) -> BlockchainResult<u64> {
        let total = match self.contract.variant {
            ContractVariant::Poke => PokePortal::new(self.address, self.provider.clone())
                .getTotalPokes()
                .call()
                .await,
            ContractVariant::Wave => WavePortal::new(self.address, self.provider.clone())
                .getTotalWaves()
                .call()
                .await,
        }
        .map_err(|e| BlockchainError::Contract(e.to_string()))?;

        Ok(u64::try_from(total).unwrap_or(u64::MAX))
    }

    async fn snapshot(&self) -> BlockchainResult<Vec<Interaction>> {
        let items = match self.contract.variant {
            ContractVariant::Poke => PokePortal::new(self.address, self.provider.clone())
                .getAllPokes()
                .call()
                .await
                .map(|pokes| pokes.into_iter().map(Interaction::from).collect::<Vec<_>>()),
            ContractVariant::Wave => WavePortal::new(self.address, self.provider.clone())
                .getAllWaves()
                .call()
                .await
                .map(|waves| waves.into_iter().map(Interaction::from).collect::<Vec<_>>()),
        }
        .map_err(|e| BlockchainError::Contract(e.to_string()))?;

        Ok(items)
    }

    async fn log_window(&self, cursor: Option<PageCursor>) -> BlockchainResult<HistoryPage> {
        let from = cursor.map(|c| c.0).unwrap_or(self.contract.deploy_block);
        let head = self.client.get_block_number().await?;
        if from > head {
            return Ok(HistoryPage::default());
        }

        let to = from
            .saturating_add(self.contract.page_blocks.saturating_sub(1))
            .min(head);
        let filter = Filter::new()
            .address(self.address)
            .from_block(from)
            .to_block(to)
            .event_signature(self.contract.variant.event_signature());

        let logs = self.client.get_logs(&filter).await?;
        let items = logs
            .iter()
            .filter_map(|log| self.contract.variant.decode_event(log))
            .collect();

        Ok(HistoryPage {
            items,
            next: (to < head).then(|| PageCursor(to + 1)),
        })
    }

    async fn send(&self, message: String) -> BlockchainResult<alloy::primitives::TxHash> {
        let gas = self.contract.gas_limit;
        let pending = match self.contract.variant {
            ContractVariant::Poke => PokePortal::new(self.address, self.provider.clone())
                .poke(message)
                .gas(gas)
                .send()
                .await,
            ContractVariant::Wave => WavePortal::new(self.address, self.provider.clone())
                .wave(message)
                .gas(gas)
                .send()
                .await,
        }
        .map_err(|e| BlockchainError::Rpc(format!("Submission rejected: {}", e)))?;

        Ok(*pending.tx_hash())
    }

    /// Whether a live event poller is running.
    pub async fn is_polling(&self) -> bool {
        *self.poller_running.lock().await
    }

    /// Start the event poller at the current head unless one is running.
    async fn ensure_poller(&self) -> BlockchainResult<()> {
        let mut running = self.poller_running.lock().await;
        if *running {
            return Ok(());
        }

        let head = self.client.get_block_number().await?;
        let poller = EventPoller::new(
            self.client.clone(),
            self.address,
            self.contract.variant,
            self.registry.clone(),
            head,
        )
        .with_interval(Duration::from_millis(self.contract.poll_interval_ms))
        .with_retry(&self.retry)
        .with_running_flag(Arc::clone(&self.poller_running));

        tokio::spawn(poller.run(self.shutdown.subscribe()));
        *running = true;
        Ok(())
    }
}

impl HistorySource for ChainContract {
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> BlockchainResult<HistoryPage> {
        match self.contract.history_mode {
            HistoryMode::Snapshot => Ok(HistoryPage {
                items: self.snapshot().await?,
                next: None,
            }),
            HistoryMode::EventLog => self.log_window(cursor).await,
        }
    }
}

impl InteractionContract for ChainContract {
    async fn submit(&self, message: Option<String>) -> BlockchainResult<SubmissionReceipt> {
        match self.total_interactions().await {
            Ok(count) => tracing::info!(count, "Retrieved total interaction count"),
            Err(e) => tracing::debug!(error = %e, "Could not read interaction count"),
        }

        let tx_hash = self.send(message.unwrap_or_default()).await?;
        tracing::info!(tx_hash = %tx_hash, "Submission broadcast, waiting for confirmation");

        let receipt = settle(&self.client, tx_hash, self.confirmation_timeout_secs).await?;
        tracing::info!(
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            "Submission confirmed"
        );

        if let Ok(count) = self.total_interactions().await {
            tracing::info!(count, "Retrieved total interaction count");
        }
        Ok(receipt)
    }

    async fn subscribe(&self, listener: Listener<Interaction>) -> BlockchainResult<Subscription<Interaction>> {
        // Register before fixing the start block so the poller cannot see an
        // empty registry and stop in between.
        let subscription = self.registry.subscribe(listener);
        self.ensure_poller().await?;
        Ok(subscription)
    }
}

impl Drop for ChainContract {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

impl std::fmt::Debug for ChainContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainContract")
            .field("address", &self.address)
            .field("variant", &self.contract.variant)
            .field("listeners", &self.registry.len())
            .finish()
    }
}
