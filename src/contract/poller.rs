//! Live interaction event poller.
//!
//! Plain HTTP endpoints cannot push events, so new interactions are found by
//! polling `eth_getLogs` from the last seen block to the head and handing
//! each decoded event to the listener registry.
//!
//! # Design Decisions
//! - The start block is fixed by whoever spawns the poller, before the
//!   subscription is handed out, so nothing mined after that is skipped
//! - The poller stops itself once the registry has no listeners; the shared
//!   running flag is cleared under its lock so a concurrent subscriber
//!   either sees the poller alive or starts a fresh one

use alloy::primitives::Address;
use alloy::rpc::types::Filter;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::time::sleep;

use crate::blockchain::{BlockchainClient, BlockchainResult};
use crate::config::{ContractVariant, RetryConfig};
use crate::events::ListenerRegistry;
use crate::observability::metrics;
use crate::resilience::Backoff;
use crate::session::Interaction;

/// Whether a poller task is serving the registry.
pub type RunningFlag = Arc<Mutex<bool>>;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(4);

/// Background task polling for new interaction events.
pub struct EventPoller {
    client: BlockchainClient,
    contract_address: Address,
    variant: ContractVariant,
    registry: ListenerRegistry<Interaction>,
    interval: Duration,
    backoff: Backoff,
    last_block: u64,
    running: RunningFlag,
}

impl EventPoller {
    /// Create a poller delivering events mined after `start_block`.
    pub fn new(
        client: BlockchainClient,
        contract_address: Address,
        variant: ContractVariant,
        registry: ListenerRegistry<Interaction>,
        start_block: u64,
    ) -> Self {
        Self {
            client,
            contract_address,
            variant,
            registry,
            interval: DEFAULT_INTERVAL,
            backoff: Backoff::new(&RetryConfig::default()),
            last_block: start_block,
            running: Arc::new(Mutex::new(true)),
        }
    }

    /// Time between polls while healthy.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Pacing of polls after failures.
    pub fn with_retry(mut self, retry: &RetryConfig) -> Self {
        self.backoff = Backoff::new(retry);
        self
    }

    /// Flag to clear when the poller stops for lack of listeners.
    pub fn with_running_flag(mut self, running: RunningFlag) -> Self {
        self.running = running;
        self
    }

    /// Last block whose events have been dispatched.
    pub fn last_block(&self) -> u64 {
        self.last_block
    }

    /// Run until the shutdown signal fires or the last listener leaves.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            contract = %self.contract_address,
            event = self.variant.event_name(),
            from_block = self.last_block,
            "Starting event poller"
        );

        let mut delay = self.interval;
        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = sleep(delay) => {}
            }

            if self.stop_if_idle().await {
                tracing::info!("No listeners left, stopping event poller");
                break;
            }

            delay = match self.poll_events().await {
                Ok(_) => {
                    self.backoff.reset();
                    self.interval
                }
                Err(e) => {
                    let retry_in = self.backoff.next_delay();
                    tracing::error!(
                        error = %e,
                        failures = self.backoff.failures(),
                        retry_in_ms = retry_in.as_millis() as u64,
                        "Error polling interaction events"
                    );
                    retry_in
                }
            };
        }

        tracing::info!(last_block = self.last_block, "Event poller stopped");
    }

    /// Fetch and dispatch events mined since the last poll.
    ///
    /// On error nothing is dispatched and the window is retried whole on the
    /// next call.
    pub async fn poll_events(&mut self) -> BlockchainResult<usize> {
        let head = self.client.get_block_number().await?;
        if head <= self.last_block {
            return Ok(0);
        }

        let filter = Filter::new()
            .address(self.contract_address)
            .from_block(self.last_block + 1)
            .to_block(head)
            .event_signature(self.variant.event_signature());

        let logs = self.client.get_logs(&filter).await?;

        let mut dispatched = 0;
        for log in &logs {
            if let Some(interaction) = self.variant.decode_event(log) {
                tracing::info!(
                    submitter = %interaction.submitter,
                    block = log.block_number.unwrap_or_default(),
                    "New interaction"
                );
                self.registry.dispatch(&interaction);
                dispatched += 1;
            }
        }
        metrics::record_interactions_received("live", dispatched);

        self.last_block = head;
        Ok(dispatched)
    }

    async fn stop_if_idle(&self) -> bool {
        let mut running = self.running.lock().await;
        if self.registry.is_empty() {
            *running = false;
            true
        } else {
            false
        }
    }
}
