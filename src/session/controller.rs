//! Session & interaction controller.
//!
//! # Responsibilities
//! - Discover or request a wallet account
//! - Refuse to act on the wrong network
//! - Submit one interaction at a time and track its pending state
//! - Keep the interaction log current from bulk reads and live events
//!
//! # Design Decisions
//! - Every operation returns a typed result; errors are logged where they
//!   occur and the caller decides what the user sees
//! - A confirmed submission does not append to the log; the live event does
//! - The live subscription is a guard owned by the controller, so dropping or
//!   re-subscribing always releases the previous listener

use alloy::primitives::Address;
use futures_util::TryStreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

use crate::blockchain::{ChainId, SubmissionReceipt};
use crate::contract::{history, InteractionContract};
use crate::events::Subscription;
use crate::observability::metrics;
use crate::session::log::{Interaction, SharedLog};
use crate::session::provider::WalletProvider;
use crate::session::state::{SubmissionState, SubmissionTracker, WalletSession};
use crate::session::types::{PortalError, PortalResult};

/// Mediates between a wallet provider, the portal contract, and display state.
pub struct SessionController<W, C> {
    wallet: Option<W>,
    contract: C,
    required_chain: ChainId,
    session: Mutex<WalletSession>,
    log: Arc<SharedLog>,
    submission: SubmissionTracker,
    subscription: Mutex<Option<Subscription<Interaction>>>,
}

impl<W, C> SessionController<W, C>
where
    W: WalletProvider,
    C: InteractionContract,
{
    /// Create a controller. `wallet` is `None` when the host has no wallet.
    pub fn new(required_chain: ChainId, wallet: Option<W>, contract: C) -> Self {
        Self {
            wallet,
            contract,
            required_chain,
            session: Mutex::new(WalletSession::default()),
            log: Arc::new(SharedLog::new()),
            submission: SubmissionTracker::new(),
            subscription: Mutex::new(None),
        }
    }

    /// Pick up an account the wallet has already authorized.
    ///
    /// Returns the account, or `None` if the wallet has not authorized one.
    /// When an account is found the interaction log is refreshed; a failed
    /// refresh is logged and does not undo the session.
    pub async fn detect_existing_session(&self) -> PortalResult<Option<Address>> {
        let wallet = self.wallet()?;

        let accounts = wallet.get_authorized_accounts().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to query authorized accounts");
            PortalError::ReadFailed(e)
        })?;

        let Some(&address) = accounts.first() else {
            tracing::info!("No authorized account, connect the wallet first");
            return Ok(None);
        };

        let network = match wallet.get_chain_id().await {
            Ok(chain) => Some(chain),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read wallet network");
                None
            }
        };

        tracing::info!(address = %address, network = ?network, "Wallet connected");
        *self.lock_session() = WalletSession {
            address: Some(address),
            network,
        };

        if let Err(e) = self.refresh_interaction_log().await {
            tracing::warn!(error = %e, "Session detected but history refresh failed");
        }
        Ok(Some(address))
    }

    /// Ask the wallet to authorize an account.
    ///
    /// Never prompts unless the wallet is on the required network.
    pub async fn request_connection(&self) -> PortalResult<Address> {
        let wallet = self.wallet()?;
        let chain = self.check_network(wallet).await?;

        let accounts = wallet.request_accounts().await.map_err(|e| {
            tracing::warn!(error = %e, "Account request failed");
            PortalError::AuthorizationRejected(e.to_string())
        })?;

        let Some(&address) = accounts.first() else {
            tracing::warn!("Wallet granted no accounts");
            return Err(PortalError::AuthorizationRejected("no accounts granted".to_string()));
        };

        *self.lock_session() = WalletSession {
            address: Some(address),
            network: Some(chain),
        };
        tracing::info!(address = %address, "Connected");
        Ok(address)
    }

    /// Send one interaction and wait for it to be confirmed.
    ///
    /// The submission state is Pending for exactly the duration of the write
    /// call. The log is not touched here; the new entry arrives through the
    /// live subscription.
    pub async fn submit_interaction(&self, message: Option<String>) -> PortalResult<SubmissionReceipt> {
        let wallet = self.wallet()?;
        if self.session().address.is_none() {
            tracing::warn!("Submission attempted without a connected account");
            return Err(PortalError::NotConnected);
        }

        let chain = self.check_network(wallet).await?;
        let session = {
            let mut session = self.lock_session();
            session.network = Some(chain);
            *session
        };
        let Some(address) = session.ready_address(self.required_chain) else {
            tracing::warn!("Account disconnected while checking the network");
            return Err(PortalError::NotConnected);
        };

        let Some(_pending) = self.submission.try_begin() else {
            tracing::warn!("Submission already pending");
            return Err(PortalError::SubmissionPending);
        };

        tracing::info!(from = %address, has_message = message.is_some(), "Submitting interaction");
        match self.contract.submit(message).await {
            Ok(receipt) => {
                metrics::record_submission("confirmed");
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(error = %e, "Submission failed");
                metrics::record_submission("failed");
                Err(PortalError::SubmissionFailed(e))
            }
        }
    }

    /// Replace the log with the contract's full history.
    ///
    /// On failure the existing log is left untouched. Returns the new length.
    pub async fn refresh_interaction_log(&self) -> PortalResult<usize> {
        let entries: Vec<Interaction> = history::stream(&self.contract)
            .try_collect()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to read interaction history");
                PortalError::ReadFailed(e)
            })?;

        let count = entries.len();
        metrics::record_interactions_received("history", count);
        self.log.replace(entries);
        tracing::debug!(count, "Interaction log refreshed");
        Ok(count)
    }

    /// Start appending live interaction events to the log.
    ///
    /// Any previous subscription is released first, so repeated calls never
    /// stack listeners. Events emitted after this returns are all delivered.
    pub async fn subscribe_to_new_interactions(&self) -> PortalResult<()> {
        if self.lock_subscription().take().is_some() {
            tracing::debug!("Released previous interaction subscription");
        }

        let log = Arc::clone(&self.log);
        let subscription = self
            .contract
            .subscribe(Box::new(move |interaction: &Interaction| {
                log.append(interaction.clone());
            }))
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Failed to subscribe to interaction events");
                PortalError::ReadFailed(e)
            })?;

        // A concurrent call may have landed meanwhile; keep only the newest.
        let replaced = self.lock_subscription().replace(subscription);
        drop(replaced);
        Ok(())
    }

    /// Release the live subscription.
    pub fn shutdown(&self) {
        if self.lock_subscription().take().is_some() {
            tracing::debug!("Interaction subscription released");
        }
    }

    /// Current wallet session.
    pub fn session(&self) -> WalletSession {
        *self.lock_session()
    }

    /// Network submissions are allowed on.
    pub fn required_chain(&self) -> ChainId {
        self.required_chain
    }

    /// Current submission state.
    pub fn submission_state(&self) -> SubmissionState {
        self.submission.state()
    }

    /// Subscribe to submission state changes (e.g. to disable a button).
    pub fn watch_submission(&self) -> watch::Receiver<SubmissionState> {
        self.submission.watch()
    }

    /// Number of submission state transitions so far.
    pub fn submission_transitions(&self) -> u64 {
        self.submission.transitions()
    }

    /// Interactions for display, newest first.
    pub fn interactions(&self) -> Vec<Interaction> {
        self.log.newest_first()
    }

    /// Interactions in insertion order.
    pub fn log_entries(&self) -> Vec<Interaction> {
        self.log.entries()
    }

    /// Interactions appended after the first `offset`.
    pub fn log_entries_since(&self, offset: usize) -> Vec<Interaction> {
        self.log.entries_since(offset)
    }

    /// Subscribe to log mutations.
    pub fn watch_log(&self) -> watch::Receiver<u64> {
        self.log.watch()
    }

    /// Whether a live subscription is held.
    pub fn is_subscribed(&self) -> bool {
        self.lock_subscription().is_some()
    }

    /// The contract adapter.
    pub fn contract(&self) -> &C {
        &self.contract
    }

    fn wallet(&self) -> PortalResult<&W> {
        self.wallet.as_ref().ok_or_else(|| {
            tracing::warn!("No wallet provider available");
            PortalError::CapabilityUnavailable
        })
    }

    async fn check_network(&self, wallet: &W) -> PortalResult<ChainId> {
        let chain = wallet.get_chain_id().await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to read wallet network");
            PortalError::ReadFailed(e)
        })?;

        if chain != self.required_chain {
            tracing::warn!(
                expected = %self.required_chain,
                actual = %chain,
                "Wallet is on the wrong network"
            );
            return Err(PortalError::WrongNetwork {
                expected: self.required_chain,
                actual: chain,
            });
        }
        Ok(chain)
    }

    fn lock_session(&self) -> MutexGuard<'_, WalletSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<Subscription<Interaction>>> {
        self.subscription.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W, C> std::fmt::Debug for SessionController<W, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("required_chain", &self.required_chain)
            .field("has_wallet", &self.wallet.is_some())
            .field("log_len", &self.log.len())
            .field("submission", &self.submission.state())
            .finish()
    }
}
