//! Portal contract integration.
//!
//! # Data Flow
//! ```text
//! submit(message)
//!     → chain.rs (send poke/wave with gas hint)
//!     → blockchain::transaction (wait for confirmation)
//!
//! history()
//!     → chain.rs fetch_page (getAll* snapshot or eth_getLogs window)
//!     → history.rs (lazy, restartable stream of Interaction)
//!
//! subscribe(listener)
//!     → poller.rs (background log polling)
//!     → events::ListenerRegistry (fan-out to live listeners)
//! ```

pub mod abi;
pub mod chain;
pub mod history;
pub mod poller;

use std::future::Future;

use crate::blockchain::{BlockchainResult, SubmissionReceipt};
use crate::events::{Listener, Subscription};
use crate::session::Interaction;

pub use chain::ChainContract;

/// Adapter-defined position in the interaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor(pub u64);

/// One page of interaction history.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    /// Interactions on this page, oldest first.
    pub items: Vec<Interaction>,
    /// Where the next page starts; `None` on the last page.
    pub next: Option<PageCursor>,
}

/// Paged read of historical interactions.
pub trait HistorySource: Send + Sync {
    /// Fetch the page starting at `cursor`, or the first page when `None`.
    fn fetch_page(
        &self,
        cursor: Option<PageCursor>,
    ) -> impl Future<Output = BlockchainResult<HistoryPage>> + Send;
}

/// The external portal contract.
pub trait InteractionContract: HistorySource {
    /// Send one poke/wave and wait until it is confirmed.
    fn submit(
        &self,
        message: Option<String>,
    ) -> impl Future<Output = BlockchainResult<SubmissionReceipt>> + Send;

    /// Register a listener for new interactions.
    ///
    /// Resolves once delivery is live: every event emitted afterwards reaches
    /// the listener until the returned guard is dropped.
    fn subscribe(
        &self,
        listener: Listener<Interaction>,
    ) -> impl Future<Output = BlockchainResult<Subscription<Interaction>>> + Send;
}
