//! Interaction records and the locally cached log.

use alloy::primitives::Address;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::watch;

use crate::observability::metrics;

/// One poke (or wave) recorded on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    /// Account that sent it.
    pub submitter: Address,
    /// When the contract recorded it.
    pub occurred_at: SystemTime,
    /// Attached message, absent when empty.
    pub message: Option<String>,
}

impl Interaction {
    /// Build from the contract's representation: Unix seconds and a possibly
    /// empty message.
    pub fn from_chain(submitter: Address, timestamp_secs: u64, message: String) -> Self {
        let millis = timestamp_secs.saturating_mul(1000);
        Self {
            submitter,
            occurred_at: UNIX_EPOCH + Duration::from_millis(millis),
            message: if message.is_empty() { None } else { Some(message) },
        }
    }

    /// Timestamp in milliseconds since the Unix epoch.
    pub fn unix_millis(&self) -> u128 {
        self.occurred_at
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis()
    }
}

/// Insertion-ordered interactions.
///
/// Only ever replaced wholesale or appended to.
#[derive(Debug, Clone, Default)]
pub struct InteractionLog {
    entries: Vec<Interaction>,
}

impl InteractionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole log after a bulk read.
    pub fn replace(&mut self, entries: Vec<Interaction>) {
        self.entries = entries;
    }

    /// Append one live interaction.
    pub fn append(&mut self, interaction: Interaction) {
        self.entries.push(interaction);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[Interaction] {
        &self.entries
    }

    /// Entries sorted for display, newest first.
    pub fn newest_first(&self) -> Vec<Interaction> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        sorted
    }
}

/// Log shared between the bulk-refresh path and live listeners.
///
/// Every mutation bumps a revision published on a watch channel.
#[derive(Debug)]
pub struct SharedLog {
    log: Mutex<InteractionLog>,
    revision: watch::Sender<u64>,
}

impl SharedLog {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            log: Mutex::new(InteractionLog::new()),
            revision,
        }
    }

    /// Replace the log wholesale.
    pub fn replace(&self, entries: Vec<Interaction>) {
        let len = {
            let mut log = self.lock();
            log.replace(entries);
            log.len()
        };
        metrics::record_log_size(len);
        self.bump();
    }

    /// Append a single entry.
    pub fn append(&self, interaction: Interaction) {
        let len = {
            let mut log = self.lock();
            log.append(interaction);
            log.len()
        };
        metrics::record_log_size(len);
        self.bump();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Copy of the entries in insertion order.
    pub fn entries(&self) -> Vec<Interaction> {
        self.lock().entries().to_vec()
    }

    /// Entries appended after the first `offset`, in insertion order.
    pub fn entries_since(&self, offset: usize) -> Vec<Interaction> {
        self.lock().entries().iter().skip(offset).cloned().collect()
    }

    /// Entries sorted for display, newest first.
    pub fn newest_first(&self) -> Vec<Interaction> {
        self.lock().newest_first()
    }

    /// Subscribe to mutation notifications.
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }

    fn lock(&self) -> MutexGuard<'_, InteractionLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SharedLog {
    fn default() -> Self {
        Self::new()
    }
}
