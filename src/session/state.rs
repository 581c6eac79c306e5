//! Wallet session and pending-submission state.
//!
//! # States
//! - Idle: the submit control is enabled
//! - Pending: one write call is in flight
//!
//! # State Transitions
//! ```text
//! Idle → Pending: submission starts
//! Pending → Idle: confirmation observed, or any error
//! ```
//!
//! # Design Decisions
//! - The Pending state is held by a guard; dropping the guard returns to Idle
//!   on every exit path, including cancellation of the submitting future
//! - State is published on a watch channel so a UI can disable its control

use alloy::primitives::Address;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::blockchain::ChainId;

/// The connected wallet account, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WalletSession {
    /// The connected account.
    pub address: Option<Address>,
    /// Network the wallet last reported.
    pub network: Option<ChainId>,
}

impl WalletSession {
    /// The account to submit from, if connected and last seen on `required`.
    pub fn ready_address(&self, required: ChainId) -> Option<Address> {
        self.address.filter(|_| self.network == Some(required))
    }
}

/// Lifecycle of a single submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    Pending,
}

/// Tracks the submission state machine.
#[derive(Debug)]
pub struct SubmissionTracker {
    tx: watch::Sender<SubmissionState>,
    transitions: AtomicU64,
}

impl SubmissionTracker {
    /// Create a tracker in the Idle state.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SubmissionState::Idle);
        Self {
            tx,
            transitions: AtomicU64::new(0),
        }
    }

    /// Move Idle → Pending.
    ///
    /// Returns `None` if a submission is already pending.
    pub fn try_begin(&self) -> Option<PendingGuard<'_>> {
        let began = self.tx.send_if_modified(|state| {
            if *state == SubmissionState::Idle {
                *state = SubmissionState::Pending;
                true
            } else {
                false
            }
        });

        if began {
            self.transitions.fetch_add(1, Ordering::SeqCst);
            Some(PendingGuard { tracker: self })
        } else {
            None
        }
    }

    /// Current state.
    pub fn state(&self) -> SubmissionState {
        *self.tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn watch(&self) -> watch::Receiver<SubmissionState> {
        self.tx.subscribe()
    }

    /// Total number of state transitions since creation.
    pub fn transitions(&self) -> u64 {
        self.transitions.load(Ordering::SeqCst)
    }

    fn finish(&self) {
        self.tx.send_replace(SubmissionState::Idle);
        self.transitions.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for SubmissionTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Holds the Pending state; returns to Idle on drop.
#[derive(Debug)]
pub struct PendingGuard<'a> {
    tracker: &'a SubmissionTracker,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.tracker.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_readiness() {
        let mut session = WalletSession::default();
        assert_eq!(session.ready_address(ChainId(4)), None);

        session.address = Some(Address::repeat_byte(0xA1));
        assert_eq!(session.ready_address(ChainId(4)), None);

        session.network = Some(ChainId(1));
        assert_eq!(session.ready_address(ChainId(4)), None);

        session.network = Some(ChainId(4));
        assert_eq!(session.ready_address(ChainId(4)), Some(Address::repeat_byte(0xA1)));
    }

    #[test]
    fn test_guard_round_trip() {
        let tracker = SubmissionTracker::new();
        assert_eq!(tracker.state(), SubmissionState::Idle);

        {
            let _guard = tracker.try_begin().unwrap();
            assert_eq!(tracker.state(), SubmissionState::Pending);
            assert!(tracker.try_begin().is_none());
        }

        assert_eq!(tracker.state(), SubmissionState::Idle);
        assert_eq!(tracker.transitions(), 2);
    }

    #[test]
    fn test_rejected_begin_does_not_transition() {
        let tracker = SubmissionTracker::new();
        let guard = tracker.try_begin().unwrap();
        assert!(tracker.try_begin().is_none());
        assert_eq!(tracker.transitions(), 1);
        drop(guard);
        assert_eq!(tracker.transitions(), 2);
    }

    #[tokio::test]
    async fn test_watchers_see_changes() {
        let tracker = SubmissionTracker::new();
        let mut rx = tracker.watch();

        let guard = tracker.try_begin().unwrap();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SubmissionState::Pending);

        drop(guard);
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SubmissionState::Idle);
    }

    #[tokio::test]
    async fn test_cancelled_submission_returns_to_idle() {
        let tracker = SubmissionTracker::new();

        let fut = async {
            let _guard = tracker.try_begin().unwrap();
            std::future::pending::<()>().await;
        };
        let cancelled = tokio::time::timeout(std::time::Duration::from_millis(10), fut).await;

        assert!(cancelled.is_err());
        assert_eq!(tracker.state(), SubmissionState::Idle);
    }
}
