//! Session error taxonomy.

use thiserror::Error;

use crate::blockchain::{BlockchainError, ChainId};

/// Errors returned by the session controller.
///
/// Every variant is logged where it originates; the caller decides what, if
/// anything, the user sees.
#[derive(Debug, Error)]
pub enum PortalError {
    /// No wallet provider is present in the host.
    #[error("no wallet provider available; install or configure a wallet first")]
    CapabilityUnavailable,

    /// The wallet is on a different network than the portal requires.
    #[error("wrong network: connect to chain {expected} (wallet is on {actual})")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    /// The wallet refused to reveal an account.
    #[error("authorization rejected: {0}")]
    AuthorizationRejected(String),

    /// A submission needs a connected account.
    #[error("no connected account")]
    NotConnected,

    /// Another submission is still awaiting confirmation.
    #[error("a submission is already pending")]
    SubmissionPending,

    /// The write call was rejected, reverted, or lost.
    #[error("submission failed: {0}")]
    SubmissionFailed(#[source] BlockchainError),

    /// A read from the wallet or the contract failed.
    #[error("read failed: {0}")]
    ReadFailed(#[source] BlockchainError),
}

/// Result type for session operations.
pub type PortalResult<T> = Result<T, PortalError>;

impl PortalError {
    /// Errors the user should see as a notice rather than a failure.
    pub fn needs_user_notice(&self) -> bool {
        matches!(
            self,
            PortalError::CapabilityUnavailable | PortalError::WrongNetwork { .. }
        )
    }
}
