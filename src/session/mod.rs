//! Wallet session and interaction lifecycle.
//!
//! # Data Flow
//! ```text
//! WalletProvider (injected)
//!     → controller.rs detect/request account, check network
//!     → state.rs (WalletSession, Idle/Pending submission state)
//!
//! InteractionContract (injected)
//!     → bulk history read  → log.rs replace
//!     → live subscription  → log.rs append
//!     → submit             → state.rs Pending guard
//! ```

pub mod controller;
pub mod log;
pub mod provider;
pub mod state;
pub mod types;

pub use controller::SessionController;
pub use log::{Interaction, InteractionLog, SharedLog};
pub use provider::WalletProvider;
pub use state::{SubmissionState, SubmissionTracker, WalletSession};
pub use types::{PortalError, PortalResult};
