//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Contract adapter dropped → Trigger → Event poller exits
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → CLI stops watching → controller releases subscription
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_shutdown_signal;
