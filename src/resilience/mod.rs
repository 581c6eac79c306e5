//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Live event poll fails:
//!     → backoff.rs (exponential delay with jitter before the next poll)
//! ```
//!
//! # Design Decisions
//! - Timeouts live in the RPC client; every external call has a deadline
//! - Poll failures back off instead of hammering a struggling endpoint
//! - Submissions are never retried automatically

pub mod backoff;

pub use backoff::Backoff;
