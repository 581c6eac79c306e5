//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Controller, chain adapters, event poller produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → stderr (pretty or JSON)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Structured fields instead of formatted strings
//! - Metrics are cheap no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
