//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PortalConfig (validated, immutable)
//!     → handed to the chain adapters and controller at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the contract address is fixed per deployment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::PortalConfig;
pub use schema::NetworkConfig;
pub use schema::ContractConfig;
pub use schema::ContractVariant;
pub use schema::HistoryMode;
pub use schema::ObservabilityConfig;
pub use schema::RetryConfig;
pub use schema::WalletConfig;
