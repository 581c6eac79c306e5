//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check the contract address and RPC URLs parse
//! - Validate value ranges (timeouts > 0, gas limit sane)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PortalConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use thiserror::Error;

use crate::config::schema::PortalConfig;

/// Smallest gas limit that can cover a plain call.
const MIN_GAS_LIMIT: u64 = 21_000;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid contract address '{0}'")]
    ContractAddress(String),

    #[error("invalid RPC URL '{0}'")]
    RpcUrl(String),

    #[error("chain_id must be non-zero")]
    ChainId,

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("gas_limit {0} is below the minimum of {MIN_GAS_LIMIT}")]
    GasLimit(u64),

    #[error("retry base_delay_ms {base} exceeds max_delay_ms {max}")]
    RetryDelays { base: u64, max: u64 },

    #[error("unknown log level '{0}'")]
    LogLevel(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
}

/// Validate a parsed configuration, collecting every problem found.
pub fn validate_config(config: &PortalConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.contract.address.parse::<Address>().is_err() {
        errors.push(ValidationError::ContractAddress(config.contract.address.clone()));
    }

    for url in std::iter::once(&config.network.rpc_url).chain(&config.network.failover_urls) {
        if url.parse::<url::Url>().is_err() {
            errors.push(ValidationError::RpcUrl(url.clone()));
        }
    }

    if config.network.chain_id == 0 {
        errors.push(ValidationError::ChainId);
    }
    if config.network.rpc_timeout_secs == 0 {
        errors.push(ValidationError::Zero("network.rpc_timeout_secs"));
    }
    if config.network.confirmation_timeout_secs == 0 {
        errors.push(ValidationError::Zero("network.confirmation_timeout_secs"));
    }
    if config.contract.gas_limit < MIN_GAS_LIMIT {
        errors.push(ValidationError::GasLimit(config.contract.gas_limit));
    }
    if config.contract.page_blocks == 0 {
        errors.push(ValidationError::Zero("contract.page_blocks"));
    }
    if config.contract.poll_interval_ms == 0 {
        errors.push(ValidationError::Zero("contract.poll_interval_ms"));
    }
    if config.retry.base_delay_ms > config.retry.max_delay_ms {
        errors.push(ValidationError::RetryDelays {
            base: config.retry.base_delay_ms,
            max: config.retry.max_delay_ms,
        });
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::LogLevel(config.observability.log_level.clone()));
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<std::net::SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
