//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the portal.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Address of the deployed portal contract the client talks to by default.
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0xcB4e716eDe197649a10a6241a3d3FcC59A20C46a";

/// Chain the default deployment lives on (Rinkeby).
pub const DEFAULT_CHAIN_ID: u64 = 4;

/// Root configuration for the portal client.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PortalConfig {
    /// Network the wallet must be connected to.
    pub network: NetworkConfig,

    /// Deployed contract and how to read it.
    pub contract: ContractConfig,

    /// Local signer settings.
    pub wallet: WalletConfig,

    /// Backoff for the live event poller.
    pub retry: RetryConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Blockchain network configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// The single chain ID submissions are allowed on.
    pub chain_id: u64,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Number of block confirmations before a submission counts as settled.
    pub confirmation_blocks: u32,

    /// Maximum time to wait for those confirmations, in seconds.
    pub confirmation_timeout_secs: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            chain_id: DEFAULT_CHAIN_ID,
            rpc_timeout_secs: 10,
            confirmation_blocks: 1,
            confirmation_timeout_secs: 300,
        }
    }
}

/// Which flavour of portal contract is deployed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContractVariant {
    /// `poke(string)`, `getAllPokes()`, `NewPoke`.
    #[default]
    Poke,
    /// `wave(string)`, `getAllWaves()`, `NewWave`.
    Wave,
}

/// How the interaction history is read from chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum HistoryMode {
    /// One `getAll*` view call returning the whole history.
    #[default]
    Snapshot,
    /// Paged `eth_getLogs` windows over the contract's event.
    EventLog,
}

/// Portal contract configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Deployed contract address (hex).
    pub address: String,

    /// Contract flavour.
    pub variant: ContractVariant,

    /// Gas limit hint attached to every submission.
    pub gas_limit: u64,

    /// History read strategy.
    pub history_mode: HistoryMode,

    /// Block window per page in `event_log` mode.
    pub page_blocks: u64,

    /// First block to scan in `event_log` mode.
    pub deploy_block: u64,

    /// Live event polling interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_CONTRACT_ADDRESS.to_string(),
            variant: ContractVariant::Poke,
            gas_limit: 300_000,
            history_mode: HistoryMode::Snapshot,
            page_blocks: 5_000,
            deploy_block: 0,
            poll_interval_ms: 4_000,
        }
    }
}

/// Local signer configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Environment variable holding the hex private key.
    pub key_env: String,

    /// Treat a loaded key as already authorized for this portal.
    pub auto_connect: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            key_env: "PORTAL_PRIVATE_KEY".to_string(),
            auto_connect: true,
        }
    }
}

/// Backoff configuration for the event poller.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
