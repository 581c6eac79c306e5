//! Poke Portal client library.
//!
//! Connects a wallet, sends pokes (or waves) to a portal contract, and keeps
//! a local log of past interactions fed by bulk reads and live events.

pub mod blockchain;
pub mod config;
pub mod contract;
pub mod events;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod session;

pub use config::schema::PortalConfig;
pub use contract::{ChainContract, InteractionContract};
pub use session::{Interaction, PortalError, SessionController, WalletProvider};
