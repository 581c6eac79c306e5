//! Contract bindings for both portal flavours.

use alloy::primitives::{B256, U256};
use alloy::rpc::types::Log;
use alloy::sol;
use alloy::sol_types::SolEvent;

use crate::config::ContractVariant;
use crate::session::Interaction;

sol! {
    #[sol(rpc)]
    contract PokePortal {
        struct Poke {
            address poker;
            string message;
            uint256 timestamp;
        }

        /// Emitted for every poke.
        event NewPoke(address indexed from, uint256 timestamp, string message);

        function poke(string memory _message) public;
        function getAllPokes() public view returns (Poke[] memory);
        function getTotalPokes() public view returns (uint256);
    }
}

sol! {
    #[sol(rpc)]
    contract WavePortal {
        struct Wave {
            address waver;
            string message;
            uint256 timestamp;
        }

        /// Emitted for every wave.
        event NewWave(address indexed from, uint256 timestamp, string message);

        function wave(string memory _message) public;
        function getAllWaves() public view returns (Wave[] memory);
        function getTotalWaves() public view returns (uint256);
    }
}

impl ContractVariant {
    /// Topic0 of the variant's interaction event.
    pub fn event_signature(self) -> B256 {
        match self {
            ContractVariant::Poke => PokePortal::NewPoke::SIGNATURE_HASH,
            ContractVariant::Wave => WavePortal::NewWave::SIGNATURE_HASH,
        }
    }

    /// Solidity name of the variant's interaction event.
    pub fn event_name(self) -> &'static str {
        match self {
            ContractVariant::Poke => "NewPoke",
            ContractVariant::Wave => "NewWave",
        }
    }

    /// Decode an interaction event log. Returns `None` for foreign logs.
    pub fn decode_event(self, log: &Log) -> Option<Interaction> {
        match self {
            ContractVariant::Poke => {
                let event = log.log_decode::<PokePortal::NewPoke>().ok()?.inner.data;
                Some(Interaction::from_chain(event.from, secs(event.timestamp), event.message))
            }
            ContractVariant::Wave => {
                let event = log.log_decode::<WavePortal::NewWave>().ok()?.inner.data;
                Some(Interaction::from_chain(event.from, secs(event.timestamp), event.message))
            }
        }
    }
}

impl From<PokePortal::Poke> for Interaction {
    fn from(poke: PokePortal::Poke) -> Self {
        Interaction::from_chain(poke.poker, secs(poke.timestamp), poke.message)
    }
}

impl From<WavePortal::Wave> for Interaction {
    fn from(wave: WavePortal::Wave) -> Self {
        Interaction::from_chain(wave.waver, secs(wave.timestamp), wave.message)
    }
}

/// Contract timestamps are Unix seconds in a uint256.
fn secs(timestamp: U256) -> u64 {
    u64::try_from(timestamp).unwrap_or(u64::MAX)
}
