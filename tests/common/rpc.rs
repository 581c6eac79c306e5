//! In-process JSON-RPC endpoint backed by a scriptable chain.

use alloy::primitives::{Address, LogData};
use alloy::rpc::types::Log;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use poke_portal::config::schema::DEFAULT_CONTRACT_ADDRESS;

#[derive(Default)]
struct ChainState {
    head: u64,
    logs: Vec<Log>,
    failures_left: usize,
    polls: usize,
    log_ranges: Vec<(u64, u64)>,
}

/// A chain that only moves when a test mines a block.
#[derive(Clone, Default)]
pub struct StubChain {
    state: Arc<Mutex<ChainState>>,
}

impl StubChain {
    /// Serve the chain on a random local port. Returns it with its URL.
    pub async fn start(head: u64) -> (Self, String) {
        let chain = Self::default();
        chain.state.lock().unwrap().head = head;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let app = Router::new()
            .route("/", post(handle_rpc))
            .with_state(chain.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (chain, url)
    }

    /// Mine one block holding `events` from the portal contract.
    pub fn mine(&self, events: Vec<LogData>) -> u64 {
        let contract: Address = DEFAULT_CONTRACT_ADDRESS.parse().unwrap();
        let mut state = self.state.lock().unwrap();
        state.head += 1;
        let block = state.head;

        for (index, data) in events.into_iter().enumerate() {
            state.logs.push(Log {
                inner: alloy::primitives::Log {
                    address: contract,
                    data,
                },
                block_number: Some(block),
                log_index: Some(index as u64),
                ..Default::default()
            });
        }
        block
    }

    /// Answer the next `count` block-number and log queries with an error.
    pub fn fail_next(&self, count: usize) {
        self.state.lock().unwrap().failures_left = count;
    }

    /// Block-number and log queries received so far.
    pub fn polls(&self) -> usize {
        self.state.lock().unwrap().polls
    }

    /// Inclusive block ranges requested through `eth_getLogs`.
    pub fn log_ranges(&self) -> Vec<(u64, u64)> {
        self.state.lock().unwrap().log_ranges.clone()
    }
}

async fn handle_rpc(State(chain): State<StubChain>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let method = request["method"].as_str().unwrap_or_default();
    let mut state = chain.state.lock().unwrap();

    let reply = match method {
        "eth_chainId" => Ok(json!("0x4")),
        "eth_blockNumber" | "eth_getLogs" => {
            state.polls += 1;
            if state.failures_left > 0 {
                state.failures_left -= 1;
                Err("upstream unavailable")
            } else if method == "eth_blockNumber" {
                Ok(json!(format!("{:#x}", state.head)))
            } else {
                let filter = &request["params"][0];
                let (from, to) = (block_param(&filter["fromBlock"]), block_param(&filter["toBlock"]));
                state.log_ranges.push((from, to));

                let logs: Vec<&Log> = state
                    .logs
                    .iter()
                    .filter(|log| (from..=to).contains(&log.block_number.unwrap_or_default()))
                    .collect();
                Ok(serde_json::to_value(logs).unwrap())
            }
        }
        _ => Err("method not supported"),
    };

    Json(match reply {
        Ok(result) => json!({ "jsonrpc": "2.0", "id": id, "result": result }),
        Err(message) => json!({
            "jsonrpc": "2.0",
            "id": id,
            "error": { "code": -32000, "message": message }
        }),
    })
}

fn block_param(value: &Value) -> u64 {
    let hex = value.as_str().unwrap_or("0x0").trim_start_matches("0x");
    u64::from_str_radix(hex, 16).unwrap_or(0)
}
