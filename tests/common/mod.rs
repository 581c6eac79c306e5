//! Shared test doubles for controller integration tests.

#![allow(dead_code)]

pub mod rpc;

use alloy::primitives::{Address, TxHash};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;

use poke_portal::blockchain::{BlockchainError, BlockchainResult, ChainId, SubmissionReceipt};
use poke_portal::contract::{HistoryPage, HistorySource, InteractionContract, PageCursor};
use poke_portal::events::{Listener, ListenerRegistry, Subscription};
use poke_portal::session::{Interaction, SessionController, SubmissionState, WalletProvider};

/// Network the portal requires in tests.
pub const REQUIRED_CHAIN: ChainId = ChainId(4);

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn poke(byte: u8, secs: u64, message: &str) -> Interaction {
    Interaction::from_chain(addr(byte), secs, message.to_string())
}

#[derive(Default)]
struct WalletState {
    authorized: Mutex<Vec<Address>>,
    grantable: Mutex<Vec<Address>>,
    chain: Mutex<Option<ChainId>>,
    fail_accounts: AtomicBool,
    reject_request: AtomicBool,
    prompts: AtomicUsize,
}

/// Scriptable wallet provider.
#[derive(Clone, Default)]
pub struct MockWallet {
    state: Arc<WalletState>,
}

impl MockWallet {
    /// A wallet on `chain` with `authorized` accounts already revealed.
    pub fn new(chain: ChainId, authorized: Vec<Address>) -> Self {
        let wallet = Self::default();
        *wallet.state.chain.lock().unwrap() = Some(chain);
        *wallet.state.authorized.lock().unwrap() = authorized;
        wallet
    }

    /// Accounts the user will grant when prompted.
    pub fn grants(self, accounts: Vec<Address>) -> Self {
        *self.state.grantable.lock().unwrap() = accounts;
        self
    }

    pub fn set_chain(&self, chain: ChainId) {
        *self.state.chain.lock().unwrap() = Some(chain);
    }

    pub fn fail_account_queries(&self) {
        self.state.fail_accounts.store(true, Ordering::SeqCst);
    }

    pub fn reject_requests(&self) {
        self.state.reject_request.store(true, Ordering::SeqCst);
    }

    /// How many authorization prompts were shown.
    pub fn prompts(&self) -> usize {
        self.state.prompts.load(Ordering::SeqCst)
    }
}

impl WalletProvider for MockWallet {
    async fn get_authorized_accounts(&self) -> BlockchainResult<Vec<Address>> {
        if self.state.fail_accounts.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rpc("provider unavailable".into()));
        }
        Ok(self.state.authorized.lock().unwrap().clone())
    }

    async fn request_accounts(&self) -> BlockchainResult<Vec<Address>> {
        self.state.prompts.fetch_add(1, Ordering::SeqCst);
        if self.state.reject_request.load(Ordering::SeqCst) {
            return Err(BlockchainError::Rejected("user rejected the request".into()));
        }
        let granted = self.state.grantable.lock().unwrap().clone();
        *self.state.authorized.lock().unwrap() = granted.clone();
        Ok(granted)
    }

    async fn get_chain_id(&self) -> BlockchainResult<ChainId> {
        self.state
            .chain
            .lock()
            .unwrap()
            .ok_or_else(|| BlockchainError::Rpc("no network".into()))
    }
}

#[derive(Default)]
struct ContractState {
    history: Mutex<Vec<Interaction>>,
    page_size: Mutex<Option<usize>>,
    fail_history: AtomicBool,
    fail_submit: AtomicBool,
    submit_delay: Mutex<Option<Duration>>,
    fetches: AtomicUsize,
    submits: AtomicUsize,
    observer: Mutex<Option<watch::Receiver<SubmissionState>>>,
    observed: Mutex<Vec<SubmissionState>>,
}

/// Scriptable portal contract.
#[derive(Clone, Default)]
pub struct MockContract {
    state: Arc<ContractState>,
    registry: ListenerRegistry<Interaction>,
}

impl MockContract {
    pub fn with_history(history: Vec<Interaction>) -> Self {
        let contract = Self::default();
        *contract.state.history.lock().unwrap() = history;
        contract
    }

    /// Serve history in pages of `size`.
    pub fn paged(self, size: usize) -> Self {
        *self.state.page_size.lock().unwrap() = Some(size);
        self
    }

    pub fn fail_history(&self, fail: bool) {
        self.state.fail_history.store(fail, Ordering::SeqCst);
    }

    pub fn fail_submit(&self, fail: bool) {
        self.state.fail_submit.store(fail, Ordering::SeqCst);
    }

    /// Hold each submission open for `delay` before settling.
    pub fn delay_submit(&self, delay: Duration) {
        *self.state.submit_delay.lock().unwrap() = Some(delay);
    }

    /// Record the controller's submission state whenever `submit` runs.
    pub fn observe(&self, rx: watch::Receiver<SubmissionState>) {
        *self.state.observer.lock().unwrap() = Some(rx);
    }

    pub fn observed_states(&self) -> Vec<SubmissionState> {
        self.state.observed.lock().unwrap().clone()
    }

    /// Number of history pages fetched.
    pub fn fetches(&self) -> usize {
        self.state.fetches.load(Ordering::SeqCst)
    }

    pub fn submits(&self) -> usize {
        self.state.submits.load(Ordering::SeqCst)
    }

    /// Deliver a live event to every subscribed listener.
    pub fn emit(&self, interaction: Interaction) -> usize {
        self.registry.dispatch(&interaction)
    }

    pub fn live_listeners(&self) -> usize {
        self.registry.len()
    }
}

impl HistorySource for MockContract {
    async fn fetch_page(&self, cursor: Option<PageCursor>) -> BlockchainResult<HistoryPage> {
        self.state.fetches.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_history.load(Ordering::SeqCst) {
            return Err(BlockchainError::Contract("getAllPokes reverted".into()));
        }

        let history = self.state.history.lock().unwrap().clone();
        let page_size = self.state.page_size.lock().unwrap().unwrap_or(history.len().max(1));
        let start = cursor.map(|c| c.0 as usize).unwrap_or(0);
        let end = (start + page_size).min(history.len());

        Ok(HistoryPage {
            items: history[start.min(end)..end].to_vec(),
            next: (end < history.len()).then(|| PageCursor(end as u64)),
        })
    }
}

impl InteractionContract for MockContract {
    async fn submit(&self, _message: Option<String>) -> BlockchainResult<SubmissionReceipt> {
        self.state.submits.fetch_add(1, Ordering::SeqCst);

        let observed = self
            .state
            .observer
            .lock()
            .unwrap()
            .as_ref()
            .map(|rx| *rx.borrow());
        if let Some(state) = observed {
            self.state.observed.lock().unwrap().push(state);
        }

        let delay = *self.state.submit_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.state.fail_submit.load(Ordering::SeqCst) {
            return Err(BlockchainError::Reverted("execution reverted".into()));
        }
        Ok(SubmissionReceipt {
            tx_hash: TxHash::repeat_byte(0x11),
            block_number: 42,
        })
    }

    async fn subscribe(&self, listener: Listener<Interaction>) -> BlockchainResult<Subscription<Interaction>> {
        Ok(self.registry.subscribe(listener))
    }
}

pub type TestController = SessionController<MockWallet, MockContract>;

/// Controller on the required chain with `authorized` accounts revealed.
pub fn controller(authorized: Vec<Address>, contract: MockContract) -> (TestController, MockWallet) {
    let wallet = MockWallet::new(REQUIRED_CHAIN, authorized);
    let controller = SessionController::new(REQUIRED_CHAIN, Some(wallet.clone()), contract);
    (controller, wallet)
}
