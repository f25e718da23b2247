#![allow(non_snake_case)]

mod chain;
mod components;
mod data;
mod hooks;
mod pages;
mod route;
mod session;
mod storage;
mod time;
mod wallet;

use std::rc::Rc;

use dioxus::prelude::*;

use chain::connection::ConnectionManager;
use chain::rpc::HttpTransport;
use data::Project;
use route::Route;
use session::SpinSession;
use wallet::Account;

// Configuration
pub const APP_NAME: &str = "Polkadot Discovery Roulette";
pub const COOLDOWN_SECONDS: u64 = 10;

/// Upper bound (exclusive) for locally generated fallback seeds.
pub const FALLBACK_SEED_RANGE: u64 = 2_000_000;

/// Paseo relay chain RPC endpoints in priority order. The first slot can be
/// overridden at build time with `ROULETTE_RPC_URL`.
pub fn rpc_endpoints() -> Vec<String> {
    let defaults = [
        "https://paseo-rpc.dwellir.com",
        "https://paseo.rpc.amforc.com",
        "https://rpc.ibp.network/paseo",
        "https://paseo.dotters.network",
    ];

    let mut endpoints: Vec<String> = Vec::new();
    if let Some(custom) = option_env!("ROULETTE_RPC_URL") {
        endpoints.push(custom.to_string());
    }
    for url in defaults {
        if !endpoints.iter().any(|e| e == url) {
            endpoints.push(url.to_string());
        }
    }
    endpoints
}

pub type ChainManager = Rc<ConnectionManager<HttpTransport>>;

fn main() {
    #[cfg(feature = "web")]
    {
        tracing_wasm::set_as_global_default();
        dioxus::launch(App);
    }

    #[cfg(all(feature = "desktop", not(feature = "web")))]
    {
        dioxus::launch(App);
    }
}

#[component]
fn App() -> Element {
    // Global state providers
    use_context_provider(|| Signal::new(WalletState::default()));
    use_context_provider(|| Signal::new(RouletteState::default()));
    use_context_provider::<ChainManager>(|| {
        Rc::new(ConnectionManager::new(HttpTransport::new(), rpc_endpoints()))
    });

    rsx! {
        Router::<Route> {}
    }
}

// Global state types
#[derive(Clone, Debug, Default)]
pub struct WalletState {
    pub connected: bool,
    pub connecting: bool,
    pub accounts: Vec<Account>,
    pub selected: Option<Account>,
    pub error: Option<String>,
}

#[derive(Clone, Debug)]
pub struct RouletteState {
    pub session: SpinSession,
    pub current: Option<Project>,
    pub is_spinning: bool,
    pub can_spin: bool,
    pub cooldown_remaining: u64,
    pub all_discovered: bool,
    /// Fatal spin error, auto-dismissed after a few seconds.
    pub error: Option<String>,
    /// Bumped on every new error so a pending auto-dismiss timer cannot
    /// clear a later error that happens to carry the same text.
    pub error_seq: u64,
    /// Non-fatal notice from the detached on-chain recording task.
    pub advisory: Option<String>,
    pub last_tx_hash: Option<String>,
    /// Bumped on reset so stale background tasks stop writing.
    pub spin_generation: u64,
    /// User-added projects, kept for the process lifetime.
    pub custom_projects: Vec<Project>,
}

impl Default for RouletteState {
    fn default() -> Self {
        Self {
            session: SpinSession::default(),
            current: None,
            is_spinning: false,
            can_spin: true,
            cooldown_remaining: 0,
            all_discovered: false,
            error: None,
            error_seq: 0,
            advisory: None,
            last_tx_hash: None,
            spin_generation: 0,
            custom_projects: Vec::new(),
        }
    }
}

impl RouletteState {
    /// Built-in catalog followed by user-added entries, in insertion order.
    pub fn effective_catalog(&self) -> Vec<Project> {
        let mut catalog = data::built_in_projects();
        catalog.extend(self.custom_projects.iter().cloned());
        catalog
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
        self.error_seq += 1;
    }

    /// Apply the detached recording task's result. The task snapshots the
    /// generation when its spin starts; a reset in the meantime bumps it,
    /// and a stale outcome is then dropped entirely. Failures only ever
    /// produce an advisory, never touch the spin result.
    pub fn apply_recording_outcome(&mut self, generation: u64, outcome: Result<String, String>) {
        if self.spin_generation != generation {
            return;
        }
        match outcome {
            Ok(tx_hash) => self.last_tx_hash = Some(tx_hash),
            Err(e) => {
                self.advisory = Some(format!(
                    "Spin saved locally, but recording it on-chain failed: {e}"
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::submit::TxError;

    fn state_after_one_spin() -> RouletteState {
        let mut state = RouletteState::default();
        let catalog = state.effective_catalog();
        state.session.discovered.push(catalog[0].id.clone());
        state.session.last_spin_ms = 1_700_000_000_000;
        state.current = Some(catalog[0].clone());
        state
    }

    #[test]
    fn rejected_signature_leaves_spin_result_intact() {
        let mut state = state_after_one_spin();
        let generation = state.spin_generation;

        state.apply_recording_outcome(generation, Err(TxError::UserRejected.to_string()));

        // Discovery and current project survive; only an advisory appears.
        assert_eq!(state.session.discovered.len(), 1);
        assert!(state.current.is_some());
        assert!(state.last_tx_hash.is_none());
        assert!(state.error.is_none());
        let advisory = state.advisory.unwrap();
        assert!(advisory.contains("rejected"), "got: {advisory}");
    }

    #[test]
    fn recording_success_records_the_hash() {
        let mut state = state_after_one_spin();
        let generation = state.spin_generation;

        state.apply_recording_outcome(generation, Ok("0xabc123".to_string()));

        assert_eq!(state.last_tx_hash.as_deref(), Some("0xabc123"));
        assert!(state.advisory.is_none());
    }

    #[test]
    fn stale_generation_suppresses_both_outcomes() {
        let mut state = state_after_one_spin();
        let generation = state.spin_generation;
        state.spin_generation += 1; // session reset since the spin started

        state.apply_recording_outcome(generation, Ok("0xabc123".to_string()));
        state.apply_recording_outcome(generation, Err("connection refused".to_string()));

        assert!(state.last_tx_hash.is_none());
        assert!(state.advisory.is_none());
    }

    #[test]
    fn error_sequence_distinguishes_identical_messages() {
        let mut state = RouletteState::default();
        state.set_error("Please wait 5 seconds before spinning again");
        let first_seq = state.error_seq;

        // Same text again is still a new error occurrence.
        state.set_error("Please wait 5 seconds before spinning again");
        assert_ne!(state.error_seq, first_seq);
        assert!(state.error.is_some());
    }
}
