//! Persistence of the spin session and the selected wallet address.
//!
//! Browser builds write browser local storage through `gloo-storage`; native
//! builds keep an in-process map so the hooks and their tests behave the
//! same way everywhere.

use serde::{Deserialize, Serialize};

use crate::session::SpinSession;

const SESSION_KEY: &str = "roulette-session";
const WALLET_KEY: &str = "wallet-session";

/// Only the address survives a reload. Accounts are re-fetched from the
/// extension on the next connect.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WalletSnapshot {
    #[serde(rename = "selectedAddress")]
    pub selected_address: Option<String>,
}

pub fn save_session(session: &SpinSession) {
    platform::set(SESSION_KEY, session);
}

pub fn load_session() -> SpinSession {
    platform::get(SESSION_KEY).unwrap_or_default()
}

pub fn save_wallet(snapshot: &WalletSnapshot) {
    platform::set(WALLET_KEY, snapshot);
}

pub fn load_wallet() -> WalletSnapshot {
    platform::get(WALLET_KEY).unwrap_or_default()
}

#[cfg(target_arch = "wasm32")]
mod platform {
    use gloo_storage::{LocalStorage, Storage};
    use serde::de::DeserializeOwned;
    use serde::Serialize;

    pub fn set<T: Serialize>(key: &str, value: &T) {
        if let Err(e) = LocalStorage::set(key, value) {
            tracing::warn!("failed to persist {}: {}", key, e);
        }
    }

    pub fn get<T: DeserializeOwned>(key: &str) -> Option<T> {
        LocalStorage::get(key).ok()
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod platform {
    use serde::de::DeserializeOwned;
    use serde::Serialize;
    use std::cell::RefCell;
    use std::collections::HashMap;

    thread_local! {
        static STORE: RefCell<HashMap<String, String>> = RefCell::new(HashMap::new());
    }

    pub fn set<T: Serialize>(key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(json) => STORE.with(|s| {
                s.borrow_mut().insert(key.to_string(), json);
            }),
            Err(e) => tracing::warn!("failed to persist {}: {}", key, e),
        }
    }

    pub fn get<T: DeserializeOwned>(key: &str) -> Option<T> {
        STORE
            .with(|s| s.borrow().get(key).cloned())
            .and_then(|json| serde_json::from_str(&json).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_round_trips() {
        let session = SpinSession {
            discovered: vec!["acala".into(), "moonbeam".into()],
            last_spin_ms: 1_700_000_000_000,
        };
        save_session(&session);
        assert_eq!(load_session(), session);
    }

    #[test]
    fn missing_session_loads_as_default() {
        // A different thread gets a fresh store.
        std::thread::spawn(|| {
            assert_eq!(load_session(), SpinSession::default());
            assert_eq!(load_wallet(), WalletSnapshot::default());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn wallet_snapshot_persists_only_the_address() {
        let snapshot = WalletSnapshot {
            selected_address: Some("5Grwva".into()),
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert_eq!(value["selectedAddress"], "5Grwva");

        save_wallet(&snapshot);
        assert_eq!(load_wallet(), snapshot);
    }
}
