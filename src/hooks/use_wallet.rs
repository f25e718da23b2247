use dioxus::prelude::*;
use futures::StreamExt;

use crate::storage::{self, WalletSnapshot};
use crate::wallet::{self, Account};
use crate::{ChainManager, WalletState, APP_NAME};

#[derive(Clone)]
pub enum WalletAction {
    Connect,
    Disconnect,
    Select(Account),
}

#[derive(Clone, Copy)]
pub struct UseWallet {
    pub state: Signal<WalletState>,
    actions: Coroutine<WalletAction>,
}

impl UseWallet {
    pub fn connect(&self) {
        self.actions.send(WalletAction::Connect);
    }

    pub fn disconnect(&self) {
        self.actions.send(WalletAction::Disconnect);
    }

    pub fn select(&self, account: Account) {
        self.actions.send(WalletAction::Select(account));
    }
}

/// Wallet lifecycle. Connection runs in a coroutine so a popup the user
/// leaves open for a while cannot outlive the component that asked for it.
pub fn use_wallet() -> UseWallet {
    let mut state = use_context::<Signal<WalletState>>();
    let manager = use_context::<ChainManager>();

    let actions = use_coroutine(move |mut rx: UnboundedReceiver<WalletAction>| {
        let manager = manager.clone();
        async move {
            while let Some(action) = rx.next().await {
                match action {
                    WalletAction::Connect => {
                        {
                            let mut w = state.write();
                            w.connecting = true;
                            w.error = None;
                        }
                        match wallet::connect_wallet(APP_NAME).await {
                            Ok(accounts) => {
                                // Prefer the address from the previous visit
                                // when it is still present.
                                let remembered = storage::load_wallet().selected_address;
                                let selected = remembered
                                    .and_then(|addr| {
                                        accounts.iter().find(|a| a.address == addr).cloned()
                                    })
                                    .or_else(|| accounts.first().cloned());

                                storage::save_wallet(&WalletSnapshot {
                                    selected_address: selected
                                        .as_ref()
                                        .map(|a| a.address.clone()),
                                });
                                let mut w = state.write();
                                w.connected = true;
                                w.connecting = false;
                                w.accounts = accounts;
                                w.selected = selected;
                            }
                            Err(e) => {
                                tracing::error!("wallet connection failed: {}", e);
                                let mut w = state.write();
                                w.connecting = false;
                                w.error = Some(e.to_string());
                            }
                        }
                    }
                    WalletAction::Select(account) => {
                        let known = state
                            .read()
                            .accounts
                            .iter()
                            .any(|a| a.address == account.address);
                        if known {
                            storage::save_wallet(&WalletSnapshot {
                                selected_address: Some(account.address.clone()),
                            });
                            state.write().selected = Some(account);
                        }
                    }
                    WalletAction::Disconnect => {
                        wallet::disconnect_wallet();
                        manager.disconnect();
                        storage::save_wallet(&WalletSnapshot::default());
                        *state.write() = WalletState::default();
                    }
                }
            }
        }
    });

    UseWallet { state, actions }
}
