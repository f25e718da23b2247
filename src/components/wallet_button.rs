use dioxus::prelude::*;

use crate::hooks::use_wallet;
use crate::wallet::is_extension_available;

#[component]
pub fn WalletButton() -> Element {
    let wallet = use_wallet();
    let mut show_accounts = use_signal(|| false);

    let state = wallet.state.read();

    if state.connecting {
        return rsx! {
            button { class: "btn btn-secondary", disabled: true, "Connecting..." }
        };
    }

    if state.connected {
        let label = state
            .selected
            .as_ref()
            .map(|a| a.display_name())
            .unwrap_or_else(|| "No account".to_string());
        let accounts = state.accounts.clone();

        rsx! {
            div { class: "relative flex items-center space-x-2",
                button {
                    class: "btn btn-secondary text-sm font-mono",
                    onclick: move |_| {
                        let open = *show_accounts.read();
                        show_accounts.set(!open);
                    },
                    "{label} ▾"
                }
                if *show_accounts.read() {
                    div { class: "absolute right-0 top-12 w-64 card z-50 space-y-1",
                        for account in accounts {
                            button {
                                key: "{account.address}",
                                class: "block w-full text-left px-3 py-2 text-sm hover:text-polkadot-400",
                                onclick: {
                                    let account = account.clone();
                                    move |_| {
                                        wallet.select(account.clone());
                                        show_accounts.set(false);
                                    }
                                },
                                div { "{account.display_name()}" }
                                div { class: "text-xs text-low font-mono", "{account.short_address()}" }
                                div { class: "text-xs text-low", "via {account.source}" }
                            }
                        }
                        button {
                            class: "block w-full text-left px-3 py-2 text-sm text-red-400",
                            onclick: move |_| {
                                wallet.disconnect();
                                show_accounts.set(false);
                            },
                            "Disconnect"
                        }
                    }
                }
            }
        }
    } else {
        rsx! {
            div { class: "flex flex-col items-end",
                button {
                    class: "btn btn-primary",
                    onclick: move |_| wallet.connect(),
                    "Connect Wallet"
                }
                if let Some(error) = state.error.clone() {
                    span { class: "text-xs text-red-400 mt-1", "{error}" }
                } else if !is_extension_available() {
                    span { class: "text-xs text-low mt-1",
                        "Requires a Polkadot extension wallet"
                    }
                }
            }
        }
    }
}
