use dioxus::prelude::*;

use crate::components::ProjectCard;
use crate::hooks::{use_roulette, use_wallet};
use crate::time::sleep_ms;

const ERROR_DISMISS_MS: u32 = 5_000;

#[component]
pub fn Spin() -> Element {
    let roulette = use_roulette();
    let wallet = use_wallet();

    let state = roulette.state.read();
    let wallet_state = wallet.state.read();

    let discovered = state.session.discovered.len();
    let total = state.effective_catalog().len();
    let remaining = total.saturating_sub(discovered);

    // Auto-dismiss the error banner. Keyed on the error sequence number so
    // a stale timer cannot clear a later error with the same text.
    if state.error.is_some() {
        let dismiss_seq = state.error_seq;
        let roulette_for_dismiss = roulette.clone();
        spawn(async move {
            sleep_ms(ERROR_DISMISS_MS).await;
            if roulette_for_dismiss.state.read().error_seq == dismiss_seq {
                roulette_for_dismiss.clear_error();
            }
        });
    }

    let selected_address = wallet_state.selected.as_ref().map(|a| a.address.clone());
    let spin_disabled = state.is_spinning || !state.can_spin || selected_address.is_none();

    let cooldown_value = if state.cooldown_remaining > 0 {
        format!("{}s", state.cooldown_remaining)
    } else {
        "ready".to_string()
    };

    let spin_label = if state.is_spinning {
        "Spinning...".to_string()
    } else if state.cooldown_remaining > 0 {
        format!("Next spin in {}s", state.cooldown_remaining)
    } else {
        "Spin the wheel".to_string()
    };

    rsx! {
        div { class: "max-w-4xl mx-auto py-8 space-y-8",
            h1 { class: "text-4xl font-bold text-center",
                span { class: "text-polkadot-400", "Discovery" }
                span { class: "text-gray-100", " Roulette" }
            }
            p { class: "text-center text-gray-400 max-w-2xl mx-auto",
                "Spin the wheel to discover a project from the Polkadot ecosystem. "
                "Randomness comes from finalized block hashes on the Paseo testnet."
            }

            // Stats
            div { class: "grid grid-cols-3 gap-4",
                StatCard { label: "Discovered", value: "{discovered}" }
                StatCard { label: "Remaining", value: "{remaining}" }
                StatCard { label: "Cooldown", value: cooldown_value }
            }

            if let Some(error) = state.error.clone() {
                div { class: "card border-red-500 border text-red-400 text-center", "{error}" }
            }
            if let Some(advisory) = state.advisory.clone() {
                div { class: "card border-yellow-600 border text-yellow-400 text-sm text-center",
                    "{advisory}"
                }
            }
            if let Some(tx_hash) = state.last_tx_hash.clone() {
                {
                    let tx_short = format!("{}…", &tx_hash[..10.min(tx_hash.len())]);
                    rsx! {
                        div { class: "card text-sm text-center",
                            span { class: "text-gray-400", "Spin recorded on-chain: " }
                            a {
                                class: "text-polkadot-400 font-mono",
                                href: "https://paseo.subscan.io/extrinsic/{tx_hash}",
                                target: "_blank",
                                rel: "noopener noreferrer",
                                "{tx_short}"
                            }
                        }
                    }
                }
            }

            // The wheel
            div { class: "flex flex-col items-center space-y-6",
                div {
                    class: if state.is_spinning {
                        "text-8xl animate-spin"
                    } else {
                        "text-8xl"
                    },
                    "🎡"
                }

                if selected_address.is_none() {
                    p { class: "text-gray-400", "Connect a wallet to start spinning" }
                } else {
                    button {
                        class: "btn btn-primary text-lg px-8 py-3",
                        disabled: spin_disabled,
                        onclick: {
                            let roulette = roulette.clone();
                            move |_| {
                                if let Some(address) = selected_address.clone() {
                                    roulette.spin(address);
                                }
                            }
                        },
                        "{spin_label}"
                    }
                }

                if discovered > 0 {
                    button {
                        class: "btn btn-secondary text-sm",
                        onclick: {
                            let roulette = roulette.clone();
                            move |_| roulette.reset()
                        },
                        "Reset discoveries"
                    }
                }
            }

            if let Some(project) = state.current.clone() {
                div { class: "max-w-xl mx-auto",
                    h2 { class: "text-xl font-semibold text-center mb-4 text-gray-100",
                        "You discovered"
                    }
                    ProjectCard { project: project, highlighted: true }
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct StatCardProps {
    label: &'static str,
    value: String,
}

#[component]
fn StatCard(props: StatCardProps) -> Element {
    rsx! {
        div { class: "card text-center",
            div { class: "text-2xl font-bold text-polkadot-400", "{props.value}" }
            div { class: "text-sm text-low", "{props.label}" }
        }
    }
}
