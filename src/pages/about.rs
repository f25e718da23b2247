use dioxus::prelude::*;

use crate::route::Route;

#[component]
pub fn About() -> Element {
    rsx! {
        div { class: "max-w-4xl mx-auto text-center py-16",
            // Hero
            h1 { class: "text-5xl font-bold mb-6",
                span { class: "text-polkadot-400", "Discovery" }
                span { class: "text-gray-100", " Roulette" }
            }

            p { class: "text-xl text-gray-400 mb-8 max-w-2xl mx-auto",
                "A playful way to explore the Polkadot ecosystem. Spin the wheel, "
                "let the chain pick a project for you, and leave a trace of every "
                "discovery on the Paseo testnet."
            }

            div { class: "flex justify-center gap-4 mb-16",
                Link {
                    to: Route::Spin {},
                    class: "btn btn-primary text-lg px-8 py-3",
                    "Start Spinning"
                }
                Link {
                    to: Route::Projects {},
                    class: "btn btn-secondary text-lg px-8 py-3",
                    "Browse Projects"
                }
            }

            // How it works
            div { class: "grid md:grid-cols-3 gap-8 mt-16",
                FeatureCard {
                    title: "Connect",
                    description: "Link a Polkadot browser extension wallet like Polkadot.js, Talisman or SubWallet.",
                    icon: "👛",
                }
                FeatureCard {
                    title: "Spin",
                    description: "The wheel is seeded by the hash of a finalized block, so the chain itself picks your project.",
                    icon: "🎡",
                }
                FeatureCard {
                    title: "Record",
                    description: "Each discovery can be written to Paseo as a system remark you can find on any explorer.",
                    icon: "⛓️",
                }
            }

            // Fine print
            div { class: "mt-16 card max-w-xl mx-auto text-left space-y-2 text-gray-300",
                h3 { class: "text-xl font-semibold text-polkadot-400 mb-4", "Good to know" }
                p {
                    span { class: "text-gray-500", "Network: " }
                    "Paseo testnet. PAS tokens have no value and are free from the faucet."
                }
                p {
                    span { class: "text-gray-500", "Cooldown: " }
                    "one spin every {crate::COOLDOWN_SECONDS} seconds."
                }
                p {
                    span { class: "text-gray-500", "Offline: " }
                    "spins fall back to local randomness when no endpoint responds."
                }
                p {
                    span { class: "text-gray-500", "Privacy: " }
                    "discoveries are stored in your browser; on-chain recording is optional."
                }
            }
        }
    }
}

#[derive(Props, Clone, PartialEq)]
struct FeatureCardProps {
    title: &'static str,
    description: &'static str,
    icon: &'static str,
}

#[component]
fn FeatureCard(props: FeatureCardProps) -> Element {
    rsx! {
        div { class: "card text-center",
            div { class: "text-4xl mb-4", "{props.icon}" }
            h3 { class: "text-lg font-semibold text-polkadot-400 mb-2", "{props.title}" }
            p { class: "text-gray-400", "{props.description}" }
        }
    }
}
