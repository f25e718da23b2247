use dioxus::prelude::*;

use crate::components::WalletButton;
use crate::route::Route;

#[component]
pub fn Layout() -> Element {
    rsx! {
        div { class: "min-h-screen",
            style: "background-color: var(--surface-base);",
            // Navigation
            nav { class: "border-b elevated-border backdrop-blur sticky top-0 z-50",
                style: "background-color: var(--surface-base);",
                div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8",
                    div { class: "flex justify-between h-16",
                        div { class: "flex items-center",
                            Link { to: Route::Spin {}, class: "flex items-center space-x-2",
                                span { class: "text-2xl", "🎰" }
                                span { class: "text-xl font-bold text-polkadot-400", "Discovery Roulette" }
                            }
                        }

                        div { class: "hidden sm:flex sm:items-center sm:space-x-8",
                            NavLink { to: Route::Spin {}, label: "Spin" }
                            NavLink { to: Route::Projects {}, label: "Projects" }
                            NavLink { to: Route::About {}, label: "About" }
                        }

                        div { class: "flex items-center",
                            WalletButton {}
                        }
                    }
                }
            }

            main { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 py-8",
                Outlet::<Route> {}
            }

            footer { class: "border-t elevated-border py-8 mt-auto",
                div { class: "max-w-7xl mx-auto px-4 sm:px-6 lg:px-8 text-center text-low",
                    p { "{crate::APP_NAME}" }
                    p { class: "text-sm mt-2",
                        "Running on the "
                        code { class: "text-polkadot-400", "Paseo" }
                        " testnet"
                    }
                }
            }
        }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str) -> Element {
    rsx! {
        Link {
            to: to,
            class: "text-mid hover:text-polkadot-400 px-3 py-2 text-sm font-medium transition-colors",
            "{label}"
        }
    }
}
