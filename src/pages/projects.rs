use dioxus::prelude::*;

use crate::components::{AddProjectForm, ProjectCard};
use crate::data::{filter_by_category, search, Category};
use crate::hooks::use_roulette;

#[component]
pub fn Projects() -> Element {
    let roulette = use_roulette();

    let mut query = use_signal(String::new);
    let mut category = use_signal(|| None::<Category>);
    let mut show_form = use_signal(|| false);

    let state = roulette.state.read();
    let catalog = state.effective_catalog();
    let discovered = state.session.discovered.clone();

    let visible = search(&filter_by_category(&catalog, *category.read()), &query.read());

    rsx! {
        div { class: "space-y-6",
            div { class: "flex items-center justify-between",
                h1 { class: "text-3xl font-bold text-gray-100", "Ecosystem Projects" }
                button {
                    class: "btn btn-primary text-sm",
                    onclick: move |_| {
                        let open = *show_form.read();
                        show_form.set(!open);
                    },
                    if *show_form.read() { "Close" } else { "Add project" }
                }
            }

            if *show_form.read() {
                AddProjectForm { on_added: move |_| show_form.set(false) }
            }

            // Search and category filter
            div { class: "flex flex-wrap gap-2 items-center",
                input {
                    class: "input flex-1 min-w-64",
                    placeholder: "Search by name, description or tag...",
                    value: "{query}",
                    oninput: move |e| query.set(e.value()),
                }
                button {
                    class: if category.read().is_none() { "btn btn-primary text-sm" } else { "btn btn-secondary text-sm" },
                    onclick: move |_| category.set(None),
                    "All"
                }
                for option in Category::ALL {
                    button {
                        key: "{option.label()}",
                        class: if *category.read() == Some(option) { "btn btn-primary text-sm" } else { "btn btn-secondary text-sm" },
                        onclick: move |_| category.set(Some(option)),
                        "{option.label()}"
                    }
                }
            }

            p { class: "text-sm text-low",
                "{visible.len()} of {catalog.len()} projects, {discovered.len()} discovered"
            }

            if visible.is_empty() {
                div { class: "card text-center text-gray-400 py-12",
                    "No projects match your search."
                }
            } else {
                div { class: "grid md:grid-cols-2 lg:grid-cols-3 gap-6",
                    for project in visible {
                        div {
                            key: "{project.id}",
                            class: if discovered.contains(&project.id) { "opacity-100" } else { "opacity-80" },
                            ProjectCard { project: project.clone() }
                            if discovered.contains(&project.id) {
                                div { class: "text-xs text-polkadot-400 mt-1 text-center",
                                    "✓ discovered"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
