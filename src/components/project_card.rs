use dioxus::prelude::*;

use crate::data::Project;

#[derive(Props, Clone, PartialEq)]
pub struct ProjectCardProps {
    pub project: Project,
    /// Highlight styling for the freshly discovered project on the wheel.
    #[props(default = false)]
    pub highlighted: bool,
}

#[component]
pub fn ProjectCard(props: ProjectCardProps) -> Element {
    let project = &props.project;
    let card_class = if props.highlighted {
        "card border-polkadot-400 border-2"
    } else {
        "card"
    };

    rsx! {
        div { class: "{card_class}",
            div { class: "flex items-center space-x-3 mb-3",
                img {
                    class: "w-10 h-10 rounded",
                    src: "{project.logo}",
                    alt: "{project.name} logo",
                }
                div {
                    h3 { class: "text-lg font-semibold text-polkadot-400", "{project.name}" }
                    span { class: "text-xs text-low uppercase tracking-wide",
                        "{project.category}"
                    }
                }
            }

            p { class: "text-gray-400 text-sm mb-4", "{project.description}" }

            div { class: "flex flex-wrap gap-2 mb-4",
                for tag in &project.tags {
                    span {
                        key: "{tag}",
                        class: "text-xs px-2 py-1 rounded bg-gray-800 text-mid",
                        "#{tag}"
                    }
                }
            }

            a {
                class: "btn btn-secondary text-sm",
                href: "{project.url}",
                target: "_blank",
                rel: "noopener noreferrer",
                "Visit website ↗"
            }
        }
    }
}
