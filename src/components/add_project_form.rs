use dioxus::prelude::*;

use crate::data::{Category, Project};
use crate::hooks::use_roulette;

const MIN_DESCRIPTION_LEN: usize = 20;

/// Validate the raw form fields into a project, minus the id. Errors are
/// user-facing strings.
pub fn validate(
    name: &str,
    description: &str,
    url: &str,
    logo: &str,
    tags: &str,
) -> Result<(String, String, String, String, Vec<String>), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Project name is required".to_string());
    }

    let description = description.trim();
    if description.len() < MIN_DESCRIPTION_LEN {
        return Err(format!(
            "Description must be at least {MIN_DESCRIPTION_LEN} characters"
        ));
    }

    let url = url.trim();
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err("Website URL must start with http:// or https://".to_string());
    }

    let logo = logo.trim();
    if !logo.starts_with("https://") && !logo.starts_with("http://") {
        return Err("Logo URL must start with http:// or https://".to_string());
    }

    let tags: Vec<String> = tags
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();

    Ok((
        name.to_string(),
        description.to_string(),
        url.to_string(),
        logo.to_string(),
        tags,
    ))
}

#[component]
pub fn AddProjectForm(on_added: EventHandler<()>) -> Element {
    let roulette = use_roulette();

    let mut name = use_signal(String::new);
    let mut description = use_signal(String::new);
    let mut url = use_signal(String::new);
    let mut logo = use_signal(String::new);
    let mut tags = use_signal(String::new);
    let mut category = use_signal(|| Category::Parachain);
    let mut error = use_signal(|| None::<String>);

    let submit = move |_| {
        match validate(
            &name.read(),
            &description.read(),
            &url.read(),
            &logo.read(),
            &tags.read(),
        ) {
            Ok((name_v, description_v, url_v, logo_v, tags_v)) => {
                let project = Project {
                    id: roulette.custom_id(),
                    name: name_v,
                    description: description_v,
                    category: *category.read(),
                    url: url_v,
                    logo: logo_v,
                    tags: tags_v,
                };
                match roulette.add_project(project) {
                    Ok(()) => {
                        error.set(None);
                        on_added.call(());
                    }
                    Err(e) => error.set(Some(e)),
                }
            }
            Err(e) => error.set(Some(e)),
        }
    };

    rsx! {
        div { class: "card space-y-4",
            h3 { class: "text-lg font-semibold text-polkadot-400", "Add a project" }

            if let Some(message) = error.read().clone() {
                div { class: "text-sm text-red-400", "{message}" }
            }

            input {
                class: "input w-full",
                placeholder: "Project name",
                value: "{name}",
                oninput: move |e| name.set(e.value()),
            }
            textarea {
                class: "input w-full",
                placeholder: "Description (at least 20 characters)",
                value: "{description}",
                oninput: move |e| description.set(e.value()),
            }
            input {
                class: "input w-full",
                placeholder: "Website URL (https://...)",
                value: "{url}",
                oninput: move |e| url.set(e.value()),
            }
            input {
                class: "input w-full",
                placeholder: "Logo URL (https://...)",
                value: "{logo}",
                oninput: move |e| logo.set(e.value()),
            }
            input {
                class: "input w-full",
                placeholder: "Tags, comma separated",
                value: "{tags}",
                oninput: move |e| tags.set(e.value()),
            }
            select {
                class: "input w-full",
                onchange: move |e| {
                    let picked = Category::ALL
                        .into_iter()
                        .find(|c| c.label() == e.value());
                    if let Some(picked) = picked {
                        category.set(picked);
                    }
                },
                for option in Category::ALL {
                    option {
                        key: "{option.label()}",
                        value: "{option.label()}",
                        selected: *category.read() == option,
                        "{option.label()}"
                    }
                }
            }

            button { class: "btn btn-primary", onclick: submit, "Add project" }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_a_complete_form() {
        let (name, description, url, logo, tags) = validate(
            " Paseo Faucet ",
            "Dispenses PAS test tokens to developers on request.",
            "https://faucet.polkadot.io",
            "https://faucet.polkadot.io/favicon.ico",
            "faucet, Testnet,,tokens",
        )
        .unwrap();
        assert_eq!(name, "Paseo Faucet");
        assert!(description.starts_with("Dispenses"));
        assert_eq!(url, "https://faucet.polkadot.io");
        assert_eq!(logo, "https://faucet.polkadot.io/favicon.ico");
        assert_eq!(tags, vec!["faucet", "testnet", "tokens"]);
    }

    #[test]
    fn rejects_missing_name_and_short_description() {
        assert!(validate("", "long enough description here", "https://x.io", "", "").is_err());
        assert!(validate("X", "too short", "https://x.io", "", "").is_err());
    }

    #[test]
    fn rejects_bad_urls() {
        let description = "long enough description here";
        assert!(validate("X", description, "ftp://x.io", "https://x.io/l.png", "").is_err());
        assert!(validate("X", description, "https://x.io", "javascript:alert(1)", "").is_err());
        // Logo is required, like the website URL.
        assert!(validate("X", description, "https://x.io", "", "").is_err());
        assert!(validate("X", description, "https://x.io", "  ", "").is_err());
    }
}
