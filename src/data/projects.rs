//! The project catalog and the selection rules the roulette runs on.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Parachain,
    DeFi,
    Nft,
    DeveloperTools,
    Infrastructure,
    Governance,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Parachain,
        Category::DeFi,
        Category::Nft,
        Category::DeveloperTools,
        Category::Infrastructure,
        Category::Governance,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Parachain => "Parachain",
            Category::DeFi => "DeFi",
            Category::Nft => "NFT",
            Category::DeveloperTools => "Developer Tools",
            Category::Infrastructure => "Infrastructure",
            Category::Governance => "Governance",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub url: String,
    pub logo: String,
    pub tags: Vec<String>,
}

fn project(
    id: &str,
    name: &str,
    description: &str,
    category: Category,
    url: &str,
    logo: &str,
    tags: &[&str],
) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        url: url.to_string(),
        logo: logo.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

/// The built-in catalog, in a fixed insertion order the selection index
/// depends on.
pub fn built_in_projects() -> Vec<Project> {
    vec![
        project(
            "acala",
            "Acala",
            "DeFi hub of Polkadot offering a decentralized stablecoin, liquid staking and an EVM-compatible smart contract platform.",
            Category::DeFi,
            "https://acala.network",
            "https://acala.network/favicon.ico",
            &["defi", "stablecoin", "staking"],
        ),
        project(
            "moonbeam",
            "Moonbeam",
            "Ethereum-compatible smart contract parachain that makes it easy to deploy existing Solidity dapps on Polkadot.",
            Category::Parachain,
            "https://moonbeam.network",
            "https://moonbeam.network/favicon.ico",
            &["evm", "smart-contracts", "parachain"],
        ),
        project(
            "astar",
            "Astar",
            "Multi-chain smart contract platform supporting both EVM and WebAssembly with a unique dapp staking mechanism.",
            Category::Parachain,
            "https://astar.network",
            "https://astar.network/favicon.ico",
            &["wasm", "evm", "dapp-staking"],
        ),
        project(
            "polkadex",
            "Polkadex",
            "Orderbook-based decentralized exchange bringing centralized exchange performance to non-custodial trading.",
            Category::DeFi,
            "https://polkadex.trade",
            "https://polkadex.trade/favicon.ico",
            &["dex", "trading", "orderbook"],
        ),
        project(
            "hydradx",
            "HydraDX",
            "Next-generation AMM protocol built around an omnipool that unifies liquidity for all assets in a single pool.",
            Category::DeFi,
            "https://hydradx.io",
            "https://hydradx.io/favicon.ico",
            &["amm", "liquidity", "omnipool"],
        ),
        project(
            "unique",
            "Unique Network",
            "NFT-focused parachain with advanced features like nested, customizable and fractional NFTs for games and marketplaces.",
            Category::Nft,
            "https://unique.network",
            "https://unique.network/favicon.ico",
            &["nft", "gaming", "marketplace"],
        ),
        project(
            "rmrk",
            "RMRK",
            "Advanced NFT protocol enabling multi-resource, nestable and conditional NFTs without smart contracts.",
            Category::Nft,
            "https://rmrk.app",
            "https://rmrk.app/favicon.ico",
            &["nft", "protocol", "legos"],
        ),
        project(
            "subscan",
            "Subscan",
            "Multi-network block explorer with rich analytics covering nearly every chain in the Polkadot ecosystem.",
            Category::DeveloperTools,
            "https://subscan.io",
            "https://subscan.io/favicon.ico",
            &["explorer", "analytics", "tooling"],
        ),
        project(
            "polkadot-js",
            "Polkadot.js",
            "The canonical JavaScript toolset and browser extension for interacting with Polkadot and Substrate chains.",
            Category::DeveloperTools,
            "https://polkadot.js.org",
            "https://polkadot.js.org/favicon.ico",
            &["sdk", "wallet", "tooling"],
        ),
        project(
            "substrate",
            "Substrate",
            "The modular blockchain framework every Polkadot parachain is built with, featuring forkless upgrades.",
            Category::DeveloperTools,
            "https://substrate.io",
            "https://substrate.io/favicon.ico",
            &["framework", "runtime", "rust"],
        ),
        project(
            "phala",
            "Phala Network",
            "Confidential cloud computing network using secure enclaves to run privacy-preserving smart contracts.",
            Category::Infrastructure,
            "https://phala.network",
            "https://phala.network/favicon.ico",
            &["privacy", "compute", "tee"],
        ),
        project(
            "zeitgeist",
            "Zeitgeist",
            "Prediction market protocol where forecasting markets are a first-class primitive governed by futarchy.",
            Category::Governance,
            "https://zeitgeist.pm",
            "https://zeitgeist.pm/favicon.ico",
            &["prediction-markets", "futarchy", "governance"],
        ),
        project(
            "bifrost",
            "Bifrost",
            "Liquid staking protocol issuing derivative tokens that keep staked assets usable across the ecosystem.",
            Category::DeFi,
            "https://bifrost.finance",
            "https://bifrost.finance/favicon.ico",
            &["liquid-staking", "derivatives", "defi"],
        ),
        project(
            "parallel",
            "Parallel Finance",
            "Lending and staking platform offering leveraged staking and auction loans for the Polkadot ecosystem.",
            Category::DeFi,
            "https://parallel.fi",
            "https://parallel.fi/favicon.ico",
            &["lending", "staking", "defi"],
        ),
        project(
            "interlay",
            "Interlay",
            "Trustless bridge bringing Bitcoin to Polkadot as iBTC, fully collateralized and redeemable one-to-one.",
            Category::Infrastructure,
            "https://interlay.io",
            "https://interlay.io/favicon.ico",
            &["bitcoin", "bridge", "interoperability"],
        ),
        project(
            "composable",
            "Composable Finance",
            "Cross-chain infrastructure focused on seamless execution of DeFi strategies across multiple ecosystems.",
            Category::Infrastructure,
            "https://composable.finance",
            "https://composable.finance/favicon.ico",
            &["cross-chain", "defi", "infrastructure"],
        ),
        project(
            "kilt",
            "KILT Protocol",
            "Identity blockchain for issuing self-sovereign, verifiable credentials and decentralized identifiers.",
            Category::Infrastructure,
            "https://kilt.io",
            "https://kilt.io/favicon.ico",
            &["identity", "credentials", "did"],
        ),
        project(
            "subsquid",
            "Subsquid",
            "Indexing framework giving dapp developers fast, flexible access to on-chain data through GraphQL APIs.",
            Category::DeveloperTools,
            "https://subsquid.io",
            "https://subsquid.io/favicon.ico",
            &["indexing", "graphql", "data"],
        ),
        project(
            "polkassembly",
            "Polkassembly",
            "Governance forum where Polkadot and Kusama referenda are discussed, tracked and voted on.",
            Category::Governance,
            "https://polkassembly.io",
            "https://polkassembly.io/favicon.ico",
            &["governance", "voting", "forum"],
        ),
        project(
            "subsocial",
            "Subsocial",
            "Decentralized social networking platform where users own their content, follows and monetization.",
            Category::Governance,
            "https://subsocial.network",
            "https://subsocial.network/favicon.ico",
            &["social", "content", "community"],
        ),
    ]
}

/// Pick a project by `seed % available` over the catalog minus the already
/// discovered ids, preserving catalog order. `None` when nothing is left.
pub fn select_random(catalog: &[Project], seed: u64, discovered: &[String]) -> Option<Project> {
    let available: Vec<&Project> = catalog
        .iter()
        .filter(|p| !discovered.contains(&p.id))
        .collect();
    if available.is_empty() {
        return None;
    }
    let index = (seed % available.len() as u64) as usize;
    Some(available[index].clone())
}

pub fn filter_by_category(catalog: &[Project], category: Option<Category>) -> Vec<Project> {
    catalog
        .iter()
        .filter(|p| category.map_or(true, |c| p.category == c))
        .cloned()
        .collect()
}

/// Case-insensitive match over name, description and tags.
pub fn search(catalog: &[Project], query: &str) -> Vec<Project> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return catalog.to_vec();
    }
    catalog
        .iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&query)
                || p.description.to_lowercase().contains(&query)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&query))
        })
        .cloned()
        .collect()
}

/// Id for a user-added project, unique enough across one browser session.
pub fn custom_project_id(now_ms: u64) -> String {
    use rand::Rng;
    let suffix: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(4)
        .map(char::from)
        .collect();
    format!("custom-{now_ms}-{}", suffix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_twenty_projects_with_unique_ids() {
        let catalog = built_in_projects();
        assert_eq!(catalog.len(), 20);

        let mut ids: Vec<&str> = catalog.iter().map(|p| p.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 20);
    }

    #[test]
    fn every_category_is_represented() {
        let catalog = built_in_projects();
        for category in Category::ALL {
            assert!(
                catalog.iter().any(|p| p.category == category),
                "no project in {category}"
            );
        }
    }

    #[test]
    fn selection_is_deterministic_modulo_available() {
        let catalog = built_in_projects();
        let first = select_random(&catalog, 23, &[]).unwrap();
        let again = select_random(&catalog, 23, &[]).unwrap();
        assert_eq!(first, again);
        // 23 % 20 == 3, catalog order is the insertion order.
        assert_eq!(first.id, catalog[3].id);
    }

    #[test]
    fn discovered_projects_are_excluded() {
        let catalog = built_in_projects();
        let discovered: Vec<String> = catalog[..19].iter().map(|p| p.id.clone()).collect();

        // Only the last project remains; any seed must select it.
        for seed in [0, 1, 7, 1_999_999] {
            let picked = select_random(&catalog, seed, &discovered).unwrap();
            assert_eq!(picked.id, catalog[19].id);
        }
    }

    #[test]
    fn empty_pool_selects_nothing() {
        let catalog = built_in_projects();
        let discovered: Vec<String> = catalog.iter().map(|p| p.id.clone()).collect();
        assert!(select_random(&catalog, 5, &discovered).is_none());
    }

    #[test]
    fn search_matches_name_description_and_tags() {
        let catalog = built_in_projects();
        assert!(search(&catalog, "MOONBEAM").iter().any(|p| p.id == "moonbeam"));
        assert!(search(&catalog, "stablecoin").iter().any(|p| p.id == "acala"));
        assert!(search(&catalog, "graphql").iter().any(|p| p.id == "subsquid"));
        assert!(search(&catalog, "zzz-no-such-project").is_empty());
        assert_eq!(search(&catalog, "  ").len(), catalog.len());
    }

    #[test]
    fn category_filter() {
        let catalog = built_in_projects();
        let defi = filter_by_category(&catalog, Some(Category::DeFi));
        assert!(!defi.is_empty());
        assert!(defi.iter().all(|p| p.category == Category::DeFi));
        assert_eq!(filter_by_category(&catalog, None).len(), catalog.len());
    }

    #[test]
    fn custom_ids_carry_timestamp_and_suffix() {
        let id = custom_project_id(1_700_000_000_000);
        assert!(id.starts_with("custom-1700000000000-"));
        assert_eq!(id.len(), "custom-1700000000000-".len() + 4);
    }
}
