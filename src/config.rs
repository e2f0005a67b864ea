use std::{fmt, str::FromStr};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_ASSET_INDEX_URL: &str = "https://graph.holaplex.com/v1";

#[derive(Deserialize, Debug, Clone)]
pub struct Config {
    /// Solana RPC node.
    pub rpc_url: Url,
    /// Identity provider publishable API key.
    pub publishable_key: PublishableKey,
    /// GraphQL endpoint of the NFT index.
    pub asset_index_url: Url,
    #[serde(default)]
    pub cluster: Cluster,
}

impl Config {
    /// Load the configuration from the process environment.
    ///
    /// Each variable may also be given with the `REACT_APP_` prefix.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| {
            lookup(name)
                .or_else(|| lookup(&format!("REACT_APP_{name}")))
                .filter(|value| !value.trim().is_empty())
        };

        let rpc_url: Url = var("RPC_URL")
            .context("RPC_URL not set")?
            .parse()
            .context("invalid RPC_URL")?;

        let publishable_key = var("MAGIC_PUBLISHABLE_KEY")
            .context("MAGIC_PUBLISHABLE_KEY not set")
            .map(PublishableKey)?;

        let asset_index_url: Url = var("ASSET_INDEX_URL")
            .unwrap_or_else(|| DEFAULT_ASSET_INDEX_URL.to_owned())
            .parse()
            .context("invalid ASSET_INDEX_URL")?;

        let cluster = var("SOLANA_CLUSTER")
            .map(|c| c.parse::<Cluster>())
            .transpose()
            .context("invalid SOLANA_CLUSTER")?
            .unwrap_or_default();

        Ok(Config {
            rpc_url,
            publishable_key,
            asset_index_url,
            cluster,
        })
    }
}

/// A publishable client key. Never printed.
#[derive(Deserialize, Clone, PartialEq, Eq)]
#[serde(transparent)]
pub struct PublishableKey(String);

impl PublishableKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PublishableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PublishableKey(..)")
    }
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    MainnetBeta,
    Testnet,
    #[default]
    Devnet,
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Cluster::MainnetBeta => "mainnet-beta",
            Cluster::Testnet => "testnet",
            Cluster::Devnet => "devnet",
        })
    }
}

impl FromStr for Cluster {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "mainnet-beta" | "mainnet" => Ok(Cluster::MainnetBeta),
            "testnet" => Ok(Cluster::Testnet),
            "devnet" => Ok(Cluster::Devnet),
            other => bail!("unknown cluster '{other}'"),
        }
    }
}
