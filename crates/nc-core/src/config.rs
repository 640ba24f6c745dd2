use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::resolver::ChainRequest;

/// Declarative set of tables and base chains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    /// Family keyword; unknown values fall back to `inet`.
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub chains: Vec<ChainDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainDecl {
    pub name: String,
    /// Chain keyword (filter, mangle, natdest, ...).
    #[serde(rename = "chain")]
    pub keyword: String,
    pub hook: String,
    #[serde(default)]
    pub policy: ChainPolicy,
    /// Device for netdev base chains.
    #[serde(default)]
    pub device: Option<String>,
}

/// Verdict for packets that fall off the end of a base chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainPolicy {
    #[default]
    Accept,
    Drop,
}

impl ChainPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Drop => "drop",
        }
    }
}

fn default_version() -> u32 {
    1
}

impl ChainDecl {
    pub fn request(&self, table: &TableConfig) -> ChainRequest {
        ChainRequest::parse(&table.family, &self.keyword, &self.hook)
    }
}

impl ChainConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse chain configuration YAML")
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse chain configuration JSON")
    }

    /// Load a file, parsing `.json` as JSON and anything else as YAML.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read chain configuration from {:?}", path))?;

        let parsed = if path.extension().and_then(|s| s.to_str()) == Some("json") {
            Self::from_json(&content)
        } else {
            Self::from_yaml(&content)
        };

        parsed.with_context(|| format!("Invalid chain configuration in {:?}", path))
    }

    pub fn merge(&mut self, other: ChainConfig) {
        self.tables.extend(other.tables);
    }

    pub fn chain_count(&self) -> usize {
        self.tables.iter().map(|t| t.chains.len()).sum()
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            tables: vec![],
        }
    }
}
