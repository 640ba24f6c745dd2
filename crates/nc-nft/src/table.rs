use nc_core::{ChainPolicy, ChainType, ResolvedChain, TableFamily};
use serde::{Deserialize, Serialize};

/// `table` object of the nftables JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub family: TableFamily,
    pub name: String,
}

/// Base chain `chain` object of the nftables JSON schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chain {
    pub family: TableFamily,
    pub table: String,
    pub name: String,
    pub r#type: ChainType,
    pub hook: String,
    pub prio: i32,
    pub policy: ChainPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev: Option<String>,
}

impl Table {
    pub fn new(family: TableFamily, name: &str) -> Self {
        Self {
            family,
            name: name.to_string(),
        }
    }
}

impl Chain {
    pub fn base(
        table: &str,
        name: &str,
        resolved: &ResolvedChain,
        policy: ChainPolicy,
        dev: Option<&str>,
    ) -> Self {
        Self {
            family: resolved.family,
            table: table.to_string(),
            name: name.to_string(),
            r#type: resolved.chain_type,
            hook: resolved.hook.as_str().to_string(),
            prio: resolved.priority_value(),
            policy,
            dev: dev.map(str::to_string),
        }
    }
}
