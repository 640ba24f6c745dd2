use anyhow::{Result, bail};
use nc_core::{ChainConfig, ChainRejection, ChainValidator, TableFamily, ValidationWarning};
use serde_json::{Value, json};
use tracing::debug;

use crate::table::{Chain, Table};

pub struct ChainRenderer;

/// nftables JSON document plus the chains that could not be built.
pub struct RenderedRuleset {
    pub payload: String,
    pub tables: usize,
    pub chains: usize,
    pub skipped: Vec<SkippedChain>,
}

#[derive(Debug, Clone)]
pub struct SkippedChain {
    pub table: String,
    pub chain: String,
    pub reason: ChainRejection,
}

impl ChainRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Generate `{"nftables": [...]}` with a table object per table and a
    /// base chain object per chain that resolves. Rejected chains are left
    /// out and reported in [`RenderedRuleset::skipped`] rather than logged,
    /// the caller decides how to surface them.
    pub fn render(&self, config: &ChainConfig) -> Result<RenderedRuleset> {
        if let Some(duplicate) = ChainValidator::new(config)
            .validate()
            .into_iter()
            .find(|w| {
                matches!(
                    w,
                    ValidationWarning::DuplicateTable { .. } | ValidationWarning::DuplicateChain { .. }
                )
            })
        {
            bail!("Cannot render chain configuration: {}", duplicate);
        }

        let mut nftables = Vec::new();
        let mut skipped = Vec::new();
        let mut chains = 0;

        for table in &config.tables {
            let family = TableFamily::resolve(&table.family);
            nftables.push(table_object(&Table::new(family, &table.name))?);

            for decl in &table.chains {
                match decl.request(table).evaluate() {
                    Ok(resolved) => {
                        let chain = Chain::base(
                            &table.name,
                            &decl.name,
                            &resolved,
                            decl.policy,
                            decl.device.as_deref(),
                        );
                        nftables.push(chain_object(&chain)?);
                        chains += 1;
                    }
                    Err(reason) => skipped.push(SkippedChain {
                        table: table.name.clone(),
                        chain: decl.name.clone(),
                        reason,
                    }),
                }
            }
        }

        debug!(
            tables = config.tables.len(),
            chains,
            skipped = skipped.len(),
            "rendered nftables ruleset"
        );

        let ruleset = json!({"nftables": nftables});
        Ok(RenderedRuleset {
            payload: serde_json::to_string_pretty(&ruleset)?,
            tables: config.tables.len(),
            chains,
            skipped,
        })
    }
}

impl Default for ChainRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn table_object(table: &Table) -> Result<Value> {
    Ok(json!({"table": serde_json::to_value(table)?}))
}

fn chain_object(chain: &Chain) -> Result<Value> {
    Ok(json!({"chain": serde_json::to_value(chain)?}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    fn load_ruleset(value: &str) -> Vec<Value> {
        let doc: Value = serde_json::from_str(value).expect("valid JSON");
        doc.get("nftables")
            .and_then(|v| v.as_array())
            .cloned()
            .expect("nftables array")
    }

    fn find_chain<'a>(entries: &'a [Value], name: &str) -> Option<&'a Value> {
        entries
            .iter()
            .filter_map(|entry| entry.get("chain"))
            .find(|chain| chain.get("name").and_then(|n| n.as_str()) == Some(name))
    }

    const CONFIG: &str = r#"
tables:
  - name: opensnitch
    family: inet
    chains:
      - {name: mangle_output, chain: mangle, hook: output}
      - {name: input, chain: filter, hook: input, policy: drop}
      - {name: nat_forward, chain: natdest, hook: forward}
  - name: br
    family: bridge
    chains:
      - {name: pre, chain: filter, hook: prerouting}
"#;

    #[test]
    fn renders_tables_and_resolved_chains() {
        let config = ChainConfig::from_yaml(CONFIG).unwrap();
        let rendered = ChainRenderer::new().render(&config).expect("ruleset generation");

        assert_eq!(rendered.tables, 2);
        assert_eq!(rendered.chains, 3);

        let nftables = load_ruleset(&rendered.payload);
        assert_eq!(nftables[0]["table"]["name"], "opensnitch");
        assert_eq!(nftables[0]["table"]["family"], "inet");

        let mangle = find_chain(&nftables, "mangle_output").unwrap();
        assert_eq!(mangle["type"], "route");
        assert_eq!(mangle["prio"], -150);

        let input = find_chain(&nftables, "input").unwrap();
        assert_eq!(input["policy"], "drop");
        assert_eq!(input["prio"], 0);

        let bridge_pre = find_chain(&nftables, "pre").unwrap();
        assert_eq!(bridge_pre["family"], "bridge");
        assert_eq!(bridge_pre["prio"], -300);
    }

    #[test]
    #[traced_test]
    fn rejected_chains_are_skipped() {
        let config = ChainConfig::from_yaml(CONFIG).unwrap();
        let rendered = ChainRenderer::new().render(&config).unwrap();

        // reported through `skipped` only
        assert!(!logs_contain("WARN"));
        assert!(!logs_contain("invalid nat combination"));

        assert_eq!(rendered.skipped.len(), 1);
        assert_eq!(rendered.skipped[0].chain, "nat_forward");
        assert!(matches!(
            rendered.skipped[0].reason,
            ChainRejection::NatOnForward { .. }
        ));
        assert!(find_chain(&load_ruleset(&rendered.payload), "nat_forward").is_none());
    }

    #[test]
    fn duplicate_chain_names_abort_rendering() {
        let config = ChainConfig::from_yaml(
            "tables:\n  - name: t\n    chains:\n      - {name: c, chain: filter, hook: input}\n      - {name: c, chain: raw, hook: prerouting}\n",
        )
        .unwrap();
        let err = ChainRenderer::new().render(&config).err().unwrap();
        assert!(err.to_string().contains("duplicate chain 'c'"));
    }

    #[test]
    fn empty_config_renders_empty_document() {
        let rendered = ChainRenderer::new().render(&ChainConfig::default()).unwrap();
        assert!(load_ruleset(&rendered.payload).is_empty());
    }
}
