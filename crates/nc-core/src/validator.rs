use std::collections::HashSet;
use std::fmt;

use crate::config::{ChainConfig, ChainDecl, TableConfig};
use crate::family::TableFamily;
use crate::hook::ChainHook;
use crate::keyword::ChainKeyword;
use crate::resolver::ChainRejection;

/// Validates a chain configuration before any chain is built
pub struct ChainValidator<'a> {
    config: &'a ChainConfig,
}

impl<'a> ChainValidator<'a> {
    pub fn new(config: &'a ChainConfig) -> Self {
        Self { config }
    }

    /// Run all validations
    pub fn validate(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        warnings.extend(self.check_duplicate_tables());

        for table in &self.config.tables {
            warnings.extend(Self::check_duplicate_chains(table));

            for chain in &table.chains {
                warnings.extend(Self::check_keywords(table, chain));
                warnings.extend(Self::check_combination(table, chain));
            }
        }

        warnings
    }

    /// Tables are identified by (family, name)
    fn check_duplicate_tables(&self) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for table in &self.config.tables {
            let family = TableFamily::resolve(&table.family);
            if !seen.insert((family, table.name.as_str())) {
                warnings.push(ValidationWarning::DuplicateTable {
                    family,
                    table: table.name.clone(),
                });
            }
        }

        warnings
    }

    fn check_duplicate_chains(table: &TableConfig) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for chain in &table.chains {
            if !seen.insert(chain.name.as_str()) {
                warnings.push(ValidationWarning::DuplicateChain {
                    table: table.name.clone(),
                    chain: chain.name.clone(),
                });
            }
        }

        warnings
    }

    /// Report values that silently fell back to a default
    fn check_keywords(table: &TableConfig, chain: &ChainDecl) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if TableFamily::from_keyword(&table.family).is_none() {
            warnings.push(ValidationWarning::UnknownFamily {
                table: table.name.clone(),
                family: table.family.clone(),
            });
        }

        if ChainHook::from_keyword(&chain.hook).is_none() {
            warnings.push(ValidationWarning::UnknownHook {
                table: table.name.clone(),
                chain: chain.name.clone(),
                hook: chain.hook.clone(),
            });
        }

        if ChainKeyword::from_keyword(&chain.keyword).is_none() {
            warnings.push(ValidationWarning::UnknownChainKeyword {
                table: table.name.clone(),
                chain: chain.name.clone(),
                keyword: chain.keyword.clone(),
            });
        }

        warnings
    }

    fn check_combination(table: &TableConfig, chain: &ChainDecl) -> Vec<ValidationWarning> {
        let request = chain.request(table);

        if let Err(reason) = request.evaluate() {
            return vec![ValidationWarning::RejectedChain {
                table: table.name.clone(),
                chain: chain.name.clone(),
                reason,
            }];
        }

        let mut warnings = Vec::new();

        if !request.hook.is_supported_by(request.family) {
            warnings.push(ValidationWarning::UnsupportedHook {
                table: table.name.clone(),
                chain: chain.name.clone(),
                family: request.family,
                hook: request.hook,
            });
        }

        if request.family == TableFamily::Netdev && chain.device.is_none() {
            warnings.push(ValidationWarning::MissingDevice {
                table: table.name.clone(),
                chain: chain.name.clone(),
            });
        }

        warnings
    }
}

/// Findings from validation; only some of them block building chains
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationWarning {
    RejectedChain {
        table: String,
        chain: String,
        reason: ChainRejection,
    },
    UnknownFamily {
        table: String,
        family: String,
    },
    UnknownHook {
        table: String,
        chain: String,
        hook: String,
    },
    UnknownChainKeyword {
        table: String,
        chain: String,
        keyword: String,
    },
    UnsupportedHook {
        table: String,
        chain: String,
        family: TableFamily,
        hook: ChainHook,
    },
    MissingDevice {
        table: String,
        chain: String,
    },
    DuplicateTable {
        family: TableFamily,
        table: String,
    },
    DuplicateChain {
        table: String,
        chain: String,
    },
}

impl ValidationWarning {
    pub fn is_error(&self) -> bool {
        match self {
            Self::RejectedChain { .. } | Self::DuplicateTable { .. } | Self::DuplicateChain { .. } => {
                true
            }
            Self::UnknownFamily { .. }
            | Self::UnknownHook { .. }
            | Self::UnknownChainKeyword { .. }
            | Self::UnsupportedHook { .. }
            | Self::MissingDevice { .. } => false, // Warnings only
        }
    }
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RejectedChain {
                table,
                chain,
                reason,
            } => write!(f, "chain '{}' in table '{}' rejected: {}", chain, table, reason),
            Self::UnknownFamily { table, family } => write!(
                f,
                "unknown family '{}' for table '{}', using inet",
                family, table
            ),
            Self::UnknownHook { table, chain, hook } => write!(
                f,
                "unknown hook '{}' for chain '{}' in table '{}', using output",
                hook, chain, table
            ),
            Self::UnknownChainKeyword {
                table,
                chain,
                keyword,
            } => write!(
                f,
                "unknown chain keyword '{}' for chain '{}' in table '{}', using filter priority",
                keyword, chain, table
            ),
            Self::UnsupportedHook {
                table,
                chain,
                family,
                hook,
            } => write!(
                f,
                "hook '{}' is not available in the {} family (chain '{}' in table '{}')",
                hook, family, chain, table
            ),
            Self::MissingDevice { table, chain } => write!(
                f,
                "netdev chain '{}' in table '{}' has no device",
                chain, table
            ),
            Self::DuplicateTable { family, table } => {
                write!(f, "duplicate table '{}' in the {} family", table, family)
            }
            Self::DuplicateChain { table, chain } => {
                write!(f, "duplicate chain '{}' in table '{}'", chain, table)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate(yaml: &str) -> Vec<ValidationWarning> {
        let config = ChainConfig::from_yaml(yaml).unwrap();
        ChainValidator::new(&config).validate()
    }

    #[test]
    fn clean_config_has_no_findings() {
        let warnings = validate(
            r#"
tables:
  - name: fw
    family: inet
    chains:
      - {name: pre, chain: natdest, hook: prerouting}
      - {name: post, chain: natsource, hook: postrouting}
      - {name: out, chain: mangle, hook: output}
  - name: edge
    family: netdev
    chains:
      - {name: in, chain: filter, hook: ingress, device: eth0}
"#,
        );
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn demo_config_is_clean() {
        let warnings = validate(include_str!("../../../demos/chains.yaml"));
        assert!(warnings.is_empty(), "{:?}", warnings);
    }

    #[test]
    fn rejected_combination_is_an_error() {
        let warnings = validate(
            "tables:\n  - name: fw\n    family: ip\n    chains:\n      - {name: fwd, chain: natdest, hook: forward}\n",
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].is_error());
        assert!(matches!(
            warnings[0],
            ValidationWarning::RejectedChain {
                reason: ChainRejection::NatOnForward { .. },
                ..
            }
        ));
    }

    #[test]
    fn fallbacks_are_reported_as_warnings() {
        let warnings = validate(
            "tables:\n  - name: fw\n    family: ipx\n    chains:\n      - {name: c, chain: accounting, hook: sideways}\n",
        );
        assert_eq!(warnings.len(), 3);
        assert!(warnings.iter().all(|w| !w.is_error()));
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ValidationWarning::UnknownFamily { .. }))
        );
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ValidationWarning::UnknownHook { .. }))
        );
        assert!(
            warnings
                .iter()
                .any(|w| matches!(w, ValidationWarning::UnknownChainKeyword { .. }))
        );
    }

    #[test]
    fn hook_outside_family_capabilities_is_advisory() {
        let warnings = validate(
            "tables:\n  - name: fw\n    family: ip\n    chains:\n      - {name: c, chain: filter, hook: ingress}\n",
        );
        assert_eq!(
            warnings,
            vec![ValidationWarning::UnsupportedHook {
                table: "fw".into(),
                chain: "c".into(),
                family: TableFamily::Ipv4,
                hook: ChainHook::Ingress,
            }]
        );
        assert!(!warnings[0].is_error());
    }

    #[test]
    fn netdev_chain_without_device() {
        let warnings = validate(
            "tables:\n  - name: edge\n    family: netdev\n    chains:\n      - {name: c, chain: filter, hook: egress}\n",
        );
        assert!(matches!(warnings[..], [ValidationWarning::MissingDevice { .. }]));
    }

    #[test]
    fn duplicates_are_errors() {
        let warnings = validate(
            r#"
tables:
  - name: fw
    family: inet
    chains:
      - {name: c, chain: filter, hook: input}
      - {name: c, chain: filter, hook: output}
  - name: fw
    family: INET
  - name: fw
    family: ip
"#,
        );
        let errors: Vec<_> = warnings.iter().filter(|w| w.is_error()).collect();
        assert_eq!(errors.len(), 2);
        assert!(warnings.contains(&ValidationWarning::DuplicateTable {
            family: TableFamily::Inet,
            table: "fw".into(),
        }));
        assert!(warnings.contains(&ValidationWarning::DuplicateChain {
            table: "fw".into(),
            chain: "c".into(),
        }));
    }

    #[test]
    fn messages_are_readable() {
        let warning = ValidationWarning::DuplicateChain {
            table: "fw".into(),
            chain: "input".into(),
        };
        assert_eq!(warning.to_string(), "duplicate chain 'input' in table 'fw'");
    }
}
