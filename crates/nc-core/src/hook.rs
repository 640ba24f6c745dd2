use crate::family::TableFamily;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Netfilter hook a base chain attaches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainHook {
    Prerouting,
    Input,
    Forward,
    #[default]
    Output,
    Postrouting,
    Ingress,
    Egress,
}

impl ChainHook {
    pub const ALL: [ChainHook; 7] = [
        Self::Prerouting,
        Self::Input,
        Self::Forward,
        Self::Output,
        Self::Postrouting,
        Self::Ingress,
        Self::Egress,
    ];

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|hook| hook.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Resolve a hook keyword, falling back to `output` for anything unknown.
    pub fn resolve(keyword: &str) -> Self {
        Self::from_keyword(keyword).unwrap_or_default()
    }

    /// Hook number as the kernel expects it (`NF_INET_*` or `NF_NETDEV_*`).
    pub fn number(self) -> u32 {
        match self {
            Self::Prerouting => 0,
            Self::Input => 1,
            Self::Forward => 2,
            Self::Output => 3,
            Self::Postrouting => 4,
            Self::Ingress => 0,
            Self::Egress => 1,
        }
    }

    /// Families that may register a base chain at this hook.
    pub fn families(self) -> &'static [TableFamily] {
        use TableFamily::*;

        match self {
            Self::Input | Self::Output => &[Inet, Ipv4, Ipv6, Bridge, Arp],
            Self::Prerouting | Self::Forward | Self::Postrouting => &[Inet, Ipv4, Ipv6, Bridge],
            Self::Ingress | Self::Egress => &[Netdev],
        }
    }

    pub fn is_supported_by(self, family: TableFamily) -> bool {
        self.families().contains(&family)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Prerouting => "prerouting",
            Self::Input => "input",
            Self::Forward => "forward",
            Self::Output => "output",
            Self::Postrouting => "postrouting",
            Self::Ingress => "ingress",
            Self::Egress => "egress",
        }
    }
}

impl fmt::Display for ChainHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
