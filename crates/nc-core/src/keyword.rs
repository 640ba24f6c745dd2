use serde::{Deserialize, Serialize};
use std::fmt;

/// Logical role of a chain as written in configuration. Drives the priority
/// and type a base chain gets, and is distinct from [`ChainType`].
///
/// [`ChainType`]: crate::priority::ChainType
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainKeyword {
    Filter,
    Mangle,
    Raw,
    Conntrack,
    #[serde(rename = "natdest", alias = "nat-dest")]
    NatDest,
    #[serde(rename = "natsource", alias = "nat-source")]
    NatSource,
    Security,
    Selinux,
}

impl ChainKeyword {
    pub const ALL: [ChainKeyword; 8] = [
        Self::Filter,
        Self::Mangle,
        Self::Raw,
        Self::Conntrack,
        Self::NatDest,
        Self::NatSource,
        Self::Security,
        Self::Selinux,
    ];

    /// Look up a chain keyword. Unrecognized keywords are not an error for
    /// the resolver, they simply resolve like a plain filter chain.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim().to_ascii_lowercase();
        match keyword.as_str() {
            "filter" => Some(Self::Filter),
            "mangle" => Some(Self::Mangle),
            "raw" => Some(Self::Raw),
            "conntrack" => Some(Self::Conntrack),
            "natdest" | "nat-dest" => Some(Self::NatDest),
            "natsource" | "nat-source" => Some(Self::NatSource),
            "security" => Some(Self::Security),
            "selinux" => Some(Self::Selinux),
            _ => None,
        }
    }

    pub fn is_nat(self) -> bool {
        matches!(self, Self::NatDest | Self::NatSource)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Mangle => "mangle",
            Self::Raw => "raw",
            Self::Conntrack => "conntrack",
            Self::NatDest => "natdest",
            Self::NatSource => "natsource",
            Self::Security => "security",
            Self::Selinux => "selinux",
        }
    }
}

impl fmt::Display for ChainKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_both_nat_spellings() {
        assert_eq!(ChainKeyword::from_keyword("natdest"), Some(ChainKeyword::NatDest));
        assert_eq!(ChainKeyword::from_keyword("NAT-DEST"), Some(ChainKeyword::NatDest));
        assert_eq!(ChainKeyword::from_keyword("nat-source"), Some(ChainKeyword::NatSource));
        assert_eq!(ChainKeyword::from_keyword("NatSource"), Some(ChainKeyword::NatSource));
    }

    #[test]
    fn every_keyword_parses_its_own_name() {
        for keyword in ChainKeyword::ALL {
            assert_eq!(ChainKeyword::from_keyword(keyword.as_str()), Some(keyword));
        }
        assert_eq!(ChainKeyword::from_keyword("accounting"), None);
    }
}
