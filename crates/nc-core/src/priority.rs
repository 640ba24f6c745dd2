//! Chain types and the standard priority bands.
//!
//! Values follow the nft manpage priority table and the "Priority within
//! hook" section of the nftables wiki:
//! <https://wiki.nftables.org/wiki-nftables/index.php/Netfilter_hooks#Priority_within_hook>

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kernel chain type of a base chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    #[default]
    Filter,
    Nat,
    /// Reroutes packets when headers or marks change. Output hook only.
    Route,
}

impl ChainType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Nat => "nat",
            Self::Route => "route",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named priority band of a base chain. Lower values run first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(i32)]
pub enum ChainPriority {
    Raw = -300,
    SelinuxFirst = -225,
    Conntrack = -200,
    Mangle = -150,
    #[serde(rename = "dstnat")]
    NatDest = -100,
    #[default]
    Filter = 0,
    Security = 50,
    #[serde(rename = "srcnat")]
    NatSource = 100,
    SelinuxLast = 225,
    ConntrackHelper = 300,
    ConntrackConfirm = i32::MAX,
}

impl ChainPriority {
    pub const ALL: [ChainPriority; 11] = [
        Self::Raw,
        Self::SelinuxFirst,
        Self::Conntrack,
        Self::Mangle,
        Self::NatDest,
        Self::Filter,
        Self::Security,
        Self::NatSource,
        Self::SelinuxLast,
        Self::ConntrackHelper,
        Self::ConntrackConfirm,
    ];

    /// Raw numeric priority for protocol encoding.
    pub fn value(self) -> i32 {
        self as i32
    }

    pub fn from_value(value: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|prio| prio.value() == value)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::SelinuxFirst => "selinux-first",
            Self::Conntrack => "conntrack",
            Self::Mangle => "mangle",
            Self::NatDest => "dstnat",
            Self::Filter => "filter",
            Self::Security => "security",
            Self::NatSource => "srcnat",
            Self::SelinuxLast => "selinux-last",
            Self::ConntrackHelper => "conntrack-helper",
            Self::ConntrackConfirm => "conntrack-confirm",
        }
    }
}

impl PartialOrd for ChainPriority {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ChainPriority {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.value().cmp(&other.value())
    }
}

impl fmt::Display for ChainPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_values() {
        assert_eq!(ChainPriority::Raw.value(), -300);
        assert_eq!(ChainPriority::SelinuxFirst.value(), -225);
        assert_eq!(ChainPriority::Conntrack.value(), -200);
        assert_eq!(ChainPriority::Mangle.value(), -150);
        assert_eq!(ChainPriority::NatDest.value(), -100);
        assert_eq!(ChainPriority::Filter.value(), 0);
        assert_eq!(ChainPriority::Security.value(), 50);
        assert_eq!(ChainPriority::NatSource.value(), 100);
        assert_eq!(ChainPriority::SelinuxLast.value(), 225);
        assert_eq!(ChainPriority::ConntrackHelper.value(), 300);
        assert_eq!(ChainPriority::ConntrackConfirm.value(), i32::MAX);
    }

    #[test]
    fn bands_are_listed_in_execution_order() {
        let mut sorted = ChainPriority::ALL;
        sorted.sort();
        assert_eq!(sorted, ChainPriority::ALL);
        assert!(ChainPriority::NatDest < ChainPriority::Filter);
        assert!(ChainPriority::SelinuxFirst < ChainPriority::SelinuxLast);
    }

    #[test]
    fn from_value_round_trips_named_bands() {
        assert_eq!(ChainPriority::from_value(-150), Some(ChainPriority::Mangle));
        assert_eq!(ChainPriority::from_value(1), None);
    }

    #[test]
    fn serializes_with_nft_names() {
        let json = serde_json::to_string(&ChainPriority::NatDest).unwrap();
        assert_eq!(json, "\"dstnat\"");
        let json = serde_json::to_string(&ChainPriority::ConntrackHelper).unwrap();
        assert_eq!(json, "\"conntrack-helper\"");
        assert_eq!(serde_json::to_string(&ChainType::Route).unwrap(), "\"route\"");
    }
}
