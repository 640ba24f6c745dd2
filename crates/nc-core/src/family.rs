use serde::{Deserialize, Serialize};
use std::fmt;

/// nftables table family, carrying its `NFPROTO_*` code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum TableFamily {
    /// IPv4 and IPv6 together.
    #[default]
    Inet = 1,
    #[serde(rename = "ip")]
    Ipv4 = 2,
    Arp = 3,
    Netdev = 5,
    Bridge = 7,
    #[serde(rename = "ip6")]
    Ipv6 = 10,
}

impl TableFamily {
    pub const ALL: [TableFamily; 6] = [
        Self::Inet,
        Self::Ipv4,
        Self::Ipv6,
        Self::Arp,
        Self::Bridge,
        Self::Netdev,
    ];

    /// Look up a family keyword, returning `None` when it isn't one.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = keyword.trim();
        Self::ALL
            .into_iter()
            .find(|family| family.as_str().eq_ignore_ascii_case(keyword))
    }

    /// Resolve a family keyword, falling back to `inet` for anything unknown.
    pub fn resolve(keyword: &str) -> Self {
        Self::from_keyword(keyword).unwrap_or_default()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inet => "inet",
            Self::Ipv4 => "ip",
            Self::Ipv6 => "ip6",
            Self::Arp => "arp",
            Self::Bridge => "bridge",
            Self::Netdev => "netdev",
        }
    }
}

impl fmt::Display for TableFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
