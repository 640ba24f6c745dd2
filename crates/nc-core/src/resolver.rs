//! Base chain priority and type resolution.
//!
//! Encodes the family/hook/type compatibility matrix from the nft manpage:
//! <https://www.netfilter.org/projects/nftables/manpage.html#lbAQ>
//! and the per-hook priorities from the nftables wiki:
//! <https://wiki.nftables.org/wiki-nftables/index.php/Netfilter_hooks#Priority_within_hook>

use crate::family::TableFamily;
use crate::hook::ChainHook;
use crate::keyword::ChainKeyword;
use crate::priority::{ChainPriority, ChainType};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Why a (family, chain, hook) combination cannot become a base chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainRejection {
    #[error("invalid nat combination of tables and hooks. chain: {keyword}, hook: {hook}")]
    NatOnForward {
        keyword: ChainKeyword,
        hook: ChainHook,
    },
    #[error(
        "invalid netdev combination of tables and hooks. chain: {}, hook: {hook}",
        keyword_label(.keyword)
    )]
    Netdev {
        keyword: Option<ChainKeyword>,
        hook: ChainHook,
    },
    #[error(
        "invalid arp combination of tables and hooks. chain: {}, hook: {hook}",
        keyword_label(.keyword)
    )]
    Arp {
        keyword: Option<ChainKeyword>,
        hook: ChainHook,
    },
    #[error(
        "invalid bridge combination of tables and hooks. chain: {}, hook: {hook}",
        keyword_label(.keyword)
    )]
    Bridge {
        keyword: Option<ChainKeyword>,
        hook: ChainHook,
    },
}

fn keyword_label(keyword: &Option<ChainKeyword>) -> &'static str {
    keyword.map_or("unknown", ChainKeyword::as_str)
}

/// A normalized request for a base chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainRequest {
    pub family: TableFamily,
    /// `None` for keywords outside the known set.
    pub keyword: Option<ChainKeyword>,
    pub hook: ChainHook,
}

/// Everything a chain builder needs to create the base chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedChain {
    pub family: TableFamily,
    pub keyword: Option<ChainKeyword>,
    pub hook: ChainHook,
    #[serde(rename = "type")]
    pub chain_type: ChainType,
    pub priority: ChainPriority,
}

impl ResolvedChain {
    pub fn family_code(&self) -> u8 {
        self.family.code()
    }

    pub fn hook_number(&self) -> u32 {
        self.hook.number()
    }

    pub fn priority_value(&self) -> i32 {
        self.priority.value()
    }
}

impl ChainRequest {
    pub fn new(family: TableFamily, keyword: Option<ChainKeyword>, hook: ChainHook) -> Self {
        Self {
            family,
            keyword,
            hook,
        }
    }

    /// Normalize configuration strings. Unknown families become `inet`,
    /// unknown hooks become `output`.
    pub fn parse(family: &str, keyword: &str, hook: &str) -> Self {
        Self::new(
            TableFamily::resolve(family),
            ChainKeyword::from_keyword(keyword),
            ChainHook::resolve(hook),
        )
    }

    /// Check the combination against the family and hook constraints.
    pub fn validate(&self) -> Result<(), ChainRejection> {
        let Self {
            family,
            keyword,
            hook,
        } = *self;
        let is_filter = keyword == Some(ChainKeyword::Filter);

        if let Some(nat) = keyword.filter(|k| k.is_nat())
            && hook == ChainHook::Forward
        {
            return Err(ChainRejection::NatOnForward { keyword: nat, hook });
        }

        match family {
            TableFamily::Netdev
                if !is_filter || !matches!(hook, ChainHook::Ingress | ChainHook::Egress) =>
            {
                Err(ChainRejection::Netdev { keyword, hook })
            }
            TableFamily::Arp
                if !is_filter || !matches!(hook, ChainHook::Input | ChainHook::Output) =>
            {
                Err(ChainRejection::Arp { keyword, hook })
            }
            TableFamily::Bridge
                if !is_filter || matches!(hook, ChainHook::Ingress | ChainHook::Egress) =>
            {
                Err(ChainRejection::Bridge { keyword, hook })
            }
            _ => Ok(()),
        }
    }

    /// Validate and compute priority and type without logging.
    pub fn evaluate(&self) -> Result<ResolvedChain, ChainRejection> {
        self.validate()?;
        let (priority, chain_type) = priority_for(self.family, self.keyword, self.hook);

        Ok(ResolvedChain {
            family: self.family,
            keyword: self.keyword,
            hook: self.hook,
            chain_type,
            priority,
        })
    }

    /// Like [`evaluate`](Self::evaluate), reporting rejections as warnings.
    pub fn resolve(&self) -> Result<ResolvedChain, ChainRejection> {
        self.evaluate()
            .inspect(|resolved| {
                debug!(
                    family = %resolved.family,
                    chain = keyword_label(&resolved.keyword),
                    hook = %resolved.hook,
                    chain_type = %resolved.chain_type,
                    priority = resolved.priority_value(),
                    "resolved base chain"
                );
            })
            .inspect_err(|rejection| warn!("[nftables] {rejection}"))
    }
}

/// Resolve configuration strings straight to a base chain.
pub fn resolve_chain(
    family: &str,
    keyword: &str,
    hook: &str,
) -> Result<ResolvedChain, ChainRejection> {
    ChainRequest::parse(family, keyword, hook).resolve()
}

/// Priority and type for a chain, or the reason it can't be created.
pub fn chain_priority(
    family: &str,
    keyword: &str,
    hook: &str,
) -> Result<(ChainPriority, ChainType), ChainRejection> {
    resolve_chain(family, keyword, hook).map(|chain| (chain.priority, chain.chain_type))
}

fn priority_for(
    family: TableFamily,
    keyword: Option<ChainKeyword>,
    hook: ChainHook,
) -> (ChainPriority, ChainType) {
    match keyword {
        Some(ChainKeyword::Filter) if family == TableFamily::Bridge => {
            (bridge_filter_priority(hook), ChainType::Filter)
        }
        // route has mangle semantics but only exists at output; other hooks
        // keep a filter chain at mangle priority
        Some(ChainKeyword::Mangle) if hook == ChainHook::Output => {
            (ChainPriority::Mangle, ChainType::Route)
        }
        Some(ChainKeyword::Mangle) => (ChainPriority::Mangle, ChainType::Filter),
        Some(ChainKeyword::Raw) => (ChainPriority::Raw, ChainType::Filter),
        Some(ChainKeyword::Conntrack) => conntrack_priority(hook),
        Some(ChainKeyword::NatDest) => (ChainPriority::NatDest, ChainType::Nat),
        Some(ChainKeyword::NatSource) => (ChainPriority::NatSource, ChainType::Nat),
        Some(ChainKeyword::Security) => (ChainPriority::Security, ChainType::Filter),
        // labelling of outgoing packets happens after everything else
        Some(ChainKeyword::Selinux) if hook == ChainHook::Postrouting => {
            (ChainPriority::SelinuxLast, ChainType::Filter)
        }
        Some(ChainKeyword::Selinux) => (ChainPriority::SelinuxFirst, ChainType::Filter),
        Some(ChainKeyword::Filter) | None => (ChainPriority::Filter, ChainType::Filter),
    }
}

/// Bridge family priorities (`NF_BR_PRI_*`) expressed as the nearest band.
fn bridge_filter_priority(hook: ChainHook) -> ChainPriority {
    match hook {
        // dstnat, -300
        ChainHook::Prerouting => ChainPriority::Raw,
        // out, 100
        ChainHook::Output => ChainPriority::NatSource,
        // srcnat, 300
        ChainHook::Postrouting => ChainPriority::ConntrackHelper,
        // filter, -200
        _ => ChainPriority::Conntrack,
    }
}

/// Priority and type of a connection tracking chain at `hook`.
pub fn conntrack_priority(hook: ChainHook) -> (ChainPriority, ChainType) {
    match hook {
        // a nat type chain is not allowed here on prerouting
        ChainHook::Prerouting | ChainHook::Output => (ChainPriority::Conntrack, ChainType::Filter),
        ChainHook::Postrouting => (ChainPriority::ConntrackHelper, ChainType::Nat),
        ChainHook::Input => (ChainPriority::ConntrackConfirm, ChainType::Filter),
        _ => (ChainPriority::Conntrack, ChainType::Filter),
    }
}
