use crate::family::TableFamily;
use crate::hook::ChainHook;
use crate::keyword::ChainKeyword;
use crate::resolver::{ChainRejection, ChainRequest, ResolvedChain};

/// One cell of a family's keyword × hook table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixEntry {
    pub keyword: ChainKeyword,
    pub hook: ChainHook,
    pub outcome: Result<ResolvedChain, ChainRejection>,
}

/// Evaluate every known keyword at every hook for `family`. Rejections are
/// returned in the entries rather than logged.
pub fn compatibility_matrix(family: TableFamily) -> Vec<MatrixEntry> {
    ChainKeyword::ALL
        .into_iter()
        .flat_map(|keyword| {
            ChainHook::ALL.into_iter().map(move |hook| MatrixEntry {
                keyword,
                hook,
                outcome: ChainRequest::new(family, Some(keyword), hook).evaluate(),
            })
        })
        .collect()
}
