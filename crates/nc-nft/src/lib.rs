pub mod ruleset;
pub mod table;

pub use ruleset::*;
pub use table::*;

// nftables JSON emitter for tables and base chains
