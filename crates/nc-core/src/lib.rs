// Base chain family, hook, type and priority resolution for nftables
pub mod config;
pub mod family;
pub mod hook;
pub mod keyword;
pub mod loader;
pub mod matrix;
pub mod priority;
pub mod resolver;
pub mod validator;

pub use config::{ChainConfig, ChainDecl, ChainPolicy, TableConfig};
pub use family::TableFamily;
pub use hook::ChainHook;
pub use keyword::ChainKeyword;
pub use loader::ConfigLoader;
pub use matrix::{MatrixEntry, compatibility_matrix};
pub use priority::{ChainPriority, ChainType};
pub use resolver::{
    ChainRejection, ChainRequest, ResolvedChain, chain_priority, conntrack_priority, resolve_chain,
};
pub use validator::{ChainValidator, ValidationWarning};
