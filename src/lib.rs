#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use mc_pack as pack;
pub use mc_utils as utils;

/// Commonly used items, for `use mapcast::prelude::*`.
pub mod prelude {
    pub use mc_pack::derive::{Alternative, Enumeration, Record};
    pub use mc_pack::{Flags, HookError, Map, PackExt, PackHooks, PackRegistry, RecordConfig, Value};
}
