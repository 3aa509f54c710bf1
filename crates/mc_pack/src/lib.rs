#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The derives emit `::mc_pack::...` paths; this alias lets the crate use its
// own derives in tests and doc tests.
extern crate self as mc_pack;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod config;
mod engine;
mod ext;
mod flags;
mod hooks;

pub mod error;
pub mod impls;
pub mod schema;
pub mod value;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use mc_pack_derive as derive;

pub use config::RecordConfig;
pub use engine::{DebugSink, PackRegistry, RoutinePair};
pub use error::{DecodeError, PackError, RegistrationError, UnpackError, UsageError};
pub use ext::PackExt;
pub use flags::Flags;
pub use hooks::{HookError, HookTable, PackHooks};
pub use value::{Map, Value};

#[cfg(test)]
mod tests;
