//! The routine engine.
//!
//! Registration runs a record through four stages:
//!
//! 1. [`resolve`]: each field's [`TypeInfo`](crate::schema::TypeInfo) becomes
//!    a normalized type expression.
//! 2. [`strategy`]: each expression plus the record configuration becomes a
//!    pack/unpack closure pair.
//! 3. [`compile`]: the field strategies become the record's [`RoutinePair`].
//! 4. [`registry`]: pairs are cached per type and published atomically.

// -----------------------------------------------------------------------------
// Modules

mod compile;
mod registry;
mod render;
mod resolve;
mod strategy;

// -----------------------------------------------------------------------------
// Exports

pub use compile::RoutinePair;
pub use registry::{DebugSink, PackRegistry};
