//! Tools for the `mapcast` proc-macro crates.
#![allow(clippy::std_instead_of_core, reason = "proc-macro support crate")]

// -----------------------------------------------------------------------------
// Modules

mod manifest;

// -----------------------------------------------------------------------------
// Exports

pub use manifest::Manifest;
