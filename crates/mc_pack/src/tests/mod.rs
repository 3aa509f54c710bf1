//! Behavior of registered records, driven through the derives.

mod hooks;
mod modes;
mod omit_absent;
mod records;
mod registry;

use crate::PackRegistry;
use crate::schema::Typed;

/// A fresh registry with `T` registered.
fn registry_with<T: Typed>() -> PackRegistry {
    let registry = PackRegistry::new();
    registry.register::<T>().unwrap();
    registry
}
