//! Items used by the code the derives generate. Not a public API.

use alloc::boxed::Box;
use core::any::Any;

pub use crate::hooks::{HookTable, PackHooks};
pub use crate::schema::{DynBox, EnumInfo, EnumVariant, FieldInfo, RecordInfo, Typed};
pub use crate::schema::{GenericTypeInfoCell, NonGenericTypeInfoCell, TypeInfo};
pub use crate::schema::{UnionInfo, UnionMember};
pub use crate::value::{OpaqueValue, Value};
pub use crate::config::RecordConfig;

#[inline(always)]
pub fn boxed<T: Any>(value: T) -> DynBox {
    Box::new(value)
}

/// Takes the next constructor argument and downcasts it to `T`.
#[inline]
pub fn take<T: Any>(values: &mut impl Iterator<Item = DynBox>) -> Option<T> {
    values.next()?.downcast::<T>().ok().map(|v| *v)
}

#[cfg(feature = "auto_register")]
pub mod auto_register {
    pub use inventory;

    use crate::schema::TypeInfo;

    /// One `#[pack(auto_register)]` record, collected at link time.
    pub struct AutoRegistration {
        pub type_info: fn() -> &'static TypeInfo,
    }

    inventory::collect!(AutoRegistration);
}

#[cfg(feature = "auto_register")]
pub use auto_register::AutoRegistration;
