use core::any::Any;

use crate::schema::{GenericTypeInfoCell, OpaqueInfo, TypeInfo};

/// The [`TypeInfo`] used for `#[pack(opaque)]` fields of type `T`.
///
/// `T` needs no [`Typed`](crate::schema::Typed) impl: the value travels
/// through the packed mapping as [`Value::Opaque`](crate::Value).
pub fn opaque_type_info<T: Clone + Send + Sync + Any>() -> &'static TypeInfo {
    static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
    CELL.get_or_insert::<T>(|| TypeInfo::Opaque(OpaqueInfo::shared::<T>()))
}

/// Implements [`Typed`](crate::schema::Typed) for types that should pass
/// through packing unchanged, carried as [`Value::Opaque`](crate::Value).
///
/// The types must be `Clone + Send + Sync + 'static`.
///
/// # Examples
///
/// ```
/// use mc_pack::derive::Record;
/// use mc_pack::{Flags, PackRegistry, Value, impl_opaque};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Handle(u32);
///
/// impl_opaque!(Handle);
///
/// #[derive(Record, Debug, PartialEq)]
/// struct Job {
///     handle: Handle,
/// }
///
/// let registry = PackRegistry::new();
/// registry.register::<Job>().unwrap();
///
/// let map = registry.pack(&Job { handle: Handle(3) }, Flags::empty()).unwrap();
/// assert!(matches!(map.get("handle"), Some(Value::Opaque(_))));
/// assert_eq!(registry.unpack::<Job>(map, Flags::empty()).unwrap().handle, Handle(3));
/// ```
#[macro_export]
macro_rules! impl_opaque {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::schema::Typed for $ty {
            fn type_info() -> &'static $crate::schema::TypeInfo {
                $crate::impls::opaque_type_info::<$ty>()
            }
        }
    )+};
}
