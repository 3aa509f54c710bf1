//! Static type descriptions the routine compiler reads.
//!
//! A type takes part in packing by implementing [`Typed`], which hands out a
//! `&'static` [`TypeInfo`]. The info names the type's shape family and carries
//! type-erased functions over `&dyn Any` / `Box<dyn Any>` that let compiled
//! routines read and rebuild values without knowing the concrete type.
//!
//! Implementations for standard, `bytes`, `chrono` and `uuid` types live in
//! [`crate::impls`]; records, enumerations and alternatives use the derives.

// -----------------------------------------------------------------------------
// Modules

mod cell;
mod container_info;
mod enum_info;
mod record_info;
mod scalar_info;
mod ty;
mod type_info;
mod typed;
mod wrapper_info;

// -----------------------------------------------------------------------------
// Exports

pub use cell::{GenericTypeInfoCell, NonGenericTypeInfoCell};
pub use container_info::{EntryIter, ItemIter, ListInfo, ListKind, MapInfo};
pub use enum_info::{EnumInfo, EnumVariant};
pub use record_info::{FieldFlags, FieldInfo, RecordInfo};
pub use scalar_info::{BytesInfo, OpaqueInfo, PrimitiveInfo, PrimitiveKind, TemporalInfo, TextInfo};
pub use ty::Type;
pub use type_info::{TypeInfo, TypeKind};
pub use typed::{DynBox, Typed};
pub use wrapper_info::{OptionInfo, PointerInfo, PointerKind, UnionInfo, UnionMember};
