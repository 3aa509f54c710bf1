use core::fmt;

use crate::schema::{BytesInfo, EnumInfo, ListInfo, MapInfo, OpaqueInfo, OptionInfo};
use crate::schema::{PointerInfo, PrimitiveInfo, RecordInfo, TemporalInfo, TextInfo};
use crate::schema::{Type, UnionInfo};

// -----------------------------------------------------------------------------
// TypeKind

/// The shape family of a [`TypeInfo`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Primitive,
    Option,
    Union,
    Pointer,
    List,
    Map,
    Record,
    Enum,
    Bytes,
    Temporal,
    Text,
    Opaque,
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive => f.pad("Primitive"),
            Self::Option => f.pad("Option"),
            Self::Union => f.pad("Union"),
            Self::Pointer => f.pad("Pointer"),
            Self::List => f.pad("List"),
            Self::Map => f.pad("Map"),
            Self::Record => f.pad("Record"),
            Self::Enum => f.pad("Enum"),
            Self::Bytes => f.pad("Bytes"),
            Self::Temporal => f.pad("Temporal"),
            Self::Text => f.pad("Text"),
            Self::Opaque => f.pad("Opaque"),
        }
    }
}

// -----------------------------------------------------------------------------
// TypeInfo

/// The static description of a type, as read by the routine compiler.
///
/// Obtained through [`Typed::type_info`](crate::schema::Typed::type_info).
/// Every variant carries the type's identity and type-erased access functions;
/// nested type information is reached lazily through function pointers, so
/// self-referential types describe themselves without recursion.
///
/// # Examples
///
/// ```
/// use mc_pack::schema::{TypeKind, Typed};
///
/// assert_eq!(<Option<u8>>::type_info().kind(), TypeKind::Option);
/// assert_eq!(<Vec<String>>::type_info().kind(), TypeKind::List);
/// assert_eq!(String::type_info().kind(), TypeKind::Primitive);
/// ```
#[derive(Debug, Clone)]
pub enum TypeInfo {
    Primitive(PrimitiveInfo),
    Option(OptionInfo),
    Union(UnionInfo),
    Pointer(PointerInfo),
    List(ListInfo),
    Map(MapInfo),
    Record(RecordInfo),
    Enum(EnumInfo),
    Bytes(BytesInfo),
    Temporal(TemporalInfo),
    Text(TextInfo),
    Opaque(OpaqueInfo),
}

// Helper macro that implements accessor methods like `as_record`.
macro_rules! impl_cast_method {
    ($name:ident : $kind:ident => $info:ident) => {
        #[doc = concat!("Returns the [`", stringify!($info), "`] if this is a `", stringify!($kind), "`.")]
        #[inline]
        pub const fn $name(&self) -> Option<&$info> {
            match self {
                Self::$kind(info) => Some(info),
                _ => None,
            }
        }
    };
}

impl TypeInfo {
    impl_cast_method!(as_primitive: Primitive => PrimitiveInfo);
    impl_cast_method!(as_option: Option => OptionInfo);
    impl_cast_method!(as_union: Union => UnionInfo);
    impl_cast_method!(as_pointer: Pointer => PointerInfo);
    impl_cast_method!(as_list: List => ListInfo);
    impl_cast_method!(as_map: Map => MapInfo);
    impl_cast_method!(as_record: Record => RecordInfo);
    impl_cast_method!(as_enum: Enum => EnumInfo);
    impl_cast_method!(as_bytes: Bytes => BytesInfo);
    impl_cast_method!(as_temporal: Temporal => TemporalInfo);
    impl_cast_method!(as_text: Text => TextInfo);
    impl_cast_method!(as_opaque: Opaque => OpaqueInfo);

    /// Returns the underlying [`Type`].
    pub const fn ty(&self) -> &Type {
        match self {
            Self::Primitive(info) => info.ty(),
            Self::Option(info) => info.ty(),
            Self::Union(info) => info.ty(),
            Self::Pointer(info) => info.ty(),
            Self::List(info) => info.ty(),
            Self::Map(info) => info.ty(),
            Self::Record(info) => info.ty(),
            Self::Enum(info) => info.ty(),
            Self::Bytes(info) => info.ty(),
            Self::Temporal(info) => info.ty(),
            Self::Text(info) => info.ty(),
            Self::Opaque(info) => info.ty(),
        }
    }

    /// Returns the [`TypeKind`].
    pub const fn kind(&self) -> TypeKind {
        match self {
            Self::Primitive(_) => TypeKind::Primitive,
            Self::Option(_) => TypeKind::Option,
            Self::Union(_) => TypeKind::Union,
            Self::Pointer(_) => TypeKind::Pointer,
            Self::List(_) => TypeKind::List,
            Self::Map(_) => TypeKind::Map,
            Self::Record(_) => TypeKind::Record,
            Self::Enum(_) => TypeKind::Enum,
            Self::Bytes(_) => TypeKind::Bytes,
            Self::Temporal(_) => TypeKind::Temporal,
            Self::Text(_) => TypeKind::Text,
            Self::Opaque(_) => TypeKind::Opaque,
        }
    }

    /// Shorthand for `self.ty().name()`.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.ty().name()
    }
}
