use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::{self, Display};
use core::str::FromStr;

use crate::schema::{DynBox, Type};
use crate::value::{OpaqueValue, Temporal, TemporalKind, Value};

// -----------------------------------------------------------------------------
// PrimitiveInfo

/// The primitive families a [`PrimitiveInfo`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Bool,
    Char,
    Int,
    UInt,
    Float,
    Str,
    Unit,
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.pad("bool"),
            Self::Char => f.pad("char"),
            Self::Int => f.pad("int"),
            Self::UInt => f.pad("uint"),
            Self::Float => f.pad("float"),
            Self::Str => f.pad("str"),
            Self::Unit => f.pad("unit"),
        }
    }
}

/// Describes a scalar that packs to itself.
///
/// `from_value` performs the type check: it returns `None` when the packed
/// value has the wrong kind or does not fit the target type.
#[derive(Clone, Debug)]
pub struct PrimitiveInfo {
    ty: Type,
    kind: PrimitiveKind,
    to_value: fn(&dyn Any) -> Option<Value>,
    from_value: fn(&Value) -> Option<DynBox>,
}

impl PrimitiveInfo {
    #[inline]
    pub fn new<T: Any>(
        kind: PrimitiveKind,
        to_value: fn(&dyn Any) -> Option<Value>,
        from_value: fn(&Value) -> Option<DynBox>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            to_value,
            from_value,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[inline]
    pub fn to_value(&self, value: &dyn Any) -> Option<Value> {
        (self.to_value)(value)
    }

    #[inline]
    pub fn from_value(&self, value: &Value) -> Option<DynBox> {
        (self.from_value)(value)
    }
}

// -----------------------------------------------------------------------------
// BytesInfo

/// Describes a byte sequence (`bytes::Bytes`, `bytes::BytesMut`).
///
/// Packs to base64 text, or to [`Value::Bytes`] under `use_bytes`.
#[derive(Clone, Debug)]
pub struct BytesInfo {
    ty: Type,
    as_bytes: fn(&dyn Any) -> Option<&[u8]>,
    from_vec: fn(Vec<u8>) -> DynBox,
}

fn bytes_of<T: AsRef<[u8]> + Any>(value: &dyn Any) -> Option<&[u8]> {
    value.downcast_ref::<T>().map(AsRef::as_ref)
}

fn bytes_from<T: From<Vec<u8>> + Any>(bytes: Vec<u8>) -> DynBox {
    Box::new(T::from(bytes))
}

impl BytesInfo {
    /// Creates a [`BytesInfo`] with an explicit constructor.
    #[inline]
    pub fn new<T: AsRef<[u8]> + Any>(from_vec: fn(Vec<u8>) -> DynBox) -> Self {
        Self {
            ty: Type::of::<T>(),
            as_bytes: bytes_of::<T>,
            from_vec,
        }
    }

    /// Creates a [`BytesInfo`] for a type buildable from `Vec<u8>`.
    #[inline]
    pub fn of<T: AsRef<[u8]> + From<Vec<u8>> + Any>() -> Self {
        Self::new::<T>(bytes_from::<T>)
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn as_bytes<'a>(&self, value: &'a dyn Any) -> Option<&'a [u8]> {
        (self.as_bytes)(value)
    }

    #[inline]
    pub fn from_vec(&self, bytes: Vec<u8>) -> DynBox {
        (self.from_vec)(bytes)
    }
}

// -----------------------------------------------------------------------------
// TemporalInfo

/// Describes a chrono date/time type.
///
/// Packs to ISO-8601 text, or to [`Value::Temporal`] under `use_datetime`.
#[derive(Clone, Debug)]
pub struct TemporalInfo {
    ty: Type,
    kind: TemporalKind,
    to_temporal: fn(&dyn Any) -> Option<Temporal>,
    from_temporal: fn(&Temporal) -> Option<DynBox>,
}

impl TemporalInfo {
    #[inline]
    pub fn new<T: Any>(
        kind: TemporalKind,
        to_temporal: fn(&dyn Any) -> Option<Temporal>,
        from_temporal: fn(&Temporal) -> Option<DynBox>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            kind,
            to_temporal,
            from_temporal,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn kind(&self) -> TemporalKind {
        self.kind
    }

    #[inline]
    pub fn to_temporal(&self, value: &dyn Any) -> Option<Temporal> {
        (self.to_temporal)(value)
    }

    #[inline]
    pub fn from_temporal(&self, value: &Temporal) -> Option<DynBox> {
        (self.from_temporal)(value)
    }
}

// -----------------------------------------------------------------------------
// TextInfo

/// Describes a type with a canonical text form (`Display` + `FromStr`).
#[derive(Clone, Debug)]
pub struct TextInfo {
    ty: Type,
    to_text: fn(&dyn Any) -> Option<String>,
    parse: fn(&str) -> Result<DynBox, String>,
}

fn text_of<T: Display + Any>(value: &dyn Any) -> Option<String> {
    value.downcast_ref::<T>().map(ToString::to_string)
}

fn text_parse<T>(text: &str) -> Result<DynBox, String>
where
    T: FromStr + Any,
    T::Err: Display,
{
    match text.parse::<T>() {
        Ok(v) => Ok(Box::new(v)),
        Err(e) => Err(e.to_string()),
    }
}

impl TextInfo {
    #[inline]
    pub fn new<T>() -> Self
    where
        T: Display + FromStr + Any,
        T::Err: Display,
    {
        Self {
            ty: Type::of::<T>(),
            to_text: text_of::<T>,
            parse: text_parse::<T>,
        }
    }

    /// Creates a [`TextInfo`] from explicit conversions, for types without
    /// `Display` (such as `PathBuf`).
    #[inline]
    pub fn with_fns<T: Any>(
        to_text: fn(&dyn Any) -> Option<String>,
        parse: fn(&str) -> Result<DynBox, String>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            to_text,
            parse,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn to_text(&self, value: &dyn Any) -> Option<String> {
        (self.to_text)(value)
    }

    /// Parses `text`, returning the parser's message on failure.
    #[inline]
    pub fn parse(&self, text: &str) -> Result<DynBox, String> {
        (self.parse)(text)
    }
}

// -----------------------------------------------------------------------------
// OpaqueInfo

/// Describes a type the engine does not look into.
///
/// The value is copied as-is in both directions; whether it survives the trip
/// through a [`Map`](crate::Map) is up to the type.
#[derive(Clone, Debug)]
pub struct OpaqueInfo {
    ty: Type,
    to_value: fn(&dyn Any) -> Option<Value>,
    from_value: fn(&Value) -> Option<DynBox>,
}

fn share<T: Clone + Send + Sync + Any>(value: &dyn Any) -> Option<Value> {
    value
        .downcast_ref::<T>()
        .map(|v| Value::Opaque(OpaqueValue::new(v.clone())))
}

fn unshare<T: Clone + Any>(value: &Value) -> Option<DynBox> {
    let v = value.as_opaque()?.downcast_ref::<T>()?;
    Some(Box::new(v.clone()))
}

impl OpaqueInfo {
    #[inline]
    pub fn new<T: Any>(
        to_value: fn(&dyn Any) -> Option<Value>,
        from_value: fn(&Value) -> Option<DynBox>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            to_value,
            from_value,
        }
    }

    /// Creates an [`OpaqueInfo`] that carries `T` inside [`Value::Opaque`].
    #[inline]
    pub fn shared<T: Clone + Send + Sync + Any>() -> Self {
        Self::new::<T>(share::<T>, unshare::<T>)
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn to_value(&self, value: &dyn Any) -> Option<Value> {
        (self.to_value)(value)
    }

    #[inline]
    pub fn from_value(&self, value: &Value) -> Option<DynBox> {
        (self.from_value)(value)
    }
}
