//! The generic, in-memory representation records pack into.
//!
//! - [`Value`]: a tagged union over the shapes a packed field can take.
//! - [`Map`]: an insertion-ordered string-keyed mapping, the packed form of a record.
//! - [`Temporal`]: native date/time values (`use_datetime`).
//! - [`OpaqueValue`]: native values carried through unchanged (`use_enum`, opaque fields).
//!
//! `Value` implements `serde_core::Serialize` and `Deserialize`, so a packed
//! mapping can be written with any serde format.

// -----------------------------------------------------------------------------
// Modules

mod map;
mod opaque;
mod serde;
mod temporal;

// -----------------------------------------------------------------------------
// Exports

pub use map::Map;
pub use opaque::OpaqueValue;
pub use temporal::{Temporal, TemporalKind};

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

// -----------------------------------------------------------------------------
// ValueKind

/// The tag of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    Temporal,
    List,
    Map,
    Opaque,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.pad("null"),
            Self::Bool => f.pad("bool"),
            Self::Int => f.pad("integer"),
            Self::Float => f.pad("float"),
            Self::Str => f.pad("string"),
            Self::Bytes => f.pad("bytes"),
            Self::Temporal => f.pad("temporal"),
            Self::List => f.pad("list"),
            Self::Map => f.pad("map"),
            Self::Opaque => f.pad("opaque"),
        }
    }
}

// -----------------------------------------------------------------------------
// Value

/// A packed value.
///
/// `Null` is the absence marker: a `None` field packs to `Null`, and the
/// `OMIT_ABSENT` flag drops fields whose packed value is `Null`.
///
/// Integers keep their signedness (`Int` / `UInt`), but compare equal across
/// the two variants when they hold the same number.
#[derive(Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    Temporal(Temporal),
    List(Vec<Value>),
    Map(Map),
    Opaque(OpaqueValue),
}

impl Value {
    /// Returns the [`ValueKind`] tag.
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) | Self::UInt(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Str(_) => ValueKind::Str,
            Self::Bytes(_) => ValueKind::Bytes,
            Self::Temporal(_) => ValueKind::Temporal,
            Self::List(_) => ValueKind::List,
            Self::Map(_) => ValueKind::Map,
            Self::Opaque(_) => ValueKind::Opaque,
        }
    }

    #[inline]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[inline]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer as `i64` if it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::UInt(n) => i64::try_from(*n).ok(),
            _ => None,
        }
    }

    /// Returns the integer as `u64` if it fits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns any number as `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            Self::Int(n) => Some(*n as f64),
            Self::UInt(n) => Some(*n as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(b) => Some(b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_temporal(&self) -> Option<&Temporal> {
        match self {
            Self::Temporal(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(l) => Some(l),
            _ => None,
        }
    }

    #[inline]
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    #[inline]
    pub fn as_opaque(&self) -> Option<&OpaqueValue> {
        match self {
            Self::Opaque(o) => Some(o),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(_) | Self::UInt(_), Self::Int(_) | Self::UInt(_)) => {
                match (self.as_i64(), other.as_i64()) {
                    (Some(a), Some(b)) => a == b,
                    (None, None) => self.as_u64() == other.as_u64(),
                    _ => false,
                }
            }
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Temporal(a), Self::Temporal(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::UInt(n) => write!(f, "UInt({n})"),
            Self::Float(n) => write!(f, "Float({n:?})"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Bytes(b) => write!(f, "Bytes({b:?})"),
            Self::Temporal(t) => write!(f, "Temporal({t})"),
            Self::List(l) => f.debug_list().entries(l).finish(),
            Self::Map(m) => fmt::Debug::fmt(m, f),
            Self::Opaque(o) => fmt::Debug::fmt(o, f),
        }
    }
}

// -----------------------------------------------------------------------------
// Conversions

macro_rules! impl_from {
    ($variant:ident : $($ty:ty),* => $conv:ty) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Self::$variant(<$conv>::from(v))
                }
            }
        )*
    };
}

impl_from!(Int: i8, i16, i32, i64 => i64);
impl_from!(UInt: u8, u16, u32, u64 => u64);
impl_from!(Float: f32, f64 => f64);
impl_from!(Bool: bool => bool);
impl_from!(Str: String, &str => String);
impl_from!(Bytes: Vec<u8> => Vec<u8>);
impl_from!(Temporal: Temporal => Temporal);
impl_from!(List: Vec<Value> => Vec<Value>);
impl_from!(Map: Map => Map);
impl_from!(Opaque: OpaqueValue => OpaqueValue);

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline]
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::{Value, ValueKind};

    #[test]
    fn integers_compare_across_signedness() {
        assert_eq!(Value::Int(5), Value::UInt(5));
        assert_ne!(Value::Int(-1), Value::UInt(u64::MAX));
        assert_eq!(Value::UInt(u64::MAX), Value::UInt(u64::MAX));
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn accessors_check_ranges() {
        assert_eq!(Value::UInt(u64::MAX).as_i64(), None);
        assert_eq!(Value::Int(-3).as_u64(), None);
        assert_eq!(Value::Int(-3).as_f64(), Some(-3.0));
        assert_eq!(Value::from(None::<i32>).kind(), ValueKind::Null);
        assert_eq!(Value::from("x").as_str(), Some("x"));
    }
}
