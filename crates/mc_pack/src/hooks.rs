use alloc::boxed::Box;
use alloc::string::String;
use core::any::Any;
use core::error::Error;
use core::fmt;

use thiserror::Error;

use crate::error::{PackError, UnpackError};
use crate::schema::DynBox;
use crate::value::Map;

// -----------------------------------------------------------------------------
// HookError

/// A failure raised by a [`PackHooks`] method.
///
/// It aborts the call and reaches the caller unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl HookError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    #[inline]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

// -----------------------------------------------------------------------------
// PackHooks

/// Customization points run around a record's compiled routines.
///
/// Each call runs the hooks exactly once, in this order:
///
/// - pack: `pre_pack` -> compiled pack -> `post_pack`
/// - unpack: `pre_unpack` -> compiled unpack -> `post_unpack`
///
/// Every method defaults to a no-op. Opt in with `#[pack(hooks)]` on the
/// derive and implement the methods you need.
///
/// # Examples
///
/// ```
/// use mc_pack::derive::Record;
/// use mc_pack::{Flags, HookError, Map, PackHooks, PackRegistry, Value};
///
/// #[derive(Record, Debug, PartialEq)]
/// #[pack(hooks)]
/// struct Version {
///     major: u32,
/// }
///
/// impl PackHooks for Version {
///     fn post_pack(&self, mut map: Map) -> Result<Map, HookError> {
///         map.insert("schema", Value::from("v1"));
///         Ok(map)
///     }
///
///     fn pre_unpack(mut map: Map) -> Result<Map, HookError> {
///         match map.remove("schema") {
///             Some(Value::Str(s)) if s == "v1" => Ok(map),
///             _ => Err(HookError::new("unsupported schema")),
///         }
///     }
/// }
///
/// let registry = PackRegistry::new();
/// registry.register::<Version>().unwrap();
///
/// let map = registry.pack(&Version { major: 3 }, Flags::empty()).unwrap();
/// assert_eq!(map.get("schema"), Some(&Value::from("v1")));
/// assert_eq!(registry.unpack::<Version>(map, Flags::empty()).unwrap(), Version { major: 3 });
/// ```
pub trait PackHooks: Sized {
    /// Runs before packing. Returning `Some` packs the replacement instead.
    #[inline]
    fn pre_pack(&self) -> Result<Option<Self>, HookError> {
        Ok(None)
    }

    /// Runs on the packed mapping before it is returned.
    #[inline]
    fn post_pack(&self, map: Map) -> Result<Map, HookError> {
        Ok(map)
    }

    /// Runs on the input mapping before it is unpacked.
    #[inline]
    fn pre_unpack(map: Map) -> Result<Map, HookError> {
        Ok(map)
    }

    /// Runs on the unpacked instance before it is returned.
    #[inline]
    fn post_unpack(self) -> Result<Self, HookError> {
        Ok(self)
    }
}

// -----------------------------------------------------------------------------
// HookTable

type PrePackFn = fn(&dyn Any) -> Result<Option<DynBox>, HookError>;
type PostPackFn = fn(&dyn Any, Map) -> Result<Map, HookError>;
type PreUnpackFn = fn(Map) -> Result<Map, HookError>;
type PostUnpackFn = fn(DynBox) -> Result<DynBox, HookError>;

/// The type-erased [`PackHooks`] of a record, stored in its
/// [`RecordInfo`](crate::schema::RecordInfo).
#[derive(Clone, Copy)]
pub struct HookTable {
    hooks: Option<Erased>,
}

#[derive(Clone, Copy)]
struct Erased {
    pre_pack: PrePackFn,
    post_pack: PostPackFn,
    pre_unpack: PreUnpackFn,
    post_unpack: PostUnpackFn,
}

fn wrong_type<T>() -> HookError {
    HookError::new(alloc::format!(
        "hook received a value that is not a `{}`",
        core::any::type_name::<T>()
    ))
}

fn erased_pre_pack<T: PackHooks + Any>(value: &dyn Any) -> Result<Option<DynBox>, HookError> {
    let value = value.downcast_ref::<T>().ok_or_else(wrong_type::<T>)?;
    Ok(value.pre_pack()?.map(|v| Box::new(v) as DynBox))
}

fn erased_post_pack<T: PackHooks + Any>(value: &dyn Any, map: Map) -> Result<Map, HookError> {
    let value = value.downcast_ref::<T>().ok_or_else(wrong_type::<T>)?;
    value.post_pack(map)
}

fn erased_post_unpack<T: PackHooks + Any>(value: DynBox) -> Result<DynBox, HookError> {
    let value = value.downcast::<T>().map_err(|_| wrong_type::<T>())?;
    Ok(Box::new((*value).post_unpack()?))
}

impl HookTable {
    /// No hooks: the compiled core runs alone.
    #[inline]
    pub const fn none() -> Self {
        Self { hooks: None }
    }

    /// The hooks of `T`.
    #[inline]
    pub fn of<T: PackHooks + Any>() -> Self {
        Self {
            hooks: Some(Erased {
                pre_pack: erased_pre_pack::<T>,
                post_pack: erased_post_pack::<T>,
                pre_unpack: T::pre_unpack,
                post_unpack: erased_post_unpack::<T>,
            }),
        }
    }

    #[inline]
    pub const fn is_none(&self) -> bool {
        self.hooks.is_none()
    }

    /// Runs `core` between `pre_pack` and `post_pack`.
    pub(crate) fn pack(
        &self,
        value: &dyn Any,
        core: impl FnOnce(&dyn Any) -> Result<Map, PackError>,
    ) -> Result<Map, PackError> {
        let Some(hooks) = &self.hooks else {
            return core(value);
        };
        let replaced = (hooks.pre_pack)(value)?;
        let value: &dyn Any = match &replaced {
            Some(v) => &**v,
            None => value,
        };
        let map = core(value)?;
        Ok((hooks.post_pack)(value, map)?)
    }

    /// Runs `core` between `pre_unpack` and `post_unpack`.
    pub(crate) fn unpack(
        &self,
        map: Map,
        core: impl FnOnce(Map) -> Result<DynBox, UnpackError>,
    ) -> Result<DynBox, UnpackError> {
        let Some(hooks) = &self.hooks else {
            return core(map);
        };
        let map = (hooks.pre_unpack)(map)?;
        let value = core(map)?;
        Ok((hooks.post_unpack)(value)?)
    }
}

impl fmt::Debug for HookTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookTable")
            .field("enabled", &self.hooks.is_some())
            .finish()
    }
}
