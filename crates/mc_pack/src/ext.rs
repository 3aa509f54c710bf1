use crate::error::{PackError, RegistrationError, UnpackError};
use crate::flags::Flags;
use crate::schema::Typed;
use crate::value::Map;
use crate::{PackRegistry, RecordConfig};

/// Method-style access to the [global registry](PackRegistry::global).
///
/// Implemented for every [`Typed`] type; only records can actually be packed.
/// The first call registers the type with its declared configuration.
///
/// # Examples
///
/// ```
/// use mc_pack::derive::Record;
/// use mc_pack::{PackExt, Value};
///
/// #[derive(Record, Debug, PartialEq)]
/// struct User {
///     name: String,
///     age: Option<u8>,
/// }
///
/// let user = User { name: "ada".into(), age: None };
/// let map = user.to_map().unwrap();
/// assert_eq!(map.get("age"), Some(&Value::Null));
/// assert_eq!(User::from_map(map).unwrap(), user);
/// ```
pub trait PackExt: Typed + Sized {
    /// Registers `Self` in the global registry if needed.
    #[inline]
    fn ensure_registered() -> Result<(), RegistrationError> {
        PackRegistry::global().register::<Self>()
    }

    /// Packs with no flags.
    #[inline]
    fn to_map(&self) -> Result<Map, PackError> {
        self.to_map_with(Flags::empty())
    }

    fn to_map_with(&self, flags: Flags) -> Result<Map, PackError> {
        let registry = PackRegistry::global();
        if !registry.is_registered::<Self>() {
            Self::ensure_registered()?;
        }
        registry.pack(self, flags)
    }

    /// Unpacks with no flags.
    #[inline]
    fn from_map(map: Map) -> Result<Self, UnpackError> {
        Self::from_map_with(map, Flags::empty())
    }

    fn from_map_with(map: Map, flags: Flags) -> Result<Self, UnpackError> {
        let registry = PackRegistry::global();
        if !registry.is_registered::<Self>() {
            Self::ensure_registered()?;
        }
        registry.unpack(map, flags)
    }

    /// The configuration `Self` is compiled with in the global registry.
    #[inline]
    fn pack_config() -> Option<RecordConfig> {
        PackRegistry::global().config_of::<Self>()
    }
}

impl<T: Typed> PackExt for T {}
