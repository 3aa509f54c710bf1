use alloc::sync::Arc;
use core::any::{Any, type_name};
use core::fmt;

// -----------------------------------------------------------------------------
// OpaqueValue

/// A native value carried through a packed mapping untouched.
///
/// Pass-through strategies (`use_enum`, opaque fields) store the original Rust
/// value here instead of converting it. Cloning is cheap: the value is shared.
///
/// # Examples
///
/// ```
/// use mc_pack::value::OpaqueValue;
///
/// let v = OpaqueValue::new(7_u8);
/// assert_eq!(v.downcast_ref::<u8>(), Some(&7));
/// assert!(v.type_name().ends_with("u8"));
/// ```
#[derive(Clone)]
pub struct OpaqueValue {
    type_name: &'static str,
    value: Arc<dyn Any + Send + Sync>,
}

impl OpaqueValue {
    /// Wraps `value`.
    #[inline]
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            value: Arc::new(value),
        }
    }

    /// Returns the type name of the wrapped value.
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the wrapped value as `&dyn Any`.
    #[inline]
    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    /// Returns `true` if the wrapped value is a `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Returns the wrapped value if it is a `T`.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }
}

impl PartialEq for OpaqueValue {
    /// Two opaque values are equal only if they share the same allocation.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for OpaqueValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({})", self.type_name)
    }
}
