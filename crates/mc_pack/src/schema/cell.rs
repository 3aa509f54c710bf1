//! Containers for static storage of type information.
//!
//! For non generic types, [`NonGenericTypeInfoCell`] wraps a [`OnceLock`].
//!
//! For generic types the `static CELL` inside `type_info` is shared by every
//! instantiation, so [`GenericTypeInfoCell`] keeps a [`TypeIdMap`] behind a
//! [`RwLock`] and leaks one `TypeInfo` per concrete type.

use alloc::boxed::Box;
use core::any::{Any, TypeId};
use std::sync::{OnceLock, PoisonError, RwLock};

use mc_utils::TypeIdMap;

use crate::schema::TypeInfo;

/// Container for static storage of non-generic type information.
///
/// See [`Typed`](crate::schema::Typed) for an example.
pub struct NonGenericTypeInfoCell(OnceLock<TypeInfo>);

impl NonGenericTypeInfoCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(OnceLock::new())
    }

    /// Returns the stored info, building it with `f` on first access.
    #[inline]
    pub fn get_or_init<F>(&self, f: F) -> &TypeInfo
    where
        F: FnOnce() -> TypeInfo,
    {
        self.0.get_or_init(f)
    }
}

/// Container for static storage of type information with generics.
///
/// # Examples
///
/// ```
/// use mc_pack::schema::{GenericTypeInfoCell, OpaqueInfo, TypeInfo, Typed};
///
/// #[derive(Clone)]
/// struct Tagged<T>(T);
///
/// impl<T: Clone + Send + Sync + 'static> Typed for Tagged<T> {
///     fn type_info() -> &'static TypeInfo {
///         static CELL: GenericTypeInfoCell = GenericTypeInfoCell::new();
///         CELL.get_or_insert::<Self>(|| TypeInfo::Opaque(OpaqueInfo::shared::<Self>()))
///     }
/// }
///
/// assert!(Tagged::<u8>::type_info().ty().is::<Tagged<u8>>());
/// assert!(Tagged::<i8>::type_info().ty().is::<Tagged<i8>>());
/// ```
pub struct GenericTypeInfoCell(RwLock<TypeIdMap<&'static TypeInfo>>);

impl GenericTypeInfoCell {
    /// Creates an empty cell.
    #[inline]
    pub const fn new() -> Self {
        Self(RwLock::new(TypeIdMap::new()))
    }

    /// Returns the info stored for `G`, building it with `f` on first access.
    ///
    /// `f` runs without the lock held, so it may query other cells.
    #[inline]
    pub fn get_or_insert<G: Any + ?Sized>(&self, f: impl FnOnce() -> TypeInfo) -> &'static TypeInfo {
        self.get_or_insert_by_type_id(TypeId::of::<G>(), f)
    }

    #[inline(never)]
    fn get_or_insert_by_type_id(
        &self,
        type_id: TypeId,
        f: impl FnOnce() -> TypeInfo,
    ) -> &'static TypeInfo {
        if let Some(info) = self
            .0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return *info;
        }

        let info = f();
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        *guard.get_or_insert(type_id, || Box::leak(Box::new(info)))
    }
}
