use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::schema::{DynBox, Type, TypeInfo, Typed};

/// Iterates the items of an erased container.
pub type ItemIter<'a> = Box<dyn Iterator<Item = &'a dyn Any> + 'a>;

/// Iterates the entries of an erased mapping.
pub type EntryIter<'a> = Box<dyn Iterator<Item = (&'a dyn Any, &'a dyn Any)> + 'a>;

// -----------------------------------------------------------------------------
// ListInfo

/// The sequence containers a [`ListInfo`] describes.
///
/// Unpacking rebuilds this exact container kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListKind {
    Vec,
    VecDeque,
    HashSet,
    BTreeSet,
}

/// Describes a sequence of `T`, packed as [`Value::List`](crate::Value).
#[derive(Clone, Debug)]
pub struct ListInfo {
    ty: Type,
    kind: ListKind,
    item_id: TypeId,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    item_info: fn() -> &'static TypeInfo,
    iter: for<'a> fn(&'a dyn Any) -> Option<ItemIter<'a>>,
    collect: fn(Vec<DynBox>) -> Option<DynBox>,
}

fn list_iter<C, T>(value: &dyn Any) -> Option<ItemIter<'_>>
where
    C: Any,
    T: Any,
    for<'x> &'x C: IntoIterator<Item = &'x T>,
{
    let container = value.downcast_ref::<C>()?;
    Some(Box::new(container.into_iter().map(|v| v as &dyn Any)))
}

fn list_collect<C, T>(items: Vec<DynBox>) -> Option<DynBox>
where
    C: FromIterator<T> + Any,
    T: Any,
{
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        out.push(*item.downcast::<T>().ok()?);
    }
    Some(Box::new(out.into_iter().collect::<C>()))
}

impl ListInfo {
    /// Creates a [`ListInfo`] for the container `C` of items `T`.
    #[inline]
    pub fn new<C, T>(kind: ListKind) -> Self
    where
        C: FromIterator<T> + Any,
        T: Typed,
        for<'x> &'x C: IntoIterator<Item = &'x T>,
    {
        Self {
            ty: Type::of::<C>(),
            kind,
            item_id: TypeId::of::<T>(),
            item_info: T::type_info,
            iter: list_iter::<C, T>,
            collect: list_collect::<C, T>,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn kind(&self) -> ListKind {
        self.kind
    }

    #[inline]
    pub const fn item_id(&self) -> TypeId {
        self.item_id
    }

    /// Returns the [`TypeInfo`] of list items.
    #[inline]
    pub fn item_info(&self) -> &'static TypeInfo {
        (self.item_info)()
    }

    #[inline]
    pub fn iter<'a>(&self, value: &'a dyn Any) -> Option<ItemIter<'a>> {
        (self.iter)(value)
    }

    /// Builds the container from boxed items, in order.
    #[inline]
    pub fn collect(&self, items: Vec<DynBox>) -> Option<DynBox> {
        (self.collect)(items)
    }
}

// -----------------------------------------------------------------------------
// MapInfo

/// Describes a mapping from `K` to `V`, packed as [`Value::Map`](crate::Value).
#[derive(Clone, Debug)]
pub struct MapInfo {
    ty: Type,
    key_info: fn() -> &'static TypeInfo,
    value_info: fn() -> &'static TypeInfo,
    iter: for<'a> fn(&'a dyn Any) -> Option<EntryIter<'a>>,
    collect: fn(Vec<(DynBox, DynBox)>) -> Option<DynBox>,
}

fn map_iter<C, K, V>(value: &dyn Any) -> Option<EntryIter<'_>>
where
    C: Any,
    K: Any,
    V: Any,
    for<'x> &'x C: IntoIterator<Item = (&'x K, &'x V)>,
{
    let container = value.downcast_ref::<C>()?;
    Some(Box::new(
        container
            .into_iter()
            .map(|(k, v)| (k as &dyn Any, v as &dyn Any)),
    ))
}

fn map_collect<C, K, V>(entries: Vec<(DynBox, DynBox)>) -> Option<DynBox>
where
    C: FromIterator<(K, V)> + Any,
    K: Any,
    V: Any,
{
    let mut out = Vec::with_capacity(entries.len());
    for (k, v) in entries {
        out.push((*k.downcast::<K>().ok()?, *v.downcast::<V>().ok()?));
    }
    Some(Box::new(out.into_iter().collect::<C>()))
}

impl MapInfo {
    /// Creates a [`MapInfo`] for the container `C` of `K -> V`.
    #[inline]
    pub fn new<C, K, V>() -> Self
    where
        C: FromIterator<(K, V)> + Any,
        K: Typed,
        V: Typed,
        for<'x> &'x C: IntoIterator<Item = (&'x K, &'x V)>,
    {
        Self {
            ty: Type::of::<C>(),
            key_info: K::type_info,
            value_info: V::type_info,
            iter: map_iter::<C, K, V>,
            collect: map_collect::<C, K, V>,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn key_info(&self) -> &'static TypeInfo {
        (self.key_info)()
    }

    #[inline]
    pub fn value_info(&self) -> &'static TypeInfo {
        (self.value_info)()
    }

    #[inline]
    pub fn iter<'a>(&self, value: &'a dyn Any) -> Option<EntryIter<'a>> {
        (self.iter)(value)
    }

    #[inline]
    pub fn collect(&self, entries: Vec<(DynBox, DynBox)>) -> Option<DynBox> {
        (self.collect)(entries)
    }
}
