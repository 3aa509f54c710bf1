use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::sync::Arc;
use core::any::{Any, TypeId};

use crate::schema::{DynBox, Type, TypeInfo, Typed};

// -----------------------------------------------------------------------------
// OptionInfo

/// Describes `Option<T>`.
///
/// The resolver treats it as an alternative of `T` and the absence marker.
#[derive(Clone, Debug)]
pub struct OptionInfo {
    ty: Type,
    some_id: TypeId,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    some_info: fn() -> &'static TypeInfo,
    get: fn(&dyn Any) -> Option<Option<&dyn Any>>,
    wrap: fn(DynBox) -> Option<DynBox>,
    none: fn() -> DynBox,
}

fn option_get<T: Any>(value: &dyn Any) -> Option<Option<&dyn Any>> {
    value
        .downcast_ref::<Option<T>>()
        .map(|o| o.as_ref().map(|v| v as &dyn Any))
}

fn option_wrap<T: Any>(value: DynBox) -> Option<DynBox> {
    let v = value.downcast::<T>().ok()?;
    Some(Box::new(Some(*v)))
}

fn option_none<T: Any>() -> DynBox {
    Box::new(None::<T>)
}

impl OptionInfo {
    #[inline]
    pub fn new<T: Typed>() -> Self {
        Self {
            ty: Type::of::<Option<T>>(),
            some_id: TypeId::of::<T>(),
            some_info: T::type_info,
            get: option_get::<T>,
            wrap: option_wrap::<T>,
            none: option_none::<T>,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn some_id(&self) -> TypeId {
        self.some_id
    }

    /// Returns the [`TypeInfo`] of the wrapped type.
    #[inline]
    pub fn some_info(&self) -> &'static TypeInfo {
        (self.some_info)()
    }

    /// Reads an `Option<T>`: `Some(None)` is the absence marker, `None` a wrong type.
    #[inline]
    pub fn get<'a>(&self, value: &'a dyn Any) -> Option<Option<&'a dyn Any>> {
        (self.get)(value)
    }

    /// Wraps a boxed `T` into a boxed `Some(T)`.
    #[inline]
    pub fn wrap(&self, value: DynBox) -> Option<DynBox> {
        (self.wrap)(value)
    }

    /// Returns a boxed `None`.
    #[inline]
    pub fn none(&self) -> DynBox {
        (self.none)()
    }
}

// -----------------------------------------------------------------------------
// UnionInfo

/// One member of an alternative type.
#[derive(Clone, Debug)]
pub struct UnionMember {
    name: &'static str,
    ty_id: TypeId,
    type_info: fn() -> &'static TypeInfo,
    extract: fn(&dyn Any) -> Option<&dyn Any>,
    wrap: fn(DynBox) -> Option<DynBox>,
}

impl UnionMember {
    /// Creates a member holding a `T`.
    ///
    /// `extract` returns the member value when the union currently holds this
    /// member; `wrap` builds the union from a boxed `T`.
    #[inline]
    pub fn new<T: Typed>(
        name: &'static str,
        extract: fn(&dyn Any) -> Option<&dyn Any>,
        wrap: fn(DynBox) -> Option<DynBox>,
    ) -> Self {
        Self {
            name,
            ty_id: TypeId::of::<T>(),
            type_info: T::type_info,
            extract,
            wrap,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    #[inline]
    pub fn extract<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.extract)(value)
    }

    #[inline]
    pub fn wrap(&self, value: DynBox) -> Option<DynBox> {
        (self.wrap)(value)
    }
}

/// Describes an alternative type: a Rust enum whose variants each hold one value.
///
/// Members are kept in declaration order, which is the order unpacking tries them.
#[derive(Clone, Debug)]
pub struct UnionInfo {
    ty: Type,
    members: Box<[UnionMember]>,
}

impl UnionInfo {
    #[inline]
    pub fn new<T: Any>(members: impl Into<Box<[UnionMember]>>) -> Self {
        Self {
            ty: Type::of::<T>(),
            members: members.into(),
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn members(&self) -> &[UnionMember] {
        &self.members
    }
}

// -----------------------------------------------------------------------------
// PointerInfo

/// The owning pointer families a [`PointerInfo`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Box,
    Arc,
    Rc,
}

/// Describes a smart pointer that packs as its pointee.
#[derive(Clone, Debug)]
pub struct PointerInfo {
    ty: Type,
    kind: PointerKind,
    pointee_info: fn() -> &'static TypeInfo,
    deref: fn(&dyn Any) -> Option<&dyn Any>,
    wrap: fn(DynBox) -> Option<DynBox>,
}

fn deref_box<T: Any>(value: &dyn Any) -> Option<&dyn Any> {
    value.downcast_ref::<Box<T>>().map(|v| &**v as &dyn Any)
}

fn wrap_box<T: Any>(value: DynBox) -> Option<DynBox> {
    let v: Box<T> = value.downcast::<T>().ok()?;
    Some(Box::new(v))
}

fn deref_arc<T: Any>(value: &dyn Any) -> Option<&dyn Any> {
    value.downcast_ref::<Arc<T>>().map(|v| &**v as &dyn Any)
}

fn wrap_arc<T: Any>(value: DynBox) -> Option<DynBox> {
    let v = value.downcast::<T>().ok()?;
    Some(Box::new(Arc::new(*v)))
}

fn deref_rc<T: Any>(value: &dyn Any) -> Option<&dyn Any> {
    value.downcast_ref::<Rc<T>>().map(|v| &**v as &dyn Any)
}

fn wrap_rc<T: Any>(value: DynBox) -> Option<DynBox> {
    let v = value.downcast::<T>().ok()?;
    Some(Box::new(Rc::new(*v)))
}

impl PointerInfo {
    #[inline]
    pub fn of_box<T: Typed>() -> Self {
        Self::new::<Box<T>, T>(PointerKind::Box, deref_box::<T>, wrap_box::<T>)
    }

    #[inline]
    pub fn of_arc<T: Typed>() -> Self {
        Self::new::<Arc<T>, T>(PointerKind::Arc, deref_arc::<T>, wrap_arc::<T>)
    }

    #[inline]
    pub fn of_rc<T: Typed>() -> Self {
        Self::new::<Rc<T>, T>(PointerKind::Rc, deref_rc::<T>, wrap_rc::<T>)
    }

    #[inline]
    fn new<P: Any, T: Typed>(
        kind: PointerKind,
        deref: fn(&dyn Any) -> Option<&dyn Any>,
        wrap: fn(DynBox) -> Option<DynBox>,
    ) -> Self {
        Self {
            ty: Type::of::<P>(),
            kind,
            pointee_info: T::type_info,
            deref,
            wrap,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub const fn kind(&self) -> PointerKind {
        self.kind
    }

    #[inline]
    pub fn pointee_info(&self) -> &'static TypeInfo {
        (self.pointee_info)()
    }

    #[inline]
    pub fn deref<'a>(&self, value: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.deref)(value)
    }

    #[inline]
    pub fn wrap(&self, value: DynBox) -> Option<DynBox> {
        (self.wrap)(value)
    }
}
