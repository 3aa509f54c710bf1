use alloc::boxed::Box;
use core::any::Any;

use crate::schema::{DynBox, Type};
use crate::value::{OpaqueValue, Value};

// -----------------------------------------------------------------------------
// EnumVariant

/// A variant of an enumeration and the underlying value it packs to.
#[derive(Clone, Debug)]
pub struct EnumVariant {
    name: &'static str,
    value: Value,
}

impl EnumVariant {
    #[inline]
    pub fn new(name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            name,
            value: value.into(),
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The underlying value.
    #[inline]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

// -----------------------------------------------------------------------------
// EnumInfo

/// Describes an enumeration: a field-less enum with one underlying value per variant.
///
/// Variants are addressed by declaration index. The erased functions map an
/// instance to its index and build an instance from an index, either boxed
/// or shared inside an [`OpaqueValue`] for `use_enum`.
#[derive(Clone, Debug)]
pub struct EnumInfo {
    ty: Type,
    variants: Box<[EnumVariant]>,
    index_of: fn(&dyn Any) -> Option<usize>,
    make: fn(usize) -> Option<DynBox>,
    share: fn(usize) -> Option<OpaqueValue>,
}

impl EnumInfo {
    #[inline]
    pub fn new<T: Any>(
        variants: impl Into<Box<[EnumVariant]>>,
        index_of: fn(&dyn Any) -> Option<usize>,
        make: fn(usize) -> Option<DynBox>,
        share: fn(usize) -> Option<OpaqueValue>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            variants: variants.into(),
            index_of,
            make,
            share,
        }
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn variants(&self) -> &[EnumVariant] {
        &self.variants
    }

    /// Returns the variant `value` currently holds.
    #[inline]
    pub fn variant_of(&self, value: &dyn Any) -> Option<&EnumVariant> {
        (self.index_of)(value).and_then(|i| self.variants.get(i))
    }

    /// Returns the declaration index of `value`.
    #[inline]
    pub fn index_of(&self, value: &dyn Any) -> Option<usize> {
        (self.index_of)(value)
    }

    /// Returns the index of the variant whose underlying value equals `value`.
    #[inline]
    pub fn find(&self, value: &Value) -> Option<usize> {
        self.variants.iter().position(|v| v.value == *value)
    }

    #[inline]
    pub fn make(&self, index: usize) -> Option<DynBox> {
        (self.make)(index)
    }

    #[inline]
    pub fn share(&self, index: usize) -> Option<OpaqueValue> {
        (self.share)(index)
    }
}
