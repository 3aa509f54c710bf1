use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use bitflags::bitflags;

use crate::config::RecordConfig;
use crate::hooks::HookTable;
use crate::impls::opaque_type_info;
use crate::schema::{DynBox, Type, TypeInfo, Typed};

bitflags! {
    /// Per-field markers set by the `Record` derive.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        /// The output key differs from the field name.
        const RENAMED = 1 << 0;
        /// A missing key is filled from the field's default.
        const DEFAULT = 1 << 1;
        /// The field type is carried through unchanged.
        const OPAQUE = 1 << 2;
    }
}

// -----------------------------------------------------------------------------
// FieldInfo

/// Information for a named record field.
///
/// # Examples
///
/// ```
/// use mc_pack::derive::Record;
/// use mc_pack::schema::Typed;
///
/// #[derive(Record)]
/// struct Point {
///     x: i32,
///     #[pack(rename = "y_axis", default)]
///     y: i32,
/// }
///
/// let info = Point::type_info().as_record().unwrap();
/// let y = info.field("y").unwrap();
///
/// assert_eq!(y.key(), "y_axis");
/// assert!(y.has_default());
/// assert!(y.type_is::<i32>());
/// ```
#[derive(Clone, Debug)]
pub struct FieldInfo {
    name: &'static str,
    key: &'static str,
    ty_id: TypeId,
    // `TypeInfo` is created on first access; using a function pointer delays it.
    type_info: fn() -> &'static TypeInfo,
    get: fn(&dyn Any) -> Option<&dyn Any>,
    default: Option<fn() -> DynBox>,
    flags: FieldFlags,
}

impl FieldInfo {
    /// Creates a field of type `T` read through `get`.
    #[inline]
    pub fn new<T: Typed>(name: &'static str, get: fn(&dyn Any) -> Option<&dyn Any>) -> Self {
        Self {
            name,
            key: name,
            ty_id: TypeId::of::<T>(),
            type_info: T::type_info,
            get,
            default: None,
            flags: FieldFlags::empty(),
        }
    }

    /// Creates a field whose value is carried through as [`Value::Opaque`](crate::Value).
    #[inline]
    pub fn opaque<T: Clone + Send + Sync + Any>(
        name: &'static str,
        get: fn(&dyn Any) -> Option<&dyn Any>,
    ) -> Self {
        Self {
            name,
            key: name,
            ty_id: TypeId::of::<T>(),
            type_info: opaque_type_info::<T>,
            get,
            default: None,
            flags: FieldFlags::OPAQUE,
        }
    }

    /// Sets the output key.
    #[inline]
    pub fn with_key(mut self, key: &'static str) -> Self {
        self.key = key;
        self.flags.set(FieldFlags::RENAMED, key != self.name);
        self
    }

    /// Sets the constructor used when the key is missing on unpack.
    #[inline]
    pub fn with_default(mut self, default: fn() -> DynBox) -> Self {
        self.default = Some(default);
        self.flags |= FieldFlags::DEFAULT;
        self
    }

    /// Returns the field name.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the key used in the packed mapping.
    #[inline]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    #[inline]
    pub const fn ty_id(&self) -> TypeId {
        self.ty_id
    }

    /// Check if the field type is `T`.
    #[inline]
    pub fn type_is<T: Any>(&self) -> bool {
        self.ty_id == TypeId::of::<T>()
    }

    /// Returns the field's [`TypeInfo`].
    #[inline]
    pub fn type_info(&self) -> &'static TypeInfo {
        (self.type_info)()
    }

    #[inline]
    pub const fn flags(&self) -> FieldFlags {
        self.flags
    }

    #[inline]
    pub const fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// Reads the field out of a record instance.
    #[inline]
    pub fn get<'a>(&self, record: &'a dyn Any) -> Option<&'a dyn Any> {
        (self.get)(record)
    }

    /// Builds the default value, if the field has one.
    #[inline]
    pub fn default_value(&self) -> Option<DynBox> {
        self.default.map(|f| f())
    }
}

// -----------------------------------------------------------------------------
// RecordInfo

/// Describes a record: named fields in declaration order, a constructor, and
/// the declared configuration and hooks.
#[derive(Clone, Debug)]
pub struct RecordInfo {
    ty: Type,
    fields: Box<[FieldInfo]>,
    construct: fn(Vec<DynBox>) -> Option<DynBox>,
    config: RecordConfig,
    hooks: HookTable,
}

impl RecordInfo {
    /// Creates a [`RecordInfo`].
    ///
    /// `construct` receives one boxed value per field, in declaration order.
    #[inline]
    pub fn new<T: Any>(
        fields: impl Into<Box<[FieldInfo]>>,
        construct: fn(Vec<DynBox>) -> Option<DynBox>,
    ) -> Self {
        Self {
            ty: Type::of::<T>(),
            fields: fields.into(),
            construct,
            config: RecordConfig::new(),
            hooks: HookTable::none(),
        }
    }

    #[inline]
    pub fn with_config(mut self, config: RecordConfig) -> Self {
        self.config = config;
        self
    }

    #[inline]
    pub fn with_hooks(mut self, hooks: HookTable) -> Self {
        self.hooks = hooks;
        self
    }

    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    #[inline]
    pub fn fields(&self) -> &[FieldInfo] {
        &self.fields
    }

    /// Returns the field named `name`.
    pub fn field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The configuration declared on the type.
    #[inline]
    pub const fn config(&self) -> &RecordConfig {
        &self.config
    }

    #[inline]
    pub const fn hooks(&self) -> &HookTable {
        &self.hooks
    }

    /// Builds an instance from field values in declaration order.
    #[inline]
    pub fn construct(&self, values: Vec<DynBox>) -> Option<DynBox> {
        (self.construct)(values)
    }
}
