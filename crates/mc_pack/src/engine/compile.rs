//! Routine Compiler: [`RecordInfo`] + [`RecordConfig`] -> [`RoutinePair`].

use alloc::borrow::Cow;
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt;

use mc_utils::hash::HashSet;

use crate::config::RecordConfig;
use crate::engine::render;
use crate::engine::resolve::resolve;
use crate::engine::strategy::{Linker, Strategy, select};
use crate::error::{DecodeError, DecodeErrorKind, PackError, PathSegment};
use crate::error::{RegistrationError, RegistrationErrorKind, UnpackError, UsageError};
use crate::flags::Flags;
use crate::hooks::HookTable;
use crate::schema::{DynBox, FieldInfo, RecordInfo, Type};
use crate::value::Map;

type PackCore = Box<dyn Fn(&dyn Any, Flags) -> Result<Map, PackError> + Send + Sync>;
type UnpackCore = Box<dyn Fn(Map) -> Result<DynBox, UnpackError> + Send + Sync>;

// -----------------------------------------------------------------------------
// RoutinePair

/// The compiled `pack` and `unpack` routines of one record type.
///
/// Built once per registration and shared through the
/// [`PackRegistry`](crate::PackRegistry). The configuration it was compiled
/// with is baked in; re-registering builds a new pair.
pub struct RoutinePair {
    ty: Type,
    config: RecordConfig,
    hooks: HookTable,
    pack: PackCore,
    unpack: UnpackCore,
    source: Option<String>,
}

impl RoutinePair {
    #[inline]
    pub const fn ty(&self) -> &Type {
        &self.ty
    }

    /// The configuration the routines were compiled with.
    #[inline]
    pub const fn config(&self) -> &RecordConfig {
        &self.config
    }

    /// The rendered routines, present when compiled with `debug`.
    #[inline]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Packs a value of the record type, hooks included.
    ///
    /// `Flags::OMIT_ABSENT` is rejected unless the record enables it.
    pub fn pack(&self, value: &dyn Any, flags: Flags) -> Result<Map, PackError> {
        if flags.contains(Flags::OMIT_ABSENT) && !self.config.omit_absent_flag_enabled {
            return Err(UsageError::OmitAbsentNotEnabled {
                type_name: self.ty.name(),
            }
            .into());
        }
        self.hooks.pack(value, |value| (self.pack)(value, flags))
    }

    /// Unpacks a mapping into a boxed value of the record type, hooks included.
    ///
    /// No flag currently affects unpacking.
    pub fn unpack(&self, map: Map, _flags: Flags) -> Result<DynBox, UnpackError> {
        self.hooks.unpack(map, |map| (self.unpack)(map))
    }
}

impl fmt::Debug for RoutinePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutinePair")
            .field("ty", &self.ty)
            .field("config", &self.config)
            .field("hooks", &self.hooks)
            .finish_non_exhaustive()
    }
}

// -----------------------------------------------------------------------------
// compile

pub(crate) struct CompiledField {
    pub info: &'static FieldInfo,
    pub strategy: Strategy,
}

/// Compiles the routines of `record` under `config`.
///
/// Nested records are linked through `linker`, never compiled here.
pub(crate) fn compile(
    record: &'static RecordInfo,
    config: RecordConfig,
    linker: &mut dyn Linker,
) -> Result<RoutinePair, RegistrationError> {
    let ty = *record.ty();
    let fail = |kind| RegistrationError::new(ty.name(), kind);

    let mut keys = HashSet::default();
    for field in record.fields() {
        if !keys.insert(field.key()) {
            return Err(fail(RegistrationErrorKind::DuplicateKey { key: field.key() }));
        }
    }

    let mut fields = Vec::with_capacity(record.fields().len());
    for info in record.fields() {
        let expr = resolve(info.type_info()).map_err(fail)?;
        let strategy = select(&expr, &config, info.name(), linker).map_err(fail)?;
        fields.push(CompiledField { info, strategy });
    }

    let source = config.debug.then(|| render::render(&ty, &config, &fields));
    let fields: Arc<[CompiledField]> = fields.into();
    let pack = pack_core(ty, fields.clone());
    let unpack = unpack_core(record, &config, fields);

    Ok(RoutinePair {
        ty,
        config,
        hooks: *record.hooks(),
        pack,
        unpack,
        source,
    })
}

fn pack_core(ty: Type, fields: Arc<[CompiledField]>) -> PackCore {
    Box::new(move |value, flags| {
        let omit = flags.contains(Flags::OMIT_ABSENT);
        let mut map = Map::with_capacity(fields.len());
        for field in fields.iter() {
            let current = field
                .info
                .get(value)
                .ok_or(PackError::Mismatch { expected: ty.path() })?;
            let packed = field.strategy.pack(current, flags)?;
            if omit && packed.is_null() {
                continue;
            }
            map.insert(field.info.key(), packed);
        }
        Ok(map)
    })
}

fn unpack_core(
    record: &'static RecordInfo,
    config: &RecordConfig,
    fields: Arc<[CompiledField]>,
) -> UnpackCore {
    let deny_unknown = config.deny_unknown_fields;
    let type_name = record.ty().name();

    Box::new(move |map| {
        if deny_unknown {
            let known = |key: &str| fields.iter().any(|f| f.info.key() == key);
            if let Some(key) = map.keys().find(|key| !known(*key)) {
                return Err(DecodeError::new(DecodeErrorKind::UnknownField {
                    field: key.to_string(),
                })
                .into());
            }
        }

        let mut values = Vec::with_capacity(fields.len());
        for field in fields.iter() {
            let key = field.info.key();
            let value = match map.get(key) {
                Some(packed) => field
                    .strategy
                    .unpack(packed)
                    .map_err(|e| e.at(PathSegment::Field(Cow::Borrowed(key))))?,
                None => field.info.default_value().ok_or_else(|| {
                    UnpackError::from(DecodeError::new(DecodeErrorKind::MissingField {
                        field: key,
                    }))
                })?,
            };
            values.push(value);
        }

        record
            .construct(values)
            .ok_or(UnpackError::Construct { type_name })
    })
}
