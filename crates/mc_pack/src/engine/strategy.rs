//! Strategy Selector: [`TypeExpr`] + [`RecordConfig`] -> [`Strategy`].
//!
//! A strategy is a pair of closures built once per field. Container,
//! alternative and pointer strategies own the strategies of their parts; a
//! nested record is reached through a weak slot reference that is loaded at
//! call time, so recursive record graphs never re-enter the compiler.

use alloc::format;
use alloc::string::{String, ToString};
use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::any::Any;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::config::RecordConfig;
use crate::engine::registry::Slot;
use crate::engine::resolve::{self, AccessStep, Alternative, Reach, TypeExpr};
use crate::error::{AlternativeAttempt, DecodeError, DecodeErrorKind, PackError, PathSegment};
use crate::error::{RegistrationErrorKind, UnpackError};
use crate::flags::Flags;
use crate::schema::{DynBox, PrimitiveKind, RecordInfo};
use crate::value::{Map, Temporal, Value};

pub(crate) type PackFn = Arc<dyn Fn(&dyn Any, Flags) -> Result<Value, PackError> + Send + Sync>;
pub(crate) type UnpackFn = Arc<dyn Fn(&Value) -> Result<DynBox, UnpackError> + Send + Sync>;

// -----------------------------------------------------------------------------
// Shape

/// The shape tag of a [`Strategy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Shape {
    Primitive,
    Alternative,
    Sequence,
    Mapping,
    Record,
    Enumeration,
    ByteSequence,
    Temporal,
    Text,
    Opaque,
}

// -----------------------------------------------------------------------------
// Node

/// What a strategy does, kept for rendering the debug listing.
pub(crate) enum Node {
    Primitive {
        ty: &'static str,
    },
    Bytes {
        ty: &'static str,
        native: bool,
    },
    Temporal {
        ty: &'static str,
        native: bool,
    },
    Enumeration {
        ty: &'static str,
        native: bool,
    },
    Text {
        ty: &'static str,
    },
    Opaque {
        ty: &'static str,
    },
    Sequence {
        ty: &'static str,
        item: Strategy,
    },
    Mapping {
        ty: &'static str,
        key: Strategy,
        key_form: KeyForm,
        value: Strategy,
    },
    Record {
        ty: &'static str,
    },
    Alternative {
        ty: &'static str,
        members: Arc<[MemberNode]>,
    },
}

pub(crate) struct MemberNode {
    pub label: &'static str,
    pub path: Vec<AccessStep>,
    pub strategy: Option<Strategy>,
    pub pack_only: bool,
}

/// How a mapping key travels as map text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum KeyForm {
    Str,
    Int,
    UInt,
    Bool,
}

// -----------------------------------------------------------------------------
// Strategy

/// The compiled conversion of one declared type.
#[derive(Clone)]
pub(crate) struct Strategy {
    shape: Shape,
    node: Arc<Node>,
    pack: PackFn,
    unpack: UnpackFn,
}

impl Strategy {
    fn new<P, U>(shape: Shape, node: Node, pack: P, unpack: U) -> Self
    where
        P: Fn(&dyn Any, Flags) -> Result<Value, PackError> + Send + Sync + 'static,
        U: Fn(&Value) -> Result<DynBox, UnpackError> + Send + Sync + 'static,
    {
        Self {
            shape,
            node: Arc::new(node),
            pack: Arc::new(pack),
            unpack: Arc::new(unpack),
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub(crate) fn node(&self) -> &Node {
        &self.node
    }

    #[inline]
    pub fn pack(&self, value: &dyn Any, flags: Flags) -> Result<Value, PackError> {
        (self.pack)(value, flags)
    }

    #[inline]
    pub fn unpack(&self, value: &Value) -> Result<DynBox, UnpackError> {
        (self.unpack)(value)
    }
}

/// Resolves nested records to their routine slots.
pub(crate) trait Linker {
    fn link(&mut self, record: &'static RecordInfo) -> Weak<Slot>;
}

// -----------------------------------------------------------------------------
// select

/// Builds the strategy for the declared type of `field`.
pub(crate) fn select(
    expr: &TypeExpr,
    config: &RecordConfig,
    field: &'static str,
    linker: &mut dyn Linker,
) -> Result<Strategy, RegistrationErrorKind> {
    Selector {
        config: *config,
        field,
        linker,
    }
    .select(expr)
}

struct Selector<'a> {
    config: RecordConfig,
    field: &'static str,
    linker: &'a mut dyn Linker,
}

#[inline]
fn mismatch(expected: &'static str) -> PackError {
    PackError::Mismatch { expected }
}

#[inline]
fn decode_err(err: DecodeError) -> UnpackError {
    UnpackError::Decode(err)
}

impl Selector<'_> {
    fn select(&mut self, expr: &TypeExpr) -> Result<Strategy, RegistrationErrorKind> {
        Ok(match expr {
            TypeExpr::Primitive(info) => {
                let info = *info;
                let ty = info.ty().name();
                Strategy::new(
                    Shape::Primitive,
                    Node::Primitive { ty },
                    move |v, _| info.to_value(v).ok_or_else(|| mismatch(info.ty().path())),
                    move |v| {
                        info.from_value(v)
                            .ok_or_else(|| decode_err(DecodeError::mismatch(ty, v.kind())))
                    },
                )
            }
            TypeExpr::ByteSequence(info) => {
                let info = *info;
                let ty = info.ty().name();
                let native = self.config.use_bytes;
                Strategy::new(
                    Shape::ByteSequence,
                    Node::Bytes { ty, native },
                    move |v, _| {
                        let bytes = info.as_bytes(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        Ok(if native {
                            Value::Bytes(bytes.to_vec())
                        } else {
                            Value::Str(BASE64.encode(bytes))
                        })
                    },
                    move |v| match v {
                        Value::Bytes(b) if native => Ok(info.from_vec(b.clone())),
                        Value::Str(s) => BASE64
                            .decode(s)
                            .map(|b| info.from_vec(b))
                            .map_err(|e| decode_err(DecodeError::invalid("base64", e.to_string()))),
                        other => Err(decode_err(DecodeError::mismatch(
                            if native { "bytes" } else { "base64 string" },
                            other.kind(),
                        ))),
                    },
                )
            }
            TypeExpr::Temporal(info) => {
                let info = *info;
                let ty = info.ty().name();
                let native = self.config.use_datetime;
                Strategy::new(
                    Shape::Temporal,
                    Node::Temporal { ty, native },
                    move |v, _| {
                        let t = info.to_temporal(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        Ok(if native {
                            Value::Temporal(t)
                        } else {
                            Value::Str(t.to_iso_string())
                        })
                    },
                    move |v| {
                        let parsed;
                        let t = match v {
                            Value::Temporal(t) if native => t,
                            Value::Str(s) => {
                                parsed = Temporal::parse(info.kind(), s).map_err(|e| {
                                    decode_err(DecodeError::invalid("ISO-8601 date/time", e.to_string()))
                                })?;
                                &parsed
                            }
                            other => {
                                return Err(decode_err(DecodeError::mismatch(
                                    format!("{} ({})", ty, info.kind()),
                                    other.kind(),
                                )));
                            }
                        };
                        info.from_temporal(t)
                            .ok_or_else(|| decode_err(DecodeError::mismatch(ty, v.kind())))
                    },
                )
            }
            TypeExpr::Enumeration(info) => {
                let info = *info;
                let ty = info.ty().name();
                let native = self.config.use_enum;
                Strategy::new(
                    Shape::Enumeration,
                    Node::Enumeration { ty, native },
                    move |v, _| {
                        let index = info.index_of(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        if native {
                            let shared = info.share(index).ok_or_else(|| mismatch(info.ty().path()))?;
                            return Ok(Value::Opaque(shared));
                        }
                        info.variants()
                            .get(index)
                            .map(|variant| variant.value().clone())
                            .ok_or_else(|| mismatch(info.ty().path()))
                    },
                    move |v| {
                        let index = match v {
                            Value::Opaque(o) if native => info.index_of(o.as_any()),
                            other => info.find(other),
                        };
                        index.and_then(|i| info.make(i)).ok_or_else(|| {
                            decode_err(DecodeError::new(DecodeErrorKind::UnknownVariant {
                                enumeration: ty,
                                value: format!("{v:?}"),
                            }))
                        })
                    },
                )
            }
            TypeExpr::Text(info) => {
                let info = *info;
                let ty = info.ty().name();
                Strategy::new(
                    Shape::Text,
                    Node::Text { ty },
                    move |v, _| {
                        info.to_text(v)
                            .map(Value::Str)
                            .ok_or_else(|| mismatch(info.ty().path()))
                    },
                    move |v| match v {
                        Value::Str(s) => info
                            .parse(s)
                            .map_err(|reason| decode_err(DecodeError::invalid(ty, reason))),
                        other => Err(decode_err(DecodeError::mismatch(ty, other.kind()))),
                    },
                )
            }
            TypeExpr::Opaque(info) => {
                let info = *info;
                let ty = info.ty().name();
                Strategy::new(
                    Shape::Opaque,
                    Node::Opaque { ty },
                    move |v, _| info.to_value(v).ok_or_else(|| mismatch(info.ty().path())),
                    move |v| {
                        info.from_value(v)
                            .ok_or_else(|| decode_err(DecodeError::mismatch(ty, v.kind())))
                    },
                )
            }
            TypeExpr::Sequence(info, item) => {
                let info = *info;
                let ty = info.ty().name();
                let item = self.select(item)?;
                let (pack_item, unpack_item) = (item.clone(), item.clone());
                Strategy::new(
                    Shape::Sequence,
                    Node::Sequence { ty, item },
                    move |v, flags| {
                        let iter = info.iter(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        let items = iter
                            .map(|x| pack_item.pack(x, flags))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(Value::List(items))
                    },
                    move |v| {
                        let Value::List(items) = v else {
                            return Err(decode_err(DecodeError::mismatch("list", v.kind())));
                        };
                        let mut out = Vec::with_capacity(items.len());
                        for (i, x) in items.iter().enumerate() {
                            out.push(unpack_item.unpack(x).map_err(|e| e.at(PathSegment::Index(i)))?);
                        }
                        info.collect(out)
                            .ok_or(UnpackError::Construct { type_name: info.ty().name() })
                    },
                )
            }
            TypeExpr::Mapping(info, key, value) => {
                let info = *info;
                let ty = info.ty().name();
                let (key, key_form) = self.select_key(key)?;
                let value = self.select(value)?;
                let (pack_key, pack_value) = (key.clone(), value.clone());
                let (unpack_key, unpack_value) = (key.clone(), value.clone());
                Strategy::new(
                    Shape::Mapping,
                    Node::Mapping {
                        ty,
                        key,
                        key_form,
                        value,
                    },
                    move |v, flags| {
                        let iter = info.iter(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        let mut map = Map::new();
                        for (k, x) in iter {
                            let k = key_text(pack_key.pack(k, flags)?)?;
                            map.insert(k, pack_value.pack(x, flags)?);
                        }
                        Ok(Value::Map(map))
                    },
                    move |v| {
                        let Value::Map(map) = v else {
                            return Err(decode_err(DecodeError::mismatch("map", v.kind())));
                        };
                        let mut out = Vec::with_capacity(map.len());
                        for (k, x) in map {
                            let at = || PathSegment::Key(String::from(k));
                            let key = key_value(k, key_form)
                                .and_then(|kv| unpack_key.unpack(&kv))
                                .map_err(|e| e.at(at()))?;
                            let value = unpack_value.unpack(x).map_err(|e| e.at(at()))?;
                            out.push((key, value));
                        }
                        info.collect(out)
                            .ok_or(UnpackError::Construct { type_name: info.ty().name() })
                    },
                )
            }
            TypeExpr::Record(info) => {
                let ty = info.ty().name();
                let slot = self.linker.link(info);
                let unpack_slot = slot.clone();
                Strategy::new(
                    Shape::Record,
                    Node::Record { ty },
                    move |v, flags| {
                        let routines = Slot::upgrade(&slot, ty).map_err(|type_name| {
                            PackError::NotRegistered { type_name }
                        })?;
                        let flags = flags.for_nested(routines.config().omit_absent_flag_enabled);
                        Ok(Value::Map(routines.pack(v, flags)?))
                    },
                    move |v| {
                        let Value::Map(map) = v else {
                            return Err(decode_err(DecodeError::new(DecodeErrorKind::NotAMapping {
                                found: v.kind(),
                            })));
                        };
                        let routines = Slot::upgrade(&unpack_slot, ty)
                            .map_err(|type_name| UnpackError::NotRegistered { type_name })?;
                        routines.unpack(map.clone(), Flags::empty())
                    },
                )
            }
            TypeExpr::Pointer(info, inner) => {
                let info = *info;
                let inner = self.select(inner)?;
                let (pack_inner, unpack_inner) = (inner.clone(), inner.clone());
                Strategy {
                    shape: inner.shape,
                    node: inner.node.clone(),
                    pack: Arc::new(move |v, flags| {
                        let v = info.deref(v).ok_or_else(|| mismatch(info.ty().path()))?;
                        pack_inner.pack(v, flags)
                    }),
                    unpack: Arc::new(move |v| {
                        let boxed = unpack_inner.unpack(v)?;
                        info.wrap(boxed)
                            .ok_or(UnpackError::Construct { type_name: info.ty().name() })
                    }),
                }
            }
            TypeExpr::Alternative(alt) => self.select_alternative(alt)?,
        })
    }

    fn select_key(&mut self, expr: &TypeExpr) -> Result<(Strategy, KeyForm), RegistrationErrorKind> {
        let form = key_form(expr).ok_or_else(|| RegistrationErrorKind::UnsupportedKey {
            field: self.field,
            key_type: expr_name(expr),
        })?;
        // Keys always use their textual or underlying form.
        let config = self.config;
        self.config = RecordConfig {
            use_bytes: false,
            use_enum: false,
            use_datetime: false,
            ..config
        };
        let key = self.select(expr);
        self.config = config;
        Ok((key?, form))
    }

    fn select_alternative(&mut self, alt: &Alternative) -> Result<Strategy, RegistrationErrorKind> {
        let ty = alt.declared.type_name();
        let path = alt.declared.ty().path();
        let mut members = Vec::with_capacity(alt.members.len());
        for member in &alt.members {
            let strategy = match &member.expr {
                Some(expr) => Some(self.select(expr)?),
                None => None,
            };
            members.push(MemberNode {
                label: member.label,
                path: member.path.clone(),
                strategy,
                pack_only: member.pack_only,
            });
        }
        let members: Arc<[MemberNode]> = members.into();
        let (pack_members, unpack_members) = (members.clone(), members.clone());

        Ok(Strategy::new(
            Shape::Alternative,
            Node::Alternative { ty, members },
            move |v, flags| {
                for member in pack_members.iter() {
                    match (resolve::reach(&member.path, v), &member.strategy) {
                        (Reach::Miss, _) => continue,
                        (Reach::Absent, _) | (Reach::Value(_), None) => return Ok(Value::Null),
                        (Reach::Value(inner), Some(s)) => return s.pack(inner, flags),
                    }
                }
                Err(mismatch(path))
            },
            move |v| {
                // `Null` means absence, even when a member accepts it too.
                if v.is_null() {
                    let absent = unpack_members
                        .iter()
                        .find(|m| !m.pack_only && m.strategy.is_none());
                    if let Some(member) = absent {
                        return resolve::build(&member.path, None)
                            .ok_or(UnpackError::Construct { type_name: ty });
                    }
                }
                let mut attempts = Vec::new();
                for member in unpack_members.iter().filter(|m| !m.pack_only) {
                    let inner = match &member.strategy {
                        None if v.is_null() => None,
                        None => {
                            attempts.push(AlternativeAttempt {
                                member: member.label,
                                error: DecodeError::mismatch("null", v.kind()),
                            });
                            continue;
                        }
                        Some(s) => match s.unpack(v) {
                            Ok(inner) => Some(inner),
                            Err(UnpackError::Decode(error)) => {
                                attempts.push(AlternativeAttempt {
                                    member: member.label,
                                    error,
                                });
                                continue;
                            }
                            Err(other) => return Err(other),
                        },
                    };
                    return resolve::build(&member.path, inner)
                        .ok_or(UnpackError::Construct { type_name: ty });
                }
                Err(decode_err(DecodeError::new(DecodeErrorKind::NoAlternative {
                    alternative: ty,
                    attempts,
                })))
            },
        ))
    }
}

// -----------------------------------------------------------------------------
// Mapping keys

fn key_form(expr: &TypeExpr) -> Option<KeyForm> {
    match expr {
        TypeExpr::Primitive(p) => match p.kind() {
            PrimitiveKind::Str | PrimitiveKind::Char => Some(KeyForm::Str),
            PrimitiveKind::Int => Some(KeyForm::Int),
            PrimitiveKind::UInt => Some(KeyForm::UInt),
            PrimitiveKind::Bool => Some(KeyForm::Bool),
            PrimitiveKind::Float | PrimitiveKind::Unit => None,
        },
        TypeExpr::Text(_) | TypeExpr::Temporal(_) | TypeExpr::ByteSequence(_) => Some(KeyForm::Str),
        TypeExpr::Enumeration(e) => {
            let values = e.variants().iter().map(|v| v.value());
            if values.clone().all(|v| matches!(v, Value::Str(_))) {
                Some(KeyForm::Str)
            } else if values.clone().all(|v| matches!(v, Value::Int(_))) {
                Some(KeyForm::Int)
            } else if values.clone().all(|v| matches!(v, Value::UInt(_))) {
                Some(KeyForm::UInt)
            } else {
                None
            }
        }
        TypeExpr::Pointer(_, inner) => key_form(inner),
        TypeExpr::Alternative(_)
        | TypeExpr::Sequence(..)
        | TypeExpr::Mapping(..)
        | TypeExpr::Record(_)
        | TypeExpr::Opaque(_) => None,
    }
}

fn expr_name(expr: &TypeExpr) -> &'static str {
    match expr {
        TypeExpr::Primitive(i) => i.ty().name(),
        TypeExpr::Alternative(a) => a.declared.type_name(),
        TypeExpr::Sequence(i, _) => i.ty().name(),
        TypeExpr::Mapping(i, ..) => i.ty().name(),
        TypeExpr::Record(i) => i.ty().name(),
        TypeExpr::Enumeration(i) => i.ty().name(),
        TypeExpr::ByteSequence(i) => i.ty().name(),
        TypeExpr::Temporal(i) => i.ty().name(),
        TypeExpr::Text(i) => i.ty().name(),
        TypeExpr::Opaque(i) => i.ty().name(),
        TypeExpr::Pointer(i, _) => i.ty().name(),
    }
}

fn key_text(key: Value) -> Result<String, PackError> {
    Ok(match key {
        Value::Str(s) => s,
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return Err(mismatch("text mapping key")),
    })
}

fn key_value(key: &str, form: KeyForm) -> Result<Value, UnpackError> {
    let invalid = |expected: &'static str, reason: String| {
        decode_err(DecodeError::invalid(expected, reason))
    };
    Ok(match form {
        KeyForm::Str => Value::Str(String::from(key)),
        KeyForm::Int => Value::Int(
            key.parse()
                .map_err(|e: core::num::ParseIntError| invalid("integer key", e.to_string()))?,
        ),
        KeyForm::UInt => Value::UInt(
            key.parse()
                .map_err(|e: core::num::ParseIntError| invalid("unsigned key", e.to_string()))?,
        ),
        KeyForm::Bool => Value::Bool(
            key.parse()
                .map_err(|e: core::str::ParseBoolError| invalid("bool key", e.to_string()))?,
        ),
    })
}

#[cfg(test)]
mod tests {
    use alloc::sync::Weak;
    use std::collections::HashMap;

    use bytes::Bytes;

    use super::{Linker, Shape, Strategy, select};
    use crate::config::RecordConfig;
    use crate::engine::registry::Slot;
    use crate::engine::resolve::resolve;
    use crate::error::RegistrationErrorKind;
    use crate::flags::Flags;
    use crate::schema::{RecordInfo, Typed};
    use crate::value::Value;

    struct Unlinked;

    impl Linker for Unlinked {
        fn link(&mut self, _: &'static RecordInfo) -> Weak<Slot> {
            Weak::new()
        }
    }

    fn strategy<T: Typed>(config: RecordConfig) -> Result<Strategy, RegistrationErrorKind> {
        let expr = resolve(T::type_info())?;
        select(&expr, &config, "field", &mut Unlinked)
    }

    #[test]
    fn shapes() {
        let shape = |s: Strategy| s.shape();
        let config = RecordConfig::new();
        assert_eq!(shape(strategy::<Vec<u8>>(config).unwrap()), Shape::Sequence);
        assert_eq!(shape(strategy::<Bytes>(config).unwrap()), Shape::ByteSequence);
        assert_eq!(shape(strategy::<Box<String>>(config).unwrap()), Shape::Primitive);
        assert_eq!(shape(strategy::<Option<i32>>(config).unwrap()), Shape::Alternative);
        assert_eq!(shape(strategy::<HashMap<u8, i32>>(config).unwrap()), Shape::Mapping);
    }

    #[test]
    fn byte_mode_follows_config() {
        let bytes = Bytes::from_static(b"ok");
        let text = strategy::<Bytes>(RecordConfig::new()).unwrap();
        assert_eq!(text.pack(&bytes, Flags::empty()).unwrap(), Value::from("b2s="));

        let native = strategy::<Bytes>(RecordConfig::new().with_use_bytes(true)).unwrap();
        assert_eq!(
            native.pack(&bytes, Flags::empty()).unwrap(),
            Value::Bytes(b"ok".to_vec())
        );
    }

    #[test]
    fn sequence_keys_are_unsupported() {
        let err = strategy::<Vec<HashMap<Vec<u8>, u8>>>(RecordConfig::new()).err();
        assert!(matches!(
            err,
            Some(RegistrationErrorKind::UnsupportedKey { field: "field", .. })
        ));
    }
}
