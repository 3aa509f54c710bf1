//! Type Resolver: [`TypeInfo`] -> [`TypeExpr`].
//!
//! Normalizes a declared field type into the closed set of shapes the
//! selector understands. `Option<T>` and alternative enums are flattened into a
//! single [`TypeExpr::Alternative`] whose members remember the access path from
//! the declared value down to the member value. Records are not descended
//! into, so self-referential record graphs terminate.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};

use crate::error::RegistrationErrorKind;
use crate::schema::{BytesInfo, EnumInfo, ListInfo, MapInfo, OpaqueInfo, OptionInfo};
use crate::schema::{DynBox, PointerInfo, PrimitiveInfo, RecordInfo, TemporalInfo, TextInfo};
use crate::schema::{TypeInfo, UnionInfo, UnionMember};

// -----------------------------------------------------------------------------
// TypeExpr

/// A resolved field type.
#[derive(Debug)]
pub(crate) enum TypeExpr {
    Primitive(&'static PrimitiveInfo),
    Alternative(Alternative),
    Sequence(&'static ListInfo, Box<TypeExpr>),
    Mapping(&'static MapInfo, Box<TypeExpr>, Box<TypeExpr>),
    Record(&'static RecordInfo),
    Enumeration(&'static EnumInfo),
    ByteSequence(&'static BytesInfo),
    Temporal(&'static TemporalInfo),
    Text(&'static TextInfo),
    Opaque(&'static OpaqueInfo),
    /// A smart pointer, packed as its pointee.
    Pointer(&'static PointerInfo, Box<TypeExpr>),
}

/// An alternative in canonical form: members in declaration order.
#[derive(Debug)]
pub(crate) struct Alternative {
    pub declared: &'static TypeInfo,
    pub members: Vec<Member>,
}

/// One flattened alternative member.
///
/// `expr == None` is the absence marker. Only the outermost absence member is
/// used for unpacking; the inner ones (from `Option<Option<T>>`) still match on
/// pack, so every declared value stays packable.
#[derive(Debug)]
pub(crate) struct Member {
    pub label: &'static str,
    pub path: Vec<AccessStep>,
    pub expr: Option<TypeExpr>,
    pub pack_only: bool,
}

/// One step from a declared alternative value toward a member value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum AccessStep {
    Some(&'static OptionInfo),
    None(&'static OptionInfo),
    Member(&'static UnionInfo, &'static UnionMember),
    Deref(&'static PointerInfo),
}

/// What following a member's path over a declared value found.
pub(crate) enum Reach<'a> {
    Value(&'a dyn Any),
    Absent,
    Miss,
}

impl Member {
    #[inline]
    pub fn is_absent(&self) -> bool {
        self.expr.is_none()
    }
}

/// Follows `path` over a declared value.
pub(crate) fn reach<'a>(path: &[AccessStep], mut value: &'a dyn Any) -> Reach<'a> {
    for step in path {
        match *step {
            AccessStep::Some(info) => match info.get(value) {
                Some(Some(inner)) => value = inner,
                _ => return Reach::Miss,
            },
            AccessStep::None(info) => {
                return match info.get(value) {
                    Some(None) => Reach::Absent,
                    _ => Reach::Miss,
                };
            }
            AccessStep::Member(_, member) => match member.extract(value) {
                Some(inner) => value = inner,
                None => return Reach::Miss,
            },
            AccessStep::Deref(info) => match info.deref(value) {
                Some(inner) => value = inner,
                None => return Reach::Miss,
            },
        }
    }
    Reach::Value(value)
}

/// Rebuilds the declared value around a member value, or around the absence
/// marker when `value` is `None`.
pub(crate) fn build(path: &[AccessStep], value: Option<DynBox>) -> Option<DynBox> {
    let mut steps = path.iter().rev();
    let mut acc = match value {
        Some(v) => v,
        None => match steps.next() {
            Some(AccessStep::None(info)) => info.none(),
            _ => return None,
        },
    };
    for step in steps {
        acc = match *step {
            AccessStep::Some(info) => info.wrap(acc)?,
            AccessStep::None(_) => return None,
            AccessStep::Member(_, member) => member.wrap(acc)?,
            AccessStep::Deref(info) => info.wrap(acc)?,
        };
    }
    Some(acc)
}

// -----------------------------------------------------------------------------
// resolve

/// Resolves a declared type.
///
/// Fails only for alternatives without members and for alternatives that
/// contain themselves without a record in between.
pub(crate) fn resolve(info: &'static TypeInfo) -> Result<TypeExpr, RegistrationErrorKind> {
    Resolver::default().resolve(info)
}

#[derive(Default)]
struct Resolver {
    // Alternatives currently being resolved.
    open: Vec<TypeId>,
}

impl Resolver {
    fn resolve(&mut self, info: &'static TypeInfo) -> Result<TypeExpr, RegistrationErrorKind> {
        Ok(match info {
            TypeInfo::Primitive(p) => TypeExpr::Primitive(p),
            TypeInfo::Record(r) => TypeExpr::Record(r),
            TypeInfo::Enum(e) => TypeExpr::Enumeration(e),
            TypeInfo::Bytes(b) => TypeExpr::ByteSequence(b),
            TypeInfo::Temporal(t) => TypeExpr::Temporal(t),
            TypeInfo::Text(t) => TypeExpr::Text(t),
            TypeInfo::Opaque(o) => TypeExpr::Opaque(o),
            TypeInfo::List(l) => TypeExpr::Sequence(l, Box::new(self.resolve(l.item_info())?)),
            TypeInfo::Map(m) => TypeExpr::Mapping(
                m,
                Box::new(self.resolve(m.key_info())?),
                Box::new(self.resolve(m.value_info())?),
            ),
            TypeInfo::Pointer(p) => TypeExpr::Pointer(p, Box::new(self.resolve(p.pointee_info())?)),
            TypeInfo::Option(_) | TypeInfo::Union(_) => {
                let mut members = Vec::new();
                self.flatten(info, Vec::new(), None, &mut members)?;
                mark_pack_only(&mut members);
                TypeExpr::Alternative(Alternative {
                    declared: info,
                    members,
                })
            }
        })
    }

    fn flatten(
        &mut self,
        info: &'static TypeInfo,
        prefix: Vec<AccessStep>,
        label: Option<&'static str>,
        out: &mut Vec<Member>,
    ) -> Result<(), RegistrationErrorKind> {
        match info {
            TypeInfo::Option(o) => {
                let mut some = prefix.clone();
                some.push(AccessStep::Some(o));
                self.flatten(o.some_info(), some, label, out)?;

                let mut none = prefix;
                none.push(AccessStep::None(o));
                out.push(Member {
                    label: "None",
                    path: none,
                    expr: None,
                    pack_only: false,
                });
            }
            TypeInfo::Union(u) => {
                let id = u.ty().id();
                if self.open.contains(&id) {
                    return Err(RegistrationErrorKind::RecursiveAlternative {
                        type_name: u.ty().name(),
                    });
                }
                if u.members().is_empty() {
                    return Err(RegistrationErrorKind::EmptyAlternative {
                        type_name: u.ty().name(),
                    });
                }

                self.open.push(id);
                for member in u.members() {
                    let mut path = prefix.clone();
                    path.push(AccessStep::Member(u, member));
                    self.flatten(member.type_info(), path, Some(member.name()), out)?;
                }
                self.open.pop();
            }
            TypeInfo::Pointer(p) if is_alternative(p.pointee_info()) => {
                let mut path = prefix;
                path.push(AccessStep::Deref(p));
                self.flatten(p.pointee_info(), path, label, out)?;
            }
            _ => {
                // Leaves may reach the open alternatives again through containers.
                let leaf = self.resolve(info)?;
                out.push(Member {
                    label: label.unwrap_or_else(|| info.type_name()),
                    path: prefix,
                    expr: Some(leaf),
                    pack_only: false,
                });
            }
        }
        Ok(())
    }
}

#[inline]
fn is_alternative(info: &TypeInfo) -> bool {
    matches!(info, TypeInfo::Option(_) | TypeInfo::Union(_))
}

// Keeps the shortest-path absence member for unpacking.
fn mark_pack_only(members: &mut [Member]) {
    let outermost = members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_absent())
        .min_by_key(|(_, m)| m.path.len())
        .map(|(i, _)| i);

    for (i, member) in members.iter_mut().enumerate() {
        member.pack_only = member.is_absent() && Some(i) != outermost;
    }
}

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use core::any::Any;

    use super::{Reach, TypeExpr, build, reach, resolve};
    use crate::schema::Typed;

    fn alternative(expr: TypeExpr) -> super::Alternative {
        match expr {
            TypeExpr::Alternative(alt) => alt,
            other => panic!("expected an alternative, got {other:?}"),
        }
    }

    #[test]
    fn option_is_canonicalized() {
        let alt = alternative(resolve(<Option<i32>>::type_info()).unwrap());
        let labels: Vec<_> = alt.members.iter().map(|m| m.label).collect();
        assert_eq!(labels, ["i32", "None"]);
        assert!(matches!(alt.members[0].expr, Some(TypeExpr::Primitive(_))));
    }

    #[test]
    fn nested_options_flatten_and_keep_one_absent_member() {
        let alt = alternative(resolve(<Option<Option<u8>>>::type_info()).unwrap());
        assert_eq!(alt.members.len(), 3);
        assert!(alt.members[1].pack_only);
        assert!(!alt.members[2].pack_only);

        let inner_none: Option<Option<u8>> = Some(None);
        assert!(matches!(reach(&alt.members[1].path, &inner_none as &dyn Any), Reach::Absent));
        assert!(matches!(reach(&alt.members[2].path, &inner_none as &dyn Any), Reach::Miss));

        let rebuilt = build(&alt.members[0].path, Some(Box::new(3_u8))).unwrap();
        assert_eq!(rebuilt.downcast_ref::<Option<Option<u8>>>(), Some(&Some(Some(3))));
        let absent = build(&alt.members[2].path, None).unwrap();
        assert_eq!(absent.downcast_ref::<Option<Option<u8>>>(), Some(&None));
    }

    #[test]
    fn pointers_collapse() {
        let expr = resolve(<Box<Vec<String>>>::type_info()).unwrap();
        let TypeExpr::Pointer(_, inner) = expr else {
            panic!("expected a pointer");
        };
        assert!(matches!(*inner, TypeExpr::Sequence(..)));
    }
}
