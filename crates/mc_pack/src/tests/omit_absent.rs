use super::registry_with;
use crate::derive::{Alternative, Record};
use crate::error::UsageError;
use crate::{Flags, PackError, Value};

#[derive(Record, Debug, PartialEq)]
struct Plain {
    a: Option<i32>,
    b: Option<i32>,
}

#[derive(Record, Debug, PartialEq)]
#[pack(omit_absent_flag)]
struct Opted {
    a: Option<i32>,
    b: Option<i32>,
}

#[derive(Record, Debug, PartialEq)]
#[pack(omit_absent_flag)]
struct OuterWithPlain {
    x: Option<i32>,
    inner: Plain,
}

#[derive(Record, Debug, PartialEq)]
#[pack(omit_absent_flag)]
struct OuterWithOpted {
    x: Option<i32>,
    inner: Opted,
    maybe: Option<Opted>,
    many: Vec<Opted>,
}

fn opted() -> Opted {
    Opted { a: Some(1), b: None }
}

#[test]
fn flag_drops_absent_fields() {
    let registry = registry_with::<Opted>();

    let map = registry.pack(&opted(), Flags::OMIT_ABSENT).unwrap();
    assert_eq!(map.get("a"), Some(&Value::Int(1)));
    assert!(!map.contains_key("b"));

    let map = registry.pack(&opted(), Flags::empty()).unwrap();
    assert_eq!(map.get("b"), Some(&Value::Null));
}

#[test]
fn omitted_optionals_unpack_as_missing() {
    let registry = registry_with::<Opted>();
    let map = registry.pack(&opted(), Flags::OMIT_ABSENT).unwrap();
    // No default: an omitted key is a missing field on the way back.
    assert!(registry.unpack::<Opted>(map, Flags::empty()).is_err());
}

#[test]
fn flag_is_rejected_without_opt_in() {
    let registry = registry_with::<Plain>();
    let err = registry
        .pack(&Plain { a: None, b: None }, Flags::OMIT_ABSENT)
        .unwrap_err();
    assert!(matches!(
        err,
        PackError::Usage(UsageError::OmitAbsentNotEnabled { type_name: "Plain" })
    ));
}

#[test]
fn flag_stops_at_records_without_opt_in() {
    let registry = registry_with::<OuterWithPlain>();
    let value = OuterWithPlain {
        x: None,
        inner: Plain { a: None, b: Some(2) },
    };

    let map = registry.pack(&value, Flags::OMIT_ABSENT).unwrap();
    assert!(!map.contains_key("x"));
    let inner = map.get("inner").and_then(Value::as_map).unwrap();
    assert_eq!(inner.get("a"), Some(&Value::Null));
    assert_eq!(inner.get("b"), Some(&Value::Int(2)));
}

#[test]
fn flag_reaches_records_with_opt_in() {
    let registry = registry_with::<OuterWithOpted>();
    let value = OuterWithOpted {
        x: None,
        inner: opted(),
        maybe: Some(opted()),
        many: vec![opted()],
    };

    let map = registry.pack(&value, Flags::OMIT_ABSENT).unwrap();
    assert!(!map.contains_key("x"));
    for key in ["inner", "maybe"] {
        let inner = map.get(key).and_then(Value::as_map).unwrap();
        assert!(!inner.contains_key("b"), "`b` kept inside `{key}`");
    }
    let many = map.get("many").and_then(Value::as_list).unwrap();
    assert!(!many[0].as_map().unwrap().contains_key("b"));

    let map = registry.pack(&value, Flags::empty()).unwrap();
    let inner = map.get("inner").and_then(Value::as_map).unwrap();
    assert_eq!(inner.get("b"), Some(&Value::Null));
}

#[derive(Alternative, Debug, PartialEq)]
enum Payload {
    Count(u32),
    Detail(Opted),
}

#[derive(Record, Debug, PartialEq)]
#[pack(omit_absent_flag)]
struct Envelope {
    payload: Payload,
}

#[test]
fn flag_reaches_records_inside_alternatives() {
    let registry = registry_with::<Envelope>();
    let value = Envelope {
        payload: Payload::Detail(opted()),
    };

    let map = registry.pack(&value, Flags::OMIT_ABSENT).unwrap();
    let detail = map.get("payload").and_then(Value::as_map).unwrap();
    assert_eq!(detail.len(), 1);
}
