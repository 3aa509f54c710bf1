use alloc::collections::BTreeMap;
use core::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use uuid::Uuid;

use super::registry_with;
use crate::derive::{Enumeration, Record};
use crate::error::{DecodeErrorKind, RegistrationErrorKind};
use crate::value::{OpaqueValue, Temporal};
use crate::{Flags, Map, PackRegistry, RecordConfig, Value, impl_opaque};

#[derive(Enumeration, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Color {
    Red,
    #[pack(value = "g")]
    Green,
}

#[derive(Enumeration, Debug, Clone, Copy, PartialEq)]
enum Level {
    #[pack(value = 1)]
    Low,
    #[pack(value = 10)]
    High,
}

#[derive(Record, Debug, Clone, PartialEq)]
struct Sample {
    data: Bytes,
    raw: Vec<u8>,
    day: NaiveDate,
    at: DateTime<Utc>,
    color: Color,
    level: Level,
}

#[derive(Record, Debug, Clone, PartialEq)]
#[pack(use_bytes, use_datetime, use_enum)]
struct NativeSample {
    data: Bytes,
    day: NaiveDate,
    color: Color,
}

fn sample() -> Sample {
    Sample {
        data: Bytes::from_static(b"hi!"),
        raw: vec![1, 2],
        day: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        at: Utc.with_ymd_and_hms(2024, 5, 1, 13, 45, 0).unwrap(),
        color: Color::Green,
        level: Level::High,
    }
}

#[test]
fn textual_forms_by_default() {
    let registry = registry_with::<Sample>();
    let map = registry.pack(&sample(), Flags::empty()).unwrap();

    assert_eq!(map.get("data"), Some(&Value::from("aGkh")));
    assert_eq!(
        map.get("raw"),
        Some(&Value::List(vec![Value::UInt(1), Value::UInt(2)]))
    );
    assert_eq!(map.get("day"), Some(&Value::from("2024-05-01")));
    assert_eq!(map.get("at"), Some(&Value::from("2024-05-01T13:45:00+00:00")));
    assert_eq!(map.get("color"), Some(&Value::from("g")));
    assert_eq!(map.get("level"), Some(&Value::Int(10)));

    assert_eq!(registry.unpack::<Sample>(map, Flags::empty()).unwrap(), sample());
}

#[test]
fn native_forms_when_enabled() {
    let registry = registry_with::<NativeSample>();
    let value = NativeSample {
        data: Bytes::from_static(&[0, 255]),
        day: NaiveDate::from_ymd_opt(2000, 1, 2).unwrap(),
        color: Color::Red,
    };

    let map = registry.pack(&value, Flags::empty()).unwrap();
    assert_eq!(map.get("data"), Some(&Value::Bytes(vec![0, 255])));
    assert_eq!(map.get("day"), Some(&Value::Temporal(Temporal::Date(value.day))));
    let color = map.get("color").and_then(Value::as_opaque).unwrap();
    assert_eq!(color.downcast_ref::<Color>(), Some(&Color::Red));

    assert_eq!(registry.unpack::<NativeSample>(map, Flags::empty()).unwrap(), value);
}

#[test]
fn native_forms_also_accept_text() {
    let registry = registry_with::<NativeSample>();
    let map = Map::from_iter([
        ("data", Value::from("AP8=")),
        ("day", Value::from("2000-01-02")),
        ("color", Value::from("Red")),
    ]);

    let back: NativeSample = registry.unpack(map, Flags::empty()).unwrap();
    assert_eq!(back.data, Bytes::from_static(&[0, 255]));
    assert_eq!(back.color, Color::Red);
}

#[test]
fn config_override_changes_modes() {
    let registry = PackRegistry::new();
    registry
        .register_with::<Sample>(RecordConfig::new().with_use_bytes(true))
        .unwrap();

    let map = registry.pack(&sample(), Flags::empty()).unwrap();
    assert_eq!(map.get("data"), Some(&Value::Bytes(b"hi!".to_vec())));
    // `Vec<u8>` stays a list of integers.
    assert!(matches!(map.get("raw"), Some(Value::List(_))));
}

#[test]
fn bad_inputs_fail_to_decode() {
    let registry = registry_with::<Sample>();

    let mut map = registry.pack(&sample(), Flags::empty()).unwrap();
    map.insert("color", Value::from("blue"));
    let err = registry.unpack::<Sample>(map, Flags::empty()).unwrap_err();
    assert!(matches!(
        err.as_decode().map(|e| &e.kind),
        Some(DecodeErrorKind::UnknownVariant { enumeration: "Color", .. })
    ));

    let mut map = registry.pack(&sample(), Flags::empty()).unwrap();
    map.insert("day", Value::from("May 1st"));
    let err = registry.unpack::<Sample>(map, Flags::empty()).unwrap_err();
    assert!(matches!(
        err.as_decode().map(|e| &e.kind),
        Some(DecodeErrorKind::InvalidValue { .. })
    ));

    let mut map = registry.pack(&sample(), Flags::empty()).unwrap();
    map.insert("data", Value::from("not base64!"));
    assert!(registry.unpack::<Sample>(map, Flags::empty()).is_err());
}

// -----------------------------------------------------------------------------
// Text and opaque shapes

#[derive(Clone, Debug, PartialEq)]
struct Handle(u64);

impl_opaque!(Handle);

#[derive(Clone, Debug, PartialEq)]
struct Untyped {
    code: u16,
}

#[derive(Record, Debug, PartialEq)]
struct Resource {
    id: Uuid,
    path: PathBuf,
    addr: IpAddr,
    opened: NaiveTime,
    handle: Handle,
    #[pack(opaque)]
    extra: Untyped,
    any: Value,
}

#[test]
fn text_and_opaque_shapes() {
    let registry = registry_with::<Resource>();
    let value = Resource {
        id: Uuid::from_u128(0x1234),
        path: PathBuf::from("/tmp/x"),
        addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        opened: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
        handle: Handle(5),
        extra: Untyped { code: 2 },
        any: Value::List(vec![Value::Bool(true)]),
    };

    let map = registry.pack(&value, Flags::empty()).unwrap();
    assert_eq!(
        map.get("id"),
        Some(&Value::from("00000000-0000-0000-0000-000000001234"))
    );
    assert_eq!(map.get("path"), Some(&Value::from("/tmp/x")));
    assert_eq!(map.get("addr"), Some(&Value::from("127.0.0.1")));
    assert_eq!(map.get("opened"), Some(&Value::from("08:30:00")));
    assert!(matches!(map.get("handle"), Some(Value::Opaque(_))));
    assert!(matches!(map.get("extra"), Some(Value::Opaque(_))));

    assert_eq!(registry.unpack::<Resource>(map, Flags::empty()).unwrap(), value);
}

#[test]
fn opaque_fields_reject_other_types() {
    let registry = registry_with::<Resource>();
    let mut map = registry
        .pack(
            &Resource {
                id: Uuid::nil(),
                path: PathBuf::new(),
                addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                opened: NaiveTime::MIN,
                handle: Handle(0),
                extra: Untyped { code: 0 },
                any: Value::Null,
            },
            Flags::empty(),
        )
        .unwrap();
    map.insert("handle", Value::Opaque(OpaqueValue::new(7_u64)));
    assert!(registry.unpack::<Resource>(map, Flags::empty()).is_err());
}

// -----------------------------------------------------------------------------
// Mapping keys

#[derive(Record, Debug, PartialEq)]
struct Keyed {
    by_color: BTreeMap<Color, u8>,
    by_flag: BTreeMap<bool, String>,
    by_id: BTreeMap<i32, bool>,
}

#[test]
fn mapping_keys_travel_as_text() {
    let registry = registry_with::<Keyed>();
    let value = Keyed {
        by_color: BTreeMap::from([(Color::Red, 1), (Color::Green, 2)]),
        by_flag: BTreeMap::from([(true, "yes".into())]),
        by_id: BTreeMap::from([(-4, false)]),
    };

    let map = registry.pack(&value, Flags::empty()).unwrap();
    let colors = map.get("by_color").and_then(Value::as_map).unwrap();
    let keys: Vec<_> = colors.keys().collect();
    assert_eq!(keys, ["Red", "g"]);
    let ids = map.get("by_id").and_then(Value::as_map).unwrap();
    assert!(ids.contains_key("-4"));

    assert_eq!(registry.unpack::<Keyed>(map, Flags::empty()).unwrap(), value);
}

#[test]
fn mapping_keys_ignore_native_modes() {
    let registry = PackRegistry::new();
    registry
        .register_with::<Keyed>(RecordConfig::new().with_use_enum(true))
        .unwrap();

    let value = Keyed {
        by_color: BTreeMap::from([(Color::Green, 2)]),
        by_flag: BTreeMap::new(),
        by_id: BTreeMap::new(),
    };
    let map = registry.pack(&value, Flags::empty()).unwrap();
    let colors = map.get("by_color").and_then(Value::as_map).unwrap();
    assert_eq!(colors.get("g"), Some(&Value::UInt(2)));
}

#[test]
fn bad_mapping_keys_fail_to_decode() {
    let registry = registry_with::<Keyed>();
    let map = Map::from_iter([
        ("by_color", Value::Map(Map::new())),
        ("by_flag", Value::Map(Map::from_iter([("maybe", Value::from("x"))]))),
        ("by_id", Value::Map(Map::new())),
    ]);

    let err = registry.unpack::<Keyed>(map, Flags::empty()).unwrap_err();
    let err = err.as_decode().unwrap();
    assert_eq!(err.path.to_string(), r#"$.by_flag["maybe"]"#);
}

#[derive(Record, Debug)]
struct ListKeys {
    lookup: BTreeMap<Vec<u8>, u8>,
}

#[test]
fn sequence_keys_are_unsupported() {
    let err = PackRegistry::new().register::<ListKeys>().unwrap_err();
    assert!(matches!(err.kind, RegistrationErrorKind::UnsupportedKey { .. }));
}
