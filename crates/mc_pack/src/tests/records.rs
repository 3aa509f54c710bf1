use alloc::collections::BTreeMap;
use std::collections::HashMap;

use super::registry_with;
use crate::derive::Record;
use crate::error::{DecodeErrorKind, PathSegment, RegistrationErrorKind};
use crate::value::ValueKind;
use crate::{Flags, Map, PackRegistry, UnpackError, Value};

#[derive(Record, Debug, Clone, PartialEq)]
struct Owner {
    name: String,
    age: u8,
}

#[derive(Record, Debug, Clone, PartialEq)]
struct Item {
    id: u32,
    owner: Owner,
}

#[derive(Record, Debug, Clone, PartialEq)]
struct Inventory {
    items: Vec<Item>,
    scores: BTreeMap<String, i64>,
    slots: HashMap<u16, String>,
    note: Option<String>,
}

fn inventory() -> Inventory {
    Inventory {
        items: vec![
            Item {
                id: 1,
                owner: Owner { name: "ada".into(), age: 36 },
            },
            Item {
                id: 2,
                owner: Owner { name: "bob".into(), age: 7 },
            },
        ],
        scores: BTreeMap::from([("ada".into(), 10), ("bob".into(), -3)]),
        slots: HashMap::from([(1, "sword".into()), (40, "shield".into())]),
        note: None,
    }
}

#[test]
fn round_trip() {
    let registry = registry_with::<Inventory>();
    let value = inventory();

    let map = registry.pack(&value, Flags::empty()).unwrap();
    let keys: Vec<_> = map.keys().collect();
    assert_eq!(keys, ["items", "scores", "slots", "note"]);
    assert_eq!(map.get("note"), Some(&Value::Null));

    let items = map.get("items").and_then(Value::as_list).unwrap();
    let owner = items[0].as_map().and_then(|m| m.get("owner")).unwrap();
    assert_eq!(owner.as_map().and_then(|m| m.get("name")), Some(&Value::from("ada")));

    let slots = map.get("slots").and_then(Value::as_map).unwrap();
    assert_eq!(slots.get("40"), Some(&Value::from("shield")));

    let back: Inventory = registry.unpack(map, Flags::empty()).unwrap();
    assert_eq!(back, value);
}

#[test]
fn nested_records_register_with_their_parent() {
    let registry = registry_with::<Inventory>();
    assert!(registry.is_registered::<Item>());
    assert!(registry.is_registered::<Owner>());

    let map = registry
        .pack(&Owner { name: "eve".into(), age: 1 }, Flags::empty())
        .unwrap();
    assert_eq!(map.get("age"), Some(&Value::UInt(1)));
}

#[test]
fn unregistered_types_are_rejected() {
    let registry = PackRegistry::new();
    assert!(matches!(
        registry.unpack::<Owner>(Map::new(), Flags::empty()),
        Err(UnpackError::NotRegistered { type_name: "Owner" })
    ));
}

#[test]
fn missing_field_names_the_key() {
    let registry = registry_with::<Owner>();
    let map = Map::from_iter([("name", Value::from("ada"))]);

    let err = registry.unpack::<Owner>(map, Flags::empty()).unwrap_err();
    let err = err.as_decode().unwrap();
    assert_eq!(err.kind, DecodeErrorKind::MissingField { field: "age" });
    assert!(err.path.is_root());
}

#[test]
fn decode_errors_carry_the_field_path() {
    let registry = registry_with::<Inventory>();
    let mut map = registry.pack(&inventory(), Flags::empty()).unwrap();

    let items = map.get_mut("items").unwrap();
    let Value::List(items) = items else {
        panic!("items packed as {items:?}");
    };
    let Value::Map(second) = &mut items[1] else {
        panic!("item packed as {:?}", items[1]);
    };
    let Some(Value::Map(owner)) = second.get_mut("owner") else {
        panic!("owner missing");
    };
    owner.insert("age", Value::from("seven"));

    let err = registry.unpack::<Inventory>(map, Flags::empty()).unwrap_err();
    let err = err.as_decode().unwrap();
    assert_eq!(err.to_string(), "$.items[1].owner.age: expected u8, found string");
    assert_eq!(
        err.path.segments().next(),
        Some(&PathSegment::Field("items".into()))
    );
}

#[test]
fn out_of_range_integers_fail() {
    let registry = registry_with::<Owner>();
    let map = Map::from_iter([("name", Value::from("ada")), ("age", Value::Int(300))]);

    let err = registry.unpack::<Owner>(map, Flags::empty()).unwrap_err();
    assert!(matches!(
        err.as_decode().map(|e| &e.kind),
        Some(DecodeErrorKind::TypeMismatch { found: ValueKind::Int, .. })
    ));
}

// -----------------------------------------------------------------------------
// Field attributes

fn default_level() -> u8 {
    3
}

#[derive(Record, Debug, PartialEq)]
struct Settings {
    #[pack(rename = "display-name")]
    name: String,
    #[pack(default)]
    tags: Vec<String>,
    #[pack(default = "default_level")]
    level: u8,
}

#[test]
fn renamed_keys_and_defaults() {
    let registry = registry_with::<Settings>();
    let settings = Settings {
        name: "main".into(),
        tags: vec!["a".into()],
        level: 9,
    };

    let map = registry.pack(&settings, Flags::empty()).unwrap();
    assert_eq!(map.get("display-name"), Some(&Value::from("main")));
    assert!(!map.contains_key("name"));

    let partial = Map::from_iter([("display-name", Value::from("side"))]);
    let back: Settings = registry.unpack(partial, Flags::empty()).unwrap();
    assert_eq!(
        back,
        Settings {
            name: "side".into(),
            tags: Vec::new(),
            level: 3,
        }
    );
}

#[test]
fn unknown_keys_are_ignored_by_default() {
    let registry = registry_with::<Owner>();
    let map = Map::from_iter([
        ("name", Value::from("ada")),
        ("age", Value::from(36_u8)),
        ("extra", Value::Bool(true)),
    ]);
    assert!(registry.unpack::<Owner>(map, Flags::empty()).is_ok());
}

#[derive(Record, Debug, PartialEq)]
#[pack(deny_unknown_fields)]
struct Strict {
    id: u32,
}

#[test]
fn deny_unknown_fields() {
    let registry = registry_with::<Strict>();
    let map = Map::from_iter([("id", Value::from(1_u32)), ("extra", Value::Null)]);

    let err = registry.unpack::<Strict>(map, Flags::empty()).unwrap_err();
    assert_eq!(
        err.as_decode().map(|e| &e.kind),
        Some(&DecodeErrorKind::UnknownField { field: "extra".into() })
    );
}

// -----------------------------------------------------------------------------
// Recursion and generics

#[derive(Record, Debug, PartialEq)]
struct TreeNode {
    value: i32,
    children: Vec<TreeNode>,
    parent: Option<Box<TreeNode>>,
}

#[test]
fn self_referential_records() {
    let registry = registry_with::<TreeNode>();
    let tree = TreeNode {
        value: 1,
        children: vec![TreeNode {
            value: 2,
            children: Vec::new(),
            parent: None,
        }],
        parent: Some(Box::new(TreeNode {
            value: 0,
            children: Vec::new(),
            parent: None,
        })),
    };

    let map = registry.pack(&tree, Flags::empty()).unwrap();
    let parent = map.get("parent").and_then(Value::as_map).unwrap();
    assert_eq!(parent.get("value"), Some(&Value::Int(0)));

    assert_eq!(registry.unpack::<TreeNode>(map, Flags::empty()).unwrap(), tree);
}

#[derive(Record, Debug, PartialEq)]
struct Page<T> {
    total: u64,
    entries: Vec<T>,
}

#[test]
fn generic_records() {
    let registry = PackRegistry::new();
    registry.register::<Page<Owner>>().unwrap();
    registry.register::<Page<String>>().unwrap();

    let page = Page {
        total: 1,
        entries: vec!["x".to_string()],
    };
    let map = registry.pack(&page, Flags::empty()).unwrap();
    assert_eq!(map.get("entries"), Some(&Value::List(vec![Value::from("x")])));
    assert_eq!(registry.unpack::<Page<String>>(map, Flags::empty()).unwrap(), page);
    assert!(registry.is_registered::<Owner>());
}

// -----------------------------------------------------------------------------
// Registration failures

#[derive(Record, Debug)]
struct BadKeys {
    lookup: HashMap<Vec<String>, u8>,
}

#[derive(Record, Debug)]
struct HoldsBadKeys {
    owner: Owner,
    inner: BadKeys,
}

#[test]
fn unsupported_keys_fail_registration() {
    let registry = PackRegistry::new();
    let err = registry.register::<BadKeys>().unwrap_err();
    assert_eq!(err.type_name, "BadKeys");
    assert!(matches!(
        err.kind,
        RegistrationErrorKind::UnsupportedKey { field: "lookup", .. }
    ));
}

#[test]
fn failed_registration_publishes_nothing() {
    let registry = PackRegistry::new();
    let err = registry.register::<HoldsBadKeys>().unwrap_err();
    assert_eq!(err.type_name, "BadKeys");

    assert!(!registry.is_registered::<HoldsBadKeys>());
    assert!(!registry.is_registered::<Owner>());
    assert!(!registry.is_registered::<BadKeys>());
}

#[test]
fn non_records_cannot_be_registered() {
    let registry = PackRegistry::new();
    let err = registry.register::<Vec<u8>>().unwrap_err();
    assert_eq!(err.kind, RegistrationErrorKind::NotARecord);
}
