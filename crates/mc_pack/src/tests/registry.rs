use alloc::sync::Arc;
use std::sync::Mutex;
use std::thread;

use super::registry_with;
use crate::derive::Record;
use crate::schema::Typed;
use crate::{Flags, Map, PackExt, PackRegistry, RecordConfig, Value};

#[derive(Record, Debug, PartialEq)]
#[pack(debug)]
struct Listed {
    #[pack(rename = "n")]
    count: u32,
    label: Option<String>,
}

#[derive(Record, Debug, PartialEq)]
struct Quiet {
    count: u32,
}

fn capture(registry: &PackRegistry) -> Arc<Mutex<Vec<(String, String)>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    registry.set_debug_sink(move |ty, source| {
        sink.lock()
            .unwrap()
            .push((ty.name().to_string(), source.to_string()));
    });
    seen
}

#[test]
fn debug_listing_is_emitted_once() {
    let registry = PackRegistry::new();
    let seen = capture(&registry);

    registry.register::<Listed>().unwrap();
    registry.register::<Listed>().unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let (name, source) = &seen[0];
    assert_eq!(name, "Listed");
    assert!(source.contains("fn pack(value: &Listed"));
    assert!(source.contains("fn unpack(map: Map)"));
    assert!(source.contains(r#"map.insert("n", "#));

    let routines = registry.routines_of::<Listed>().unwrap();
    assert_eq!(routines.source(), Some(source.as_str()));
}

#[test]
fn no_listing_without_debug() {
    let registry = PackRegistry::new();
    let seen = capture(&registry);

    registry.register::<Quiet>().unwrap();
    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(registry.routines_of::<Quiet>().unwrap().source(), None);

    registry
        .register_with::<Quiet>(RecordConfig::new().with_debug(true))
        .unwrap();
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn debug_sink_may_register_other_types() {
    let registry = Arc::new(PackRegistry::new());
    let handle = Arc::downgrade(&registry);
    registry.set_debug_sink(move |_, _| {
        if let Some(registry) = handle.upgrade() {
            registry.register::<Quiet>().unwrap();
        }
    });

    registry.register::<Listed>().unwrap();
    assert!(registry.is_registered::<Listed>());
    assert!(registry.is_registered::<Quiet>());
}

#[test]
fn register_is_idempotent() {
    let registry = registry_with::<Quiet>();
    let first = registry.routines_of::<Quiet>().unwrap();
    registry.register::<Quiet>().unwrap();
    assert!(Arc::ptr_eq(&first, &registry.routines_of::<Quiet>().unwrap()));
}

#[derive(Record, Debug, PartialEq)]
struct Parent {
    child: Child,
}

#[derive(Record, Debug, PartialEq)]
struct Child {
    tag: Option<String>,
}

#[test]
fn re_registration_replaces_routines_everywhere() {
    let registry = registry_with::<Parent>();
    assert_eq!(registry.config_of::<Child>(), Some(RecordConfig::new()));

    let value = Parent { child: Child { tag: None } };
    let before = registry.pack(&value, Flags::empty()).unwrap();

    let config = RecordConfig::new().with_omit_absent_flag(true);
    registry.register_with::<Child>(config).unwrap();
    assert_eq!(registry.config_of::<Child>(), Some(config));

    // `Parent` links to `Child` by slot and sees the new routines.
    let after = registry.pack(&value, Flags::empty()).unwrap();
    assert_eq!(before, after);
    assert!(registry.pack(&Child { tag: None }, Flags::OMIT_ABSENT).unwrap().is_empty());

    let map = Map::from_iter([("child", Value::Map(Map::from_iter([("tag", Value::Null)])))]);
    assert_eq!(registry.unpack::<Parent>(map, Flags::empty()).unwrap(), value);
}

#[test]
fn erased_access() {
    let registry = registry_with::<Quiet>();
    let ty = Quiet::type_info().ty();

    let map = registry
        .pack_value(ty, &Quiet { count: 3 }, Flags::empty())
        .unwrap();
    let boxed = registry.unpack_value(ty, map, Flags::empty()).unwrap();
    assert_eq!(boxed.downcast_ref::<Quiet>(), Some(&Quiet { count: 3 }));

    assert!(registry.pack_value(ty, &5_u32, Flags::empty()).is_err());
}

#[test]
fn concurrent_readers_during_registration() {
    let registry = Arc::new(registry_with::<Quiet>());

    let readers: Vec<_> = (0..4)
        .map(|i| {
            let registry = registry.clone();
            thread::spawn(move || {
                for n in 0..200 {
                    let value = Quiet { count: i * 1000 + n };
                    let map = registry.pack(&value, Flags::empty()).unwrap();
                    assert_eq!(registry.unpack::<Quiet>(map, Flags::empty()).unwrap(), value);
                }
            })
        })
        .collect();

    for _ in 0..20 {
        registry
            .register_with::<Quiet>(RecordConfig::new().with_deny_unknown_fields(true))
            .unwrap();
        registry.register::<Listed>().unwrap();
    }
    for reader in readers {
        reader.join().unwrap();
    }
}

// -----------------------------------------------------------------------------
// PackExt

#[derive(Record, Debug, PartialEq)]
#[pack(omit_absent_flag)]
struct Profile {
    handle: String,
    bio: Option<String>,
}

#[test]
fn pack_ext_registers_on_first_use() {
    let profile = Profile {
        handle: "ada".into(),
        bio: None,
    };

    let map = profile.to_map_with(Flags::OMIT_ABSENT).unwrap();
    assert!(!map.contains_key("bio"));
    assert!(PackRegistry::global().is_registered::<Profile>());
    assert_eq!(
        Profile::pack_config(),
        Some(RecordConfig::new().with_omit_absent_flag(true))
    );

    let map = Map::from_iter([("handle", Value::from("ada")), ("bio", Value::Null)]);
    assert_eq!(Profile::from_map(map).unwrap(), profile);
}

#[cfg(feature = "auto_register")]
mod auto {
    use crate::derive::Record;
    use crate::{Flags, PackRegistry, Value};

    #[derive(Record, Debug, PartialEq)]
    #[pack(auto_register)]
    struct Announced {
        id: u8,
    }

    #[test]
    fn auto_register_collects_marked_records() {
        let registry = PackRegistry::new();
        assert!(registry.auto_register().unwrap() >= 1);
        assert!(registry.is_registered::<Announced>());

        let map = registry.pack(&Announced { id: 4 }, Flags::empty()).unwrap();
        assert_eq!(map.get("id"), Some(&Value::UInt(4)));
    }
}
