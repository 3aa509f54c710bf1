use std::sync::Mutex;

use super::registry_with;
use crate::derive::Record;
use crate::{Flags, HookError, Map, PackError, PackHooks, UnpackError, Value};

static CALLS: Mutex<Vec<&'static str>> = Mutex::new(Vec::new());

fn record(call: &'static str) {
    CALLS.lock().unwrap().push(call);
}

#[derive(Record, Debug, Clone, PartialEq)]
#[pack(hooks)]
struct Traced {
    value: i32,
}

impl PackHooks for Traced {
    fn pre_pack(&self) -> Result<Option<Self>, HookError> {
        record("pre_pack");
        Ok(Some(Self { value: self.value * 2 }))
    }

    fn post_pack(&self, mut map: Map) -> Result<Map, HookError> {
        record("post_pack");
        // Sees the replacement from `pre_pack`.
        map.insert("seen", Value::from(self.value));
        Ok(map)
    }

    fn pre_unpack(mut map: Map) -> Result<Map, HookError> {
        record("pre_unpack");
        map.remove("seen");
        Ok(map)
    }

    fn post_unpack(self) -> Result<Self, HookError> {
        record("post_unpack");
        Ok(Self { value: self.value + 1 })
    }
}

#[test]
fn hooks_run_once_in_order() {
    let registry = registry_with::<Traced>();
    CALLS.lock().unwrap().clear();

    let map = registry.pack(&Traced { value: 5 }, Flags::empty()).unwrap();
    assert_eq!(map.get("value"), Some(&Value::Int(10)));
    assert_eq!(map.get("seen"), Some(&Value::Int(10)));

    let back: Traced = registry.unpack(map, Flags::empty()).unwrap();
    assert_eq!(back, Traced { value: 11 });

    assert_eq!(
        *CALLS.lock().unwrap(),
        ["pre_pack", "post_pack", "pre_unpack", "post_unpack"]
    );
}

#[derive(Record, Debug)]
#[pack(hooks)]
struct Guarded {
    secret: String,
}

impl PackHooks for Guarded {
    fn pre_pack(&self) -> Result<Option<Self>, HookError> {
        if self.secret.is_empty() {
            return Err(HookError::new("secret must be set"));
        }
        Ok(None)
    }

    fn post_unpack(self) -> Result<Self, HookError> {
        Err(HookError::new("read only"))
    }
}

#[test]
fn hook_failures_propagate_unchanged() {
    let registry = registry_with::<Guarded>();

    let err = registry
        .pack(&Guarded { secret: String::new() }, Flags::empty())
        .unwrap_err();
    let PackError::Hook(err) = err else {
        panic!("unexpected error: {err}");
    };
    assert_eq!(err.message(), "secret must be set");

    let map = Map::from_iter([("secret", Value::from("x"))]);
    let err = registry.unpack::<Guarded>(map, Flags::empty()).unwrap_err();
    assert!(matches!(err, UnpackError::Hook(e) if e.message() == "read only"));
}

#[derive(Record, Debug, PartialEq)]
#[pack(hooks)]
struct Stamped {
    value: i32,
}

impl PackHooks for Stamped {
    fn post_pack(&self, mut map: Map) -> Result<Map, HookError> {
        map.insert("stamp", Value::Bool(true));
        Ok(map)
    }
}

#[derive(Record, Debug, PartialEq)]
struct Wrapper {
    inner: Stamped,
}

#[test]
fn nested_records_run_their_own_hooks() {
    let registry = registry_with::<Wrapper>();
    let map = registry
        .pack(&Wrapper { inner: Stamped { value: 1 } }, Flags::empty())
        .unwrap();
    assert!(!map.contains_key("stamp"));
    let inner = map.get("inner").and_then(Value::as_map).unwrap();
    assert_eq!(inner.get("stamp"), Some(&Value::Bool(true)));
}
