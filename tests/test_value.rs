use std::collections::BTreeMap;

use nanotemplate::{context, Value};

use serde::Serialize;
use similar_asserts::assert_eq;

#[test]
fn test_get_path() {
    let ctx = Value::from_serialize(&serde_json::json!({
        "user": {
            "name": "Peter",
            "address": { "city": "Vienna" }
        },
        "@index": 7
    }));
    assert_eq!(ctx.get_path("user.name").as_str(), Some("Peter"));
    assert_eq!(ctx.get_path("user.address.city").as_str(), Some("Vienna"));
    assert_eq!(ctx.get_path("@index"), &Value::U64(7));
}

#[test]
fn test_get_path_absence() {
    let ctx = context! { user => context! { name => "Peter" } };
    // missing key
    assert!(ctx.get_path("user.email").is_undefined());
    // descending into a non-map
    assert!(ctx.get_path("user.name.first").is_undefined());
    // missing root
    assert!(ctx.get_path("nothing.at.all").is_undefined());
    // empty path resolves an empty key
    assert!(ctx.get_path("").is_undefined());
    // lookups on non-maps are absent, never errors
    assert!(Value::from(42).get_path("x").is_undefined());
    assert!(Value::UNDEFINED.get_path("x").is_undefined());
}

#[test]
fn test_truthiness() {
    assert!(!Value::UNDEFINED.is_true());
    assert!(!Value::None.is_true());
    assert!(!Value::from(false).is_true());
    assert!(!Value::from(0).is_true());
    assert!(!Value::from(0u64).is_true());
    assert!(!Value::from(0.0).is_true());
    assert!(!Value::from("").is_true());
    assert!(Value::from(true).is_true());
    assert!(Value::from(-1).is_true());
    assert!(Value::from(0.5).is_true());
    assert!(Value::from("a").is_true());
    // empty collections are truthy
    assert!(Value::Seq(vec![]).is_true());
    assert!(Value::Map(BTreeMap::new()).is_true());
}

#[test]
fn test_display() {
    assert_eq!(Value::UNDEFINED.to_string(), "");
    assert_eq!(Value::None.to_string(), "");
    assert_eq!(Value::from(true).to_string(), "true");
    assert_eq!(Value::from(42).to_string(), "42");
    assert_eq!(Value::from(-3i64).to_string(), "-3");
    assert_eq!(Value::from(1.5).to_string(), "1.5");
    assert_eq!(Value::from(2.0).to_string(), "2.0");
    assert_eq!(Value::from("text").to_string(), "text");
    let seq = Value::from(vec![Value::from(1), Value::from("a")]);
    assert_eq!(seq.to_string(), "[1, \"a\"]");
    let map = context! { a => 1 };
    assert_eq!(map.to_string(), "{\"a\": 1}");
}

#[test]
fn test_from_serialize_struct() {
    #[derive(Serialize)]
    struct User {
        name: &'static str,
        logins: u32,
        active: bool,
    }

    let ctx = Value::from_serialize(&User {
        name: "Peter",
        logins: 3,
        active: true,
    });
    assert_eq!(ctx.get_path("name").as_str(), Some("Peter"));
    assert_eq!(ctx.get_path("logins"), &Value::U64(3));
    assert_eq!(ctx.get_path("active"), &Value::Bool(true));
}

#[test]
fn test_from_serialize_option_and_unit() {
    assert_eq!(Value::from_serialize(&None::<u32>), Value::None);
    assert_eq!(Value::from_serialize(&Some(3u32)), Value::U64(3));
    assert_eq!(Value::from_serialize(&()), Value::None);
}

#[test]
fn test_from_serialize_seq() {
    let val = Value::from_serialize(&vec![1, 2, 3]);
    let items = val.as_seq().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0], Value::I64(1));
}

#[test]
fn test_from_serialize_non_string_keys() {
    let mut map = BTreeMap::new();
    map.insert(1u32, "one");
    map.insert(2u32, "two");
    let val = Value::from_serialize(&map);
    assert_eq!(val.get_path("1").as_str(), Some("one"));
    assert_eq!(val.get_path("2").as_str(), Some("two"));
}

#[test]
fn test_from_serialize_unsized_and_nested() {
    // str and slice payloads arrive at the serializer as unsized types
    let s: &str = "plain";
    assert_eq!(Value::from_serialize(s).as_str(), Some("plain"));
    let nums: &[u32] = &[1, 2];
    assert_eq!(Value::from_serialize(nums).as_seq().map(|v| v.len()), Some(2));
    // nested containers funnel every element through the same conversion
    let val = Value::from_serialize(&vec![("k", Some("v"))]);
    let items = val.as_seq().unwrap();
    assert_eq!(items[0].as_seq().unwrap()[0].as_str(), Some("k"));
    assert_eq!(items[0].as_seq().unwrap()[1].as_str(), Some("v"));
}

#[test]
fn test_value_round_trips_through_serialize() {
    let val = context! { name => "Peter", items => vec![1, 2] };
    let again = Value::from_serialize(&val);
    assert_eq!(again.get_path("name").as_str(), Some("Peter"));
    assert_eq!(again.get_path("items").as_seq().map(|s| s.len()), Some(2));
}

#[test]
fn test_value_serializes_to_json() {
    assert_eq!(serde_json::to_string(&Value::UNDEFINED).unwrap(), "null");
    assert_eq!(
        serde_json::to_string(&context! { a => 1 }).unwrap(),
        "{\"a\":1}"
    );
}

#[test]
fn test_context_macro() {
    let name = "Peter";
    let ctx = context! { name, age => 30 };
    assert_eq!(ctx.get_path("name").as_str(), Some("Peter"));
    assert_eq!(ctx.get_path("age"), &Value::I64(30));
    assert_eq!(context! {}, Value::Map(BTreeMap::new()));
}

#[cfg(feature = "json")]
#[test]
fn test_from_json() {
    let ctx = Value::from_json(r#"{"name": "Peter", "tags": ["a"], "score": null}"#).unwrap();
    assert_eq!(ctx.get_path("name").as_str(), Some("Peter"));
    // sequences have no index syntax; dotted numbers are plain keys
    assert_eq!(ctx.get_path("tags.0"), &Value::UNDEFINED);
    assert_eq!(ctx.get_path("score"), &Value::None);
    assert!(Value::from_json("{not json").is_err());
}
