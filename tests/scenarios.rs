use camel_snake_struct::{CamelSnakeStruct, Error, Field, Schema, ValueCategory};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};

fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {other}"),
    }
}

#[test]
fn scalar_fields_by_any_name() {
    let s = CamelSnakeStruct::from_value(json!({"version": 1, "rubyVersion": "2.5.0"}));

    assert_eq!(s.get("version").unwrap().to_value(), json!(1));
    assert_eq!(s.get("ruby_version").unwrap().to_value(), json!("2.5.0"));
    assert_eq!(s.get("rubyVersion").unwrap().to_value(), json!("2.5.0"));
    assert_eq!(s.get("version?").unwrap().as_bool(), Some(true));
    assert_eq!(s.get("unknown?").unwrap().as_bool(), Some(false));
    assert_eq!(
        s.get("unknown").unwrap_err(),
        Error::UnknownMember { member: "unknown".to_string(), type_name: "CamelSnakeStruct".to_string() }
    );
}

#[test]
fn struct_arrays_by_index() {
    let s = CamelSnakeStruct::from_value(json!({"onThe": [{"step": "good"}, {"step": "bad"}]}));
    let on_the = s.get("on_the").unwrap();

    assert_eq!(on_the.at(0).unwrap().get("step").unwrap().as_str(), Some("good"));
    assert_eq!(on_the.at(1).unwrap().get("step").unwrap().as_str(), Some("bad"));
}

#[test]
fn learned_type_answers_on_empty_payloads() {
    let schema = Schema::new();
    let s = schema.declare("MyLoadedStruct");
    s.example(map(json!({
        "data": [{"name": "Jeff"}],
        "errors": ["text"],
        "date": {"timezone": "UTC", "unixTime": 0}
    })))
    .unwrap();

    let empty = s.wrap(Map::new());
    assert_eq!(empty.get("data").unwrap().as_list().map(<[Field<'_>]>::len), Some(0));
    assert_eq!(empty.get("errors").unwrap().to_value(), json!([]));
    assert!(empty.get("date").unwrap().is_null());

    let dated = s.wrap(map(json!({"date": {}})));
    let date = dated.get("date").unwrap();
    assert!(date.get("timezone").unwrap().is_null());
    assert!(date.get("unix_time").unwrap().is_null());
    assert!(date.get("unixTime").unwrap().is_null());
}

#[test]
fn learned_profiles_union_across_examples() {
    let schema = Schema::new();
    let s = schema.declare("ScalarStruct");
    s.example(map(json!({"scalar": 1}))).unwrap();
    s.example(map(json!({"scalar": null}))).unwrap();

    let profile = s.type_profile();
    let scalar = profile.get("scalar").unwrap();
    assert_eq!(scalar.classes(), vec![ValueCategory::Integer, ValueCategory::Null]);
    assert!(!scalar.is_array());
}

#[test]
fn array_flag_set_by_either_example() {
    let schema = Schema::new();
    let s = schema.declare("Mixed");
    s.example(map(json!({"value": "one"}))).unwrap();
    s.example(map(json!({"value": ["two", 3]}))).unwrap();

    let value = s.type_profile().get("value").cloned().unwrap();
    assert_eq!(value.classes(), vec![ValueCategory::Text, ValueCategory::Integer]);
    assert!(value.is_array());
}

#[test]
fn alias_and_normalized_name_agree() {
    let s = CamelSnakeStruct::from_value(json!({
        "firstName": "Ada",
        "home.address": {"zipCode": "12345"},
        "@type": "person"
    }));

    assert_eq!(s.get("firstName").unwrap().to_value(), s.get("first_name").unwrap().to_value());
    assert_eq!(s.get("home_address").unwrap().to_value(), json!({"zipCode": "12345"}));
    assert_eq!(
        s.get("home_address").unwrap().get("zip_code").unwrap().to_value(),
        json!("12345")
    );
    assert_eq!(s.get("type").unwrap().to_value(), json!("person"));
    assert_eq!(s.index("@type").to_value(), json!("person"));
    assert!(s.index("type").is_null());
}

#[test]
fn root_boxing_rebuilds_wrappers_each_read() {
    let s = CamelSnakeStruct::from_value(json!({"enter": {"the": "dragon"}}));
    let first = s.get("enter").unwrap();
    let second = s.get("enter").unwrap();
    assert_eq!(first.as_struct(), second.as_struct());
    assert_eq!(s.index("enter").as_struct(), first.as_struct());
}

#[test]
fn nested_learned_types_are_shared() {
    let schema = Schema::new();
    let s = schema.declare("Shared");
    let a = s.wrap(map(json!({"owner": {"login": "a"}})));
    let b = s.wrap(map(json!({"owner": {"login": "b"}})));

    let a_owner = a.get("owner").unwrap();
    let b_owner = b.get("owner").unwrap();
    assert_eq!(
        a_owner.as_struct().unwrap().type_ref(),
        b_owner.as_struct().unwrap().type_ref()
    );
    assert_eq!(a_owner.as_struct().unwrap().type_name(), "Shared::Owner");
    assert_eq!(b_owner.get("login").unwrap().as_str(), Some("b"));
}
