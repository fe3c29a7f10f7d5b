//! Deep-clone behavior of style input.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use stylekit::{CloneError, DefaultClassNames, Error, RuleOptions, StyleMap, StyleRule, StyleValue};

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        "[a-z0-9 #%]{0,12}".prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        any::<u16>().prop_map(Value::from),
    ]
}

fn property() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => scalar(),
        2 => prop::collection::vec(scalar(), 0..4).prop_map(Value::Array),
        1 => prop::collection::vec(prop::collection::vec(scalar(), 1..3), 1..3)
            .prop_map(|rows| Value::Array(rows.into_iter().map(Value::Array).collect())),
    ]
}

fn style_object() -> impl Strategy<Value = Value> {
    (
        prop::collection::vec(("[a-z][a-z-]{0,10}", property()), 0..8),
        prop::collection::vec(("[a-z][a-z-]{0,10}", scalar()), 0..3),
    )
        .prop_map(|(props, fallbacks)| {
            let mut map: Map<String, Value> = props.into_iter().collect();
            if !fallbacks.is_empty() {
                map.insert(
                    "fallbacks".to_string(),
                    Value::Object(fallbacks.into_iter().collect()),
                );
            }
            Value::Object(map)
        })
}

proptest! {
    #[test]
    fn cloning_is_idempotent(input in style_object()) {
        let (first, first_text) = StyleMap::clone_from_serialize(&input).unwrap();
        let (second, second_text) = StyleMap::clone_from_serialize(&first).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first_text, second_text);
    }

    #[test]
    fn cloning_preserves_property_order(input in style_object()) {
        let (cloned, _) = StyleMap::clone_from_serialize(&input).unwrap();
        let expected: Vec<&str> = input.as_object().unwrap().keys().map(String::as_str).collect();
        let actual: Vec<&str> = cloned.names().collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn flat_json_has_only_scalars(input in style_object()) {
        let rule = StyleRule::new(Some(".a"), &input, RuleOptions::new(), &mut DefaultClassNames::new()).unwrap();
        let flat = rule.to_json();
        if input.get("fallbacks").is_some_and(Value::is_object) {
            prop_assert!(!flat.contains_key("fallbacks"));
        }
        prop_assert!(flat.values().all(|v| v.is_string() || v.is_number()));
    }
}

#[test]
fn test_nested_sequences_join() {
    let (style, _) = StyleMap::clone_from_serialize(&json!({
        "margin": [0, "auto"],
        "transition": [["opacity", "1s"], ["color", "2s"]],
    }))
    .unwrap();
    assert_eq!(
        style.get("margin").and_then(StyleValue::to_css_value).as_deref(),
        Some("0, auto")
    );
    assert_eq!(
        style.get("transition").and_then(StyleValue::to_css_value).as_deref(),
        Some("opacity 1s, color 2s")
    );
}

#[test]
fn test_unrepresentable_values_are_rejected() {
    let cases = [
        (json!({"a": null}), "a", "null"),
        (json!({"a": true}), "a", "boolean"),
        (json!({"a": [{"b": 1}]}), "a[0]", "map inside a sequence"),
        (json!({"a": [[[1]]]}), "a[0][0]", "deeply nested sequence"),
        (json!({"fallbacks": {"color": null}}), "fallbacks.color", "null"),
    ];
    for (input, expected_path, expected_kind) in cases {
        match StyleMap::clone_from_serialize(&input) {
            Err(CloneError::Unrepresentable { path, kind }) => {
                assert_eq!(path, expected_path);
                assert_eq!(kind, expected_kind);
            }
            other => panic!("{input}: unexpected result {other:?}"),
        }
    }
}

#[test]
fn test_non_finite_numbers_are_rejected() {
    let mut style = std::collections::BTreeMap::new();
    style.insert("width", f64::NAN);
    let result = StyleRule::new(Some(".a"), &style, RuleOptions::new(), &mut DefaultClassNames::new());
    assert!(matches!(
        result,
        Err(Error::Clone(CloneError::Unrepresentable { kind: "null", .. }))
    ));
}

#[test]
fn test_non_map_is_rejected() {
    assert!(matches!(
        StyleMap::clone_from_serialize(&json!(["a"])),
        Err(CloneError::NotAMap { found: "sequence" })
    ));
}

#[test]
fn test_non_string_keys_are_rejected() {
    let mut style = std::collections::HashMap::new();
    style.insert(vec![1u8], "red");
    assert!(matches!(
        StyleMap::clone_from_serialize(&style),
        Err(CloneError::Serialize(_))
    ));
}
