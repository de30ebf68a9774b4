use weather_query_tables::{CommandTable, ParamType, TablesError};

#[test]
fn builtin_registry_order() {
    let t = CommandTable::builtin();
    let names: Vec<String> = t.commands.iter().map(|c| c.display_name()).collect();
    assert_eq!(
        names,
        [
            "help",
            "input",
            "clear",
            "min",
            "max",
            "avg",
            "value",
            "table",
            "compare (coord)",
            "compare (dataset)",
            "compare (zip)",
            "compare (city)",
            "histogram",
        ]
    );
    t.check().expect("builtin table is consistent");
}

#[test]
fn only_aggregates_are_sub_queryable() {
    let t = CommandTable::builtin();
    let names: Vec<&str> = t.visible(true).map(|c| c.name.as_str()).collect();
    assert_eq!(names, ["min", "max", "avg", "value"]);
}

#[test]
fn resolve_by_discriminant() {
    let t = CommandTable::builtin();
    let zip = t.resolve("compare", Some("zip"), false).expect("zip overload");
    assert_eq!(zip.params[1].kind, ParamType::Int);
    assert!(t.resolve("compare", Some("moon"), false).is_none());
    assert!(t.resolve("compare", None, false).is_none());
}

#[test]
fn resolve_plain_ignores_next_token() {
    let t = CommandTable::builtin();
    let min = t.resolve("min", Some("`temperature_max`"), true).expect("min");
    assert_eq!(min.name, "min");
}

#[test]
fn resolve_respects_sub_query_context() {
    let t = CommandTable::builtin();
    assert!(t.resolve("histogram", Some("`x`"), true).is_none());
    assert!(t.resolve("histogram", Some("`x`"), false).is_some());
    assert!(t.resolve("compare", Some("zip"), true).is_none());
}

#[test]
fn is_command_name() {
    let t = CommandTable::builtin();
    assert!(t.is_command_name("compare"));
    assert!(t.is_command_name("value"));
    assert!(!t.is_command_name("zip"));
    assert!(!t.is_command_name("`min`"));
}

#[test]
fn overloads_in_registry_order() {
    let t = CommandTable::builtin();
    let ds: Vec<&str> = t
        .overloads("compare")
        .filter_map(|c| c.discriminant())
        .collect();
    assert_eq!(ds, ["coord", "dataset", "zip", "city"]);
    assert_eq!(t.overloads("nope").count(), 0);
}

#[test]
fn json_roundtrip_preserves_table() {
    let t = CommandTable::builtin();
    let json = t.to_json_pretty().unwrap();
    let back = CommandTable::from_json(&json).unwrap();
    assert_eq!(t, back);
    assert!(back.resolve("compare", Some("city"), false).is_some());
}

#[test]
fn json_unknown_type_loads_as_unsupported() {
    let json = r#"{
        "commands": [
            {"name": "when", "description": "d", "canSubQuery": true,
             "params": [{"name": "at", "type": "timestamp"}]}
        ]
    }"#;
    let t = CommandTable::from_json(json).unwrap();
    let when = t.resolve("when", None, false).unwrap();
    assert_eq!(when.params[0].kind, ParamType::Unsupported);
}

#[test]
fn json_rejects_duplicate_overload() {
    let json = r#"{
        "commands": [
            {"name": "a", "description": "1"},
            {"name": "a", "description": "2"}
        ]
    }"#;
    let err = CommandTable::from_json(json).unwrap_err();
    assert!(matches!(err, TablesError::AmbiguousOverload { .. }), "{err}");
}

#[test]
fn json_rejects_misplaced_sub_query() {
    let json = r#"{
        "commands": [
            {"name": "a", "description": "1", "params": [
                {"name": "q", "type": "subquery"},
                {"name": "row", "type": "row"}
            ]}
        ]
    }"#;
    let err = CommandTable::from_json(json).unwrap_err();
    assert!(matches!(err, TablesError::MisplacedSubQuery { .. }), "{err}");
}

#[test]
fn json_rejects_enum_without_value() {
    let json = r#"{
        "commands": [
            {"name": "a", "description": "1", "params": [{"name": "k", "type": "enum"}]}
        ]
    }"#;
    let err = CommandTable::from_json(json).unwrap_err();
    assert!(matches!(err, TablesError::MissingEnumValue { .. }), "{err}");
}

#[test]
fn json_rejects_other_major_version() {
    let json = r#"{"formatVersion": "2.0.0", "commands": []}"#;
    let err = CommandTable::from_json(json).unwrap_err();
    assert!(matches!(err, TablesError::FormatVersion { .. }), "{err}");
}
