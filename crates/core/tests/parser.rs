//! Parser tests: tokenization, AST shape, spans and nesting.
//!
//! Validator-specific tests (diagnostic codes and messages) live in
//! `validator.rs`.

mod common;

use common::week_ctx;
use weather_query_core::{ArgValue, ParamType, QueryNode, Span, parse_query, to_pretty_json, tokenize};
use weather_query_dataset::DateToken;

fn parse(line: &str) -> QueryNode {
    parse_query(line, false, &week_ctx()).unwrap_or_else(|d| panic!("{line:?}: {d}"))
}

// ─── Tokenizer ──────────────────────────────────────────────────────────────

#[test]
fn quoted_span_is_one_token_with_quotes() {
    let toks = tokenize(r#"value `temperature_max` "Kansas City""#);
    let texts: Vec<&str> = toks.iter().map(|t| t.text).collect();
    assert_eq!(texts, ["value", "`temperature_max`", r#""Kansas City""#]);
}

#[test]
fn repeated_spaces_produce_no_empty_tokens() {
    let texts: Vec<&str> = tokenize("  min   `temperature_max`  ")
        .iter()
        .map(|t| t.text)
        .collect();
    assert_eq!(texts, ["min", "`temperature_max`"]);
}

#[test]
fn quoted_run_keeps_inner_spacing() {
    let line = r#"compare city "Kansas  City" min"#;
    let toks = tokenize(line);
    assert_eq!(toks[2].text, r#""Kansas  City""#);
    assert_eq!(toks[2].span(), Span::new(13, 27));
}

// ─── AST Shape ──────────────────────────────────────────────────────────────

#[test]
fn aggregate_binds_row_and_dates() {
    let node = parse("min `temperature_max` 1 2024-04-27");
    assert_eq!(node.command, "min");
    assert_eq!(node.variant, None);
    assert_eq!(node.args.len(), 3);
    assert_eq!(node.arg("row").unwrap().value, ArgValue::Row("temperature_max".into()));
    assert_eq!(
        node.arg("start").unwrap().value,
        ArgValue::Date(DateToken::Index(1))
    );
    assert_eq!(
        node.arg("end").unwrap().value,
        ArgValue::Date(DateToken::Iso("2024-04-27".into()))
    );
    assert!(node.sub_queries.is_empty());
}

#[test]
fn absent_optionals_are_not_bound() {
    let node = parse("max `temperature_min`");
    assert_eq!(node.args.len(), 1);
    assert!(node.arg("start").is_none());
}

#[test]
fn overload_sets_variant_and_enum_arg() {
    let node = parse("compare coord 38.9 -94.7 avg `temperature_max`");
    assert_eq!(node.variant.as_deref(), Some("coord"));
    let kinds: Vec<ParamType> = node.args.iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [ParamType::Enum, ParamType::Number, ParamType::Number]);
    assert_eq!(node.arg("latitude").unwrap().value.as_number(), Some(38.9));
    assert_eq!(node.arg("longitude").unwrap().value.as_number(), Some(-94.7));
    assert_eq!(node.sub_queries.len(), 1);
    assert_eq!(node.sub_queries[0].command, "avg");
}

#[test]
fn string_value_is_unquoted_but_raw_is_kept() {
    let node = parse(r#"compare city "Kansas City" value `temperature_max` 0"#);
    let city = node.arg("city name").unwrap();
    assert_eq!(city.value.as_text(), Some("Kansas City"));
    assert_eq!(city.raw, r#""Kansas City""#);
}

#[test]
fn dataset_comparison_has_two_sub_queries() {
    let node = parse("compare dataset min `temperature_max` max `temperature_max`");
    assert_eq!(node.variant.as_deref(), Some("dataset"));
    let commands: Vec<&str> = node.sub_queries.iter().map(|q| q.command.as_str()).collect();
    assert_eq!(commands, ["min", "max"]);
}

#[test]
fn nested_spans_index_the_outer_line() {
    let line = "compare zip 66213 max `temperature_max` -1";
    let node = parse(line);
    assert_eq!(node.span, Span::new(0, line.len()));
    let sub = &node.sub_queries[0];
    assert_eq!(&line[sub.span.start..sub.span.end], "max `temperature_max` -1");
    let row = sub.arg("row").unwrap();
    assert_eq!(&line[row.span.start..row.span.end], "`temperature_max`");
}

#[test]
fn parse_as_sub_query_rejects_top_level_only_commands() {
    assert!(parse_query("table", true, &week_ctx()).is_err());
    assert!(parse_query("value `weather_code` 0", true, &week_ctx()).is_ok());
}

#[test]
fn ast_serializes_to_json() {
    let node = parse("value `weather_code` -1");
    let json = to_pretty_json(&node);
    let v: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(v["command"], "value");
    assert_eq!(v["args"][0]["value"]["type"], "row");
    assert_eq!(v["args"][1]["value"]["value"]["kind"], "index");
    assert!(v.get("sub_queries").is_none());
}
