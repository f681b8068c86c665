//! Integration tests for the StringQuery parser.
//!
//! These exercise the public API only: field sets, configuration, the
//! resulting condition tree and the collected diagnostics.

use std::sync::Arc;

use string_query::{
    Compare, CompareOperator, DecimalTransformer, ErrorKind, FieldDescriptor, FieldNameMode,
    FieldSet, GroupLogical, IntegerTransformer, ModelValue, PatternMatch, PatternMatchType,
    ProcessorConfig, QueryError, Range, StringQueryParser, TextTransformer, ValuesGroup,
};

/// Field set modelled after a small customer search form.
fn customers() -> Arc<FieldSet> {
    Arc::new(
        FieldSet::builder("customers")
            .add(FieldDescriptor::new("id", IntegerTransformer).with_label("Customer id"))
            .add(FieldDescriptor::new("name", TextTransformer).with_label("Name"))
            .add(FieldDescriptor::new("balance", DecimalTransformer).with_label("Balance"))
            .add(FieldDescriptor::new("status", TextTransformer).with_label("Status"))
            .add(FieldDescriptor::new("secret", TextTransformer).private())
            .build()
            .unwrap(),
    )
}

fn parse(input: &str) -> ValuesGroup {
    match StringQueryParser::new(customers()).parse(input) {
        Ok(condition) => condition.values_group().clone(),
        Err(error) => panic!("unexpected failure for {:?}: {}", input, error),
    }
}

fn parse_err(input: &str) -> Vec<(ErrorKind, usize)> {
    parse_err_with(input, ProcessorConfig::default())
}

fn parse_err_with(input: &str, config: ProcessorConfig) -> Vec<(ErrorKind, usize)> {
    match StringQueryParser::with_config(customers(), config).parse(input) {
        Ok(condition) => panic!("expected failure, got {:?}", condition.values_group()),
        Err(QueryError::InvalidCondition(errors)) => {
            errors.iter().map(|e| (e.kind, e.column)).collect()
        }
    }
}

// =============================================================================
// Structure
// =============================================================================

#[test]
fn test_mixed_condition() {
    let root = parse(
        "id: 1, !5, 10 ~ 20; name: \"Doe, John\", ~i> jo; balance: >= 100.5; *(status: active; name: x)",
    );

    assert_eq!(root.logical(), GroupLogical::And);
    assert_eq!(
        root.fields().map(|(name, _)| name).collect::<Vec<_>>(),
        vec!["id", "name", "balance"]
    );

    let id = root.field("id").unwrap();
    assert_eq!(id.simple_values(), &[ModelValue::Integer(1)]);
    assert_eq!(id.excluded_simple_values(), &[ModelValue::Integer(5)]);
    assert_eq!(id.ranges(), &[Range::new(10, 20)]);

    let name = root.field("name").unwrap();
    assert_eq!(name.simple_values(), &[ModelValue::text("Doe, John")]);
    assert_eq!(
        name.pattern_matchers(),
        &[PatternMatch::new(PatternMatchType::StartsWith, "jo", true)]
    );

    let balance = root.field("balance").unwrap();
    assert_eq!(
        balance.comparisons(),
        &[Compare::new(CompareOperator::GreaterOrEqual, 100.5)]
    );

    assert_eq!(root.groups().len(), 1);
    let group = &root.groups()[0];
    assert_eq!(group.logical(), GroupLogical::Or);
    assert_eq!(
        group.field("status").unwrap().simple_values(),
        &[ModelValue::text("active")]
    );
}

#[test]
fn test_multiline_input() {
    let root = parse("id: 1,\n    2;\nname: foo;\n(\n  status: a\n)\n");
    assert_eq!(
        root.field("id").unwrap().simple_values(),
        &[ModelValue::Integer(1), ModelValue::Integer(2)]
    );
    assert_eq!(root.groups()[0].field_count(), 1);
}

#[test]
fn test_root_or_and_first_group() {
    let root = parse("* id: 1; name: foo");
    assert_eq!(root.logical(), GroupLogical::Or);
    assert_eq!(root.field_count(), 2);

    let root = parse("*(id: 1); (id: 2)");
    assert_eq!(root.logical(), GroupLogical::And);
    assert_eq!(root.groups()[0].logical(), GroupLogical::Or);
    assert_eq!(root.groups()[1].logical(), GroupLogical::And);
}

#[test]
fn test_same_field_on_different_levels() {
    let root = parse("id: 1; (id: 2; (id: 3))");
    assert_eq!(root.field("id").unwrap().count(), 1);
    assert_eq!(root.groups()[0].field("id").unwrap().count(), 1);
    assert_eq!(root.groups()[0].groups()[0].field("id").unwrap().count(), 1);
}

#[test]
fn test_empty_input_and_empty_group() {
    assert!(parse("").is_empty());
    assert!(parse("  \n ").is_empty());

    let root = parse("()");
    assert_eq!(root.groups().len(), 1);
    assert!(root.groups()[0].is_empty());
}

#[test]
fn test_private_field_is_accepted() {
    let root = parse("secret: x");
    assert!(root.has_field("secret"));
}

#[test]
fn test_labels() {
    let config = ProcessorConfig::builder()
        .with_field_names(FieldNameMode::Label)
        .build();
    let parser = StringQueryParser::with_config(customers(), config);

    let condition = parser.parse("Customer id: 1; Status: open").unwrap();
    let root = condition.values_group();
    assert!(root.has_field("id"));
    assert!(root.has_field("status"));

    // In label mode the plain name is still accepted when no label is set.
    assert!(parser.parse("secret: x").is_ok());
}

#[test]
fn test_condition_keeps_field_set() {
    let condition = StringQueryParser::new(customers()).parse("id: 1").unwrap();
    assert_eq!(condition.field_set().name(), "customers");
    assert!(condition.field_set().is_private("secret"));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_several_errors_are_collected() {
    let errors = parse_err("id: x; unknown: 1; name: \"open");
    assert_eq!(
        errors,
        vec![
            (ErrorKind::Validation, 5),
            (ErrorKind::UnknownField, 8),
            (ErrorKind::Lexical, 26),
        ]
    );
}

#[test]
fn test_error_inside_group_does_not_hide_siblings() {
    let errors = parse_err("(id: ; name: a); id: 1.5");
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].0, ErrorKind::Syntax);
    assert_eq!(errors[1], (ErrorKind::Validation, 22));
}

#[test]
fn test_unclosed_group() {
    let errors = parse_err("id: 1; (name: a");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, ErrorKind::Syntax);
}

#[test]
fn test_reserved_char_in_unquoted_value() {
    assert_eq!(parse_err("name: a?b"), vec![(ErrorKind::Lexical, 8)]);
}

#[test]
fn test_error_message_format() {
    let error = StringQueryParser::new(customers())
        .parse("nope: 1")
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "invalid search condition: unknown field error at column 1: unknown field \"nope\""
    );
}

#[test]
fn test_limits() {
    let config = ProcessorConfig::builder().with_max_nesting_level(1).build();
    let errors = parse_err_with("((id: 1))", config);
    assert_eq!(errors, vec![(ErrorKind::DepthExceeded, 2)]);

    let config = ProcessorConfig::builder().with_max_values(2).build();
    let errors = parse_err_with("id: 1, 2, 3", config);
    assert_eq!(errors, vec![(ErrorKind::ValuesOverflow, 11)]);

    let config = ProcessorConfig::builder().with_max_groups(1).build();
    let errors = parse_err_with("(id: 1); (id: 2)", config);
    assert_eq!(errors, vec![(ErrorKind::GroupsOverflow, 10)]);
}

#[test]
fn test_large_input_reports_exact_columns() {
    // 1_000 groups of 100 values, with a multi-byte value near the end.
    let group = format!(
        "(id: {})",
        (0..100).map(|v| v.to_string()).collect::<Vec<_>>().join(", ")
    );
    let mut input = vec![group; 1_000].join("; ");
    input.push_str("; name: \"é\"; id: x");

    let config = ProcessorConfig::builder().with_max_groups(1_000).build();
    let errors = parse_err_with(&input, config);
    let expected = input.chars().count();
    assert_eq!(errors, vec![(ErrorKind::Validation, expected)]);
}
