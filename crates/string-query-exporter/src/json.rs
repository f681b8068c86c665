//! JSON exporter.
//!
//! Output shape, per group:
//!
//! ```json
//! {
//!   "fields": {
//!     "id": {
//!       "simple-values": ["1"],
//!       "ranges": [{ "lower": "1", "upper": "10", "inclusive-upper": false }]
//!     }
//!   },
//!   "groups": [{ "fields": { "name": { "simple-values": ["foo"] } } }],
//!   "logical-case": "OR"
//! }
//! ```
//!
//! Values are written as the field's literal text. Empty collections are
//! left out, as are range inclusivity flags that are `true`. `logical-case`
//! only appears on an `OR` group with at least one exported field.

use indexmap::IndexMap;
use serde::Serialize;

use string_query::{
    Compare, FieldSet, GroupLogical, ModelValue, PatternMatch, Range, SearchCondition, ValuesBag,
    ValuesGroup,
};

use crate::error::ExportResult;

/// Exports conditions as JSON documents.
#[derive(Debug, Clone, Default)]
pub struct JsonExporter {
    _private: (),
}

impl JsonExporter {
    /// Creates a JSON exporter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exports a condition as a compact JSON string.
    pub fn export_condition(&self, condition: &SearchCondition) -> ExportResult<String> {
        let document = export_group(condition.values_group(), condition.field_set());
        let output = serde_json::to_string(&document)?;
        log::trace!(
            "exported condition for field set \"{}\" as JSON ({} bytes)",
            condition.field_set().name(),
            output.len()
        );
        Ok(output)
    }

    /// Exports a condition as a [`serde_json::Value`].
    pub fn export_value(&self, condition: &SearchCondition) -> ExportResult<serde_json::Value> {
        let document = export_group(condition.values_group(), condition.field_set());
        Ok(serde_json::to_value(&document)?)
    }
}

// =============================================================================
// Document model
// =============================================================================

#[derive(Debug, Default, Serialize)]
struct GroupDocument {
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    fields: IndexMap<String, FieldDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    groups: Vec<GroupDocument>,
    #[serde(rename = "logical-case", skip_serializing_if = "Option::is_none")]
    logical_case: Option<&'static str>,
}

impl GroupDocument {
    fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
struct FieldDocument {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    simple_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    excluded_simple_values: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ranges: Vec<RangeDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    excluded_ranges: Vec<RangeDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    comparisons: Vec<CompareDocument>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pattern_matchers: Vec<PatternDocument>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct RangeDocument {
    lower: String,
    upper: String,
    #[serde(skip_serializing_if = "is_true")]
    inclusive_lower: bool,
    #[serde(skip_serializing_if = "is_true")]
    inclusive_upper: bool,
}

#[derive(Debug, Serialize)]
struct CompareDocument {
    operator: &'static str,
    value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
struct PatternDocument {
    #[serde(rename = "type")]
    kind: &'static str,
    value: String,
    case_insensitive: bool,
}

fn is_true(value: &bool) -> bool {
    *value
}

// =============================================================================
// Tree walk
// =============================================================================

fn export_group(group: &ValuesGroup, fields: &FieldSet) -> GroupDocument {
    let mut document = GroupDocument::default();

    for (name, bag) in group.fields() {
        if fields.is_private(name) || bag.is_empty() {
            continue;
        }
        document
            .fields
            .insert(name.to_string(), export_values(name, bag, fields));
    }

    document.groups = group
        .groups()
        .iter()
        .map(|subgroup| export_group(subgroup, fields))
        .filter(|subgroup| !subgroup.is_empty())
        .collect();

    if !document.fields.is_empty() && group.logical() == GroupLogical::Or {
        document.logical_case = Some("OR");
    }

    document
}

fn export_values(name: &str, bag: &ValuesBag, fields: &FieldSet) -> FieldDocument {
    let text = |value: &ModelValue| match fields.get(name) {
        Some(field) => field.model_to_text(value),
        None => value.to_string(),
    };
    let to_range = |range: &Range| RangeDocument {
        lower: text(&range.lower),
        upper: text(&range.upper),
        inclusive_lower: range.lower_inclusive,
        inclusive_upper: range.upper_inclusive,
    };
    let to_compare = |compare: &Compare| CompareDocument {
        operator: compare.operator.as_str(),
        value: text(&compare.value),
    };
    let to_pattern = |pattern: &PatternMatch| PatternDocument {
        kind: pattern.kind.as_str(),
        value: pattern.value.clone(),
        case_insensitive: pattern.case_insensitive,
    };

    FieldDocument {
        simple_values: bag.simple_values().iter().map(text).collect(),
        excluded_simple_values: bag.excluded_simple_values().iter().map(text).collect(),
        ranges: bag.ranges().iter().map(to_range).collect(),
        excluded_ranges: bag.excluded_ranges().iter().map(to_range).collect(),
        comparisons: bag.comparisons().iter().map(to_compare).collect(),
        pattern_matchers: bag.pattern_matchers().iter().map(to_pattern).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Arc;
    use string_query::{CompareOperator, IntegerTransformer, PatternMatchType};

    fn fields() -> Arc<FieldSet> {
        Arc::new(
            FieldSet::builder("test")
                .field("id", IntegerTransformer)
                .text("name")
                .private_text("secret")
                .build()
                .unwrap(),
        )
    }

    fn export(root: ValuesGroup) -> serde_json::Value {
        JsonExporter::new()
            .export_value(&SearchCondition::new(fields(), root))
            .unwrap()
    }

    fn id_bag(id: i64) -> ValuesBag {
        let mut bag = ValuesBag::new();
        bag.add_simple_value(id);
        bag
    }

    #[test]
    fn test_empty_condition() {
        assert_eq!(export(ValuesGroup::new()), json!({}));
        assert_eq!(
            JsonExporter::new()
                .export_condition(&SearchCondition::new(fields(), ValuesGroup::new()))
                .unwrap(),
            "{}"
        );
    }

    #[test]
    fn test_value_kinds() {
        let mut bag = ValuesBag::new();
        bag.add_simple_value(1)
            .add_excluded_simple_value(2)
            .add_range(Range::new(1, 10).with_inclusive(true, false))
            .add_excluded_range(Range::new(20, 30).with_inclusive(false, true))
            .add_comparison(Compare::new(CompareOperator::NotEqual, 5));
        let mut names = ValuesBag::new();
        names.add_pattern_match(PatternMatch::new(PatternMatchType::NotContains, "foo", true));

        let mut root = ValuesGroup::new();
        root.add_field("id", bag);
        root.add_field("name", names);

        assert_eq!(
            export(root),
            json!({
                "fields": {
                    "id": {
                        "simple-values": ["1"],
                        "excluded-simple-values": ["2"],
                        "ranges": [{ "lower": "1", "upper": "10", "inclusive-upper": false }],
                        "excluded-ranges": [{ "lower": "20", "upper": "30", "inclusive-lower": false }],
                        "comparisons": [{ "operator": "<>", "value": "5" }]
                    },
                    "name": {
                        "pattern-matchers": [
                            { "type": "NOT_CONTAINS", "value": "foo", "case-insensitive": true }
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_key_order_follows_schema() {
        let mut bag = ValuesBag::new();
        bag.add_comparison(Compare::new(CompareOperator::Greater, 1))
            .add_simple_value(3);
        let mut root = ValuesGroup::with_logical(GroupLogical::Or);
        root.add_field("id", bag);
        let mut empty = ValuesGroup::new();
        empty.add_field("name", ValuesBag::new());
        root.add_group(empty);

        let output = JsonExporter::new()
            .export_condition(&SearchCondition::new(fields(), root))
            .unwrap();
        assert_eq!(
            output,
            r#"{"fields":{"id":{"simple-values":["3"],"comparisons":[{"operator":">","value":"1"}]}},"logical-case":"OR"}"#
        );
    }

    #[test]
    fn test_logical_case_only_with_fields() {
        let mut inner = ValuesGroup::with_logical(GroupLogical::Or);
        inner.add_field("id", id_bag(1));

        let mut root = ValuesGroup::with_logical(GroupLogical::Or);
        root.add_group(inner);

        let mut and_group = ValuesGroup::with_logical(GroupLogical::And);
        and_group.add_field("id", id_bag(2));
        root.add_group(and_group);

        assert_eq!(
            export(root),
            json!({
                "groups": [
                    { "fields": { "id": { "simple-values": ["1"] } }, "logical-case": "OR" },
                    { "fields": { "id": { "simple-values": ["2"] } } }
                ]
            })
        );
    }

    #[test]
    fn test_private_and_empty_content_is_omitted() {
        let mut secret = ValuesBag::new();
        secret.add_simple_value("x");

        let mut hidden = ValuesGroup::with_logical(GroupLogical::Or);
        hidden.add_field("secret", secret);

        let mut root = ValuesGroup::new();
        root.add_field("id", ValuesBag::new());
        root.add_group(hidden);
        root.add_group(ValuesGroup::new());

        assert_eq!(export(root), json!({}));
    }
}
