//! StringQuery exporter.
//!
//! Renders a [`SearchCondition`] back into StringQuery text. The canonical
//! form uses machine field names and is accepted unchanged by the parser;
//! [`StringQueryExporter::with_labels`] produces a human-readable variant.

use string_query::{
    Compare, FieldSet, GroupLogical, ModelValue, PatternMatch, Range, SearchCondition, ValuesBag,
    ValuesGroup, RESERVED_CHARS,
};

use crate::label::LabelResolver;

/// Exports conditions as StringQuery text.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use string_query::{parse, FieldSet, IntegerTransformer};
/// use string_query_exporter::StringQueryExporter;
///
/// let fields = Arc::new(
///     FieldSet::builder("orders")
///         .field("id", IntegerTransformer)
///         .text("customer")
///         .build()
///         .unwrap(),
/// );
/// let condition = parse("id: 1 , 2;customer:\"Doe, J\"", fields).unwrap();
///
/// assert_eq!(
///     StringQueryExporter::new().export_condition(&condition),
///     "id: 1, 2; customer: \"Doe, J\""
/// );
/// ```
#[derive(Default)]
pub struct StringQueryExporter {
    labels: Option<Box<dyn LabelResolver>>,
}

impl std::fmt::Debug for StringQueryExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringQueryExporter")
            .field("labels", &self.labels.is_some())
            .finish()
    }
}

impl StringQueryExporter {
    /// Creates an exporter writing machine field names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exporter writing the label resolved for each field.
    ///
    /// The output is meant for display; it parses only with
    /// [`FieldNameMode::Label`](string_query::FieldNameMode::Label) and
    /// labels that stay clear of reserved characters.
    pub fn with_labels(resolver: impl LabelResolver + 'static) -> Self {
        Self {
            labels: Some(Box::new(resolver)),
        }
    }

    /// Exports a whole condition. An empty condition yields an empty string.
    pub fn export_condition(&self, condition: &SearchCondition) -> String {
        let root = condition.values_group();
        let items = self.export_items(root, condition.field_set(), true);

        let output = if root.logical() == GroupLogical::Or && !items.is_empty() {
            format!("* {}", items.join("; "))
        } else {
            items.join("; ")
        };

        log::trace!(
            "exported condition for field set \"{}\" ({} characters)",
            condition.field_set().name(),
            output.len()
        );
        output
    }

    /// Renders the fields and subgroups of `group`, in that order.
    fn export_items(&self, group: &ValuesGroup, fields: &FieldSet, root: bool) -> Vec<String> {
        let mut items = Vec::new();

        for (name, bag) in group.fields() {
            if fields.is_private(name) || bag.is_empty() {
                continue;
            }
            items.push(format!(
                "{}: {}",
                self.field_name(name, fields),
                export_values(name, bag, fields)
            ));
        }

        // Behind the root `*` marker the first group needs an explicit prefix,
        // otherwise `* (` would be read as an OR group.
        let explicit_prefix = root && items.is_empty() && group.logical() == GroupLogical::Or;

        for (index, subgroup) in group.groups().iter().enumerate() {
            let prefix = match subgroup.logical() {
                GroupLogical::Or => "*",
                GroupLogical::And if explicit_prefix && index == 0 => "&",
                GroupLogical::And => "",
            };
            let content = self.export_items(subgroup, fields, false).join("; ");
            items.push(format!("{}({})", prefix, content));
        }

        items
    }

    fn field_name(&self, name: &str, fields: &FieldSet) -> String {
        match (&self.labels, fields.get(name)) {
            (Some(resolver), Some(field)) => resolver.resolve(field),
            _ => name.to_string(),
        }
    }
}

fn export_values(name: &str, bag: &ValuesBag, fields: &FieldSet) -> String {
    let text = |value: &ModelValue| match fields.get(name) {
        Some(field) => field.model_to_text(value),
        None => value.to_string(),
    };

    let mut values = Vec::with_capacity(bag.count());
    values.extend(bag.simple_values().iter().map(|v| quote(&text(v))));
    values.extend(
        bag.excluded_simple_values()
            .iter()
            .map(|v| format!("!{}", quote(&text(v)))),
    );
    values.extend(bag.ranges().iter().map(|r| export_range(r, &text)));
    values.extend(
        bag.excluded_ranges()
            .iter()
            .map(|r| format!("!{}", export_range(r, &text))),
    );
    values.extend(bag.comparisons().iter().map(|c| export_compare(c, &text)));
    values.extend(bag.pattern_matchers().iter().map(export_pattern));

    values.join(", ")
}

fn export_range(range: &Range, text: &impl Fn(&ModelValue) -> String) -> String {
    format!(
        "{}{} ~ {}{}",
        if range.lower_inclusive { "" } else { "]" },
        quote(&text(&range.lower)),
        quote(&text(&range.upper)),
        if range.upper_inclusive { "" } else { "[" },
    )
}

fn export_compare(compare: &Compare, text: &impl Fn(&ModelValue) -> String) -> String {
    format!("{}{}", compare.operator, quote(&text(&compare.value)))
}

fn export_pattern(pattern: &PatternMatch) -> String {
    format!(
        "~{}{}{}{}",
        if pattern.case_insensitive { "i" } else { "" },
        if pattern.kind.is_negated() { "!" } else { "" },
        pattern.kind.operator_char(),
        quote(&pattern.value),
    )
}

/// Quotes `value` when it would not read back as a single literal.
fn quote(value: &str) -> String {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| c == '"' || c.is_whitespace() || RESERVED_CHARS.contains(&c));

    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
