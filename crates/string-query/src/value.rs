//! Value types making up a search condition tree.
//!
//! A condition is a tree of [`ValuesGroup`]s. Each group combines per-field
//! [`ValuesBag`]s and nested subgroups under one [`GroupLogical`].

use indexmap::IndexMap;

// =============================================================================
// Model values
// =============================================================================

/// A field's typed ("model") representation of a literal.
///
/// Produced by the field's [`ValueTransformer`](crate::ValueTransformer); the
/// parser never interprets it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum ModelValue {
    /// Signed integer.
    Integer(i64),
    /// Decimal number.
    Decimal(f64),
    /// Free text.
    Text(String),
}

impl ModelValue {
    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        ModelValue::Text(value.into())
    }
}

impl std::fmt::Display for ModelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelValue::Integer(v) => write!(f, "{}", v),
            ModelValue::Decimal(v) => write!(f, "{}", v),
            ModelValue::Text(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for ModelValue {
    fn from(value: i64) -> Self {
        ModelValue::Integer(value)
    }
}

impl From<i32> for ModelValue {
    fn from(value: i32) -> Self {
        ModelValue::Integer(i64::from(value))
    }
}

impl From<f64> for ModelValue {
    fn from(value: f64) -> Self {
        ModelValue::Decimal(value)
    }
}

impl From<&str> for ModelValue {
    fn from(value: &str) -> Self {
        ModelValue::Text(value.to_string())
    }
}

impl From<String> for ModelValue {
    fn from(value: String) -> Self {
        ModelValue::Text(value)
    }
}

// =============================================================================
// Range / Compare / PatternMatch
// =============================================================================

/// A range between two bounds, each side inclusive by default.
///
/// Bound ordering is not checked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Range {
    /// Lower bound.
    pub lower: ModelValue,
    /// Upper bound.
    pub upper: ModelValue,
    /// Whether the lower bound itself is part of the range.
    pub lower_inclusive: bool,
    /// Whether the upper bound itself is part of the range.
    pub upper_inclusive: bool,
}

impl Range {
    /// Creates a range with both sides inclusive.
    pub fn new(lower: impl Into<ModelValue>, upper: impl Into<ModelValue>) -> Self {
        Self {
            lower: lower.into(),
            upper: upper.into(),
            lower_inclusive: true,
            upper_inclusive: true,
        }
    }

    /// Sets the inclusiveness of both sides.
    pub fn with_inclusive(mut self, lower: bool, upper: bool) -> Self {
        self.lower_inclusive = lower;
        self.upper_inclusive = upper;
        self
    }
}

/// Comparison operators: `<`, `<=`, `<>`, `>`, `>=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CompareOperator {
    /// `<`
    Lower,
    /// `<=`
    LowerOrEqual,
    /// `<>`
    NotEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterOrEqual,
}

impl CompareOperator {
    /// The operator as written in a query.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOperator::Lower => "<",
            CompareOperator::LowerOrEqual => "<=",
            CompareOperator::NotEqual => "<>",
            CompareOperator::Greater => ">",
            CompareOperator::GreaterOrEqual => ">=",
        }
    }

    /// Parses an operator token, `None` when it is not one.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(CompareOperator::Lower),
            "<=" => Some(CompareOperator::LowerOrEqual),
            "<>" => Some(CompareOperator::NotEqual),
            ">" => Some(CompareOperator::Greater),
            ">=" => Some(CompareOperator::GreaterOrEqual),
            _ => None,
        }
    }
}

impl std::fmt::Display for CompareOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A comparison against a single value, eg. `>= 10`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Compare {
    /// The comparison operator.
    pub operator: CompareOperator,
    /// The value compared against.
    pub value: ModelValue,
}

impl Compare {
    /// Creates a comparison.
    pub fn new(operator: CompareOperator, value: impl Into<ModelValue>) -> Self {
        Self {
            operator,
            value: value.into(),
        }
    }
}

/// Kind of pattern match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PatternMatchType {
    /// `~*`
    Contains,
    /// `~>`
    StartsWith,
    /// `~<`
    EndsWith,
    /// `~!*`
    NotContains,
    /// `~!>`
    NotStartsWith,
    /// `~!<`
    NotEndsWith,
}

impl PatternMatchType {
    /// Resolves the type from the operator character and negation marker.
    pub fn from_operator(operator: char, negated: bool) -> Option<Self> {
        let kind = match (operator, negated) {
            ('*', false) => PatternMatchType::Contains,
            ('>', false) => PatternMatchType::StartsWith,
            ('<', false) => PatternMatchType::EndsWith,
            ('*', true) => PatternMatchType::NotContains,
            ('>', true) => PatternMatchType::NotStartsWith,
            ('<', true) => PatternMatchType::NotEndsWith,
            _ => return None,
        };
        Some(kind)
    }

    /// Whether this is one of the `NOT` variants.
    pub fn is_negated(&self) -> bool {
        matches!(
            self,
            PatternMatchType::NotContains
                | PatternMatchType::NotStartsWith
                | PatternMatchType::NotEndsWith
        )
    }

    /// The operator character (`*`, `>` or `<`).
    pub fn operator_char(&self) -> char {
        match self {
            PatternMatchType::Contains | PatternMatchType::NotContains => '*',
            PatternMatchType::StartsWith | PatternMatchType::NotStartsWith => '>',
            PatternMatchType::EndsWith | PatternMatchType::NotEndsWith => '<',
        }
    }

    /// Upper-case name, eg. `NOT_STARTS_WITH`.
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternMatchType::Contains => "CONTAINS",
            PatternMatchType::StartsWith => "STARTS_WITH",
            PatternMatchType::EndsWith => "ENDS_WITH",
            PatternMatchType::NotContains => "NOT_CONTAINS",
            PatternMatchType::NotStartsWith => "NOT_STARTS_WITH",
            PatternMatchType::NotEndsWith => "NOT_ENDS_WITH",
        }
    }
}

/// A pattern match on the literal text of a value.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatternMatch {
    /// Match type.
    pub kind: PatternMatchType,
    /// The pattern, kept as literal text.
    pub value: String,
    /// Case-insensitive matching (`~i`).
    pub case_insensitive: bool,
}

impl PatternMatch {
    /// Creates a pattern match.
    pub fn new(kind: PatternMatchType, value: impl Into<String>, case_insensitive: bool) -> Self {
        Self {
            kind,
            value: value.into(),
            case_insensitive,
        }
    }
}

// =============================================================================
// ValuesBag
// =============================================================================

/// All values of one field within a group.
///
/// Each kind keeps its own insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuesBag {
    simple_values: Vec<ModelValue>,
    excluded_simple_values: Vec<ModelValue>,
    ranges: Vec<Range>,
    excluded_ranges: Vec<Range>,
    comparisons: Vec<Compare>,
    pattern_matchers: Vec<PatternMatch>,
}

impl ValuesBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a simple value.
    pub fn add_simple_value(&mut self, value: impl Into<ModelValue>) -> &mut Self {
        self.simple_values.push(value.into());
        self
    }

    /// Adds an excluded simple value.
    pub fn add_excluded_simple_value(&mut self, value: impl Into<ModelValue>) -> &mut Self {
        self.excluded_simple_values.push(value.into());
        self
    }

    /// Adds a range.
    pub fn add_range(&mut self, range: Range) -> &mut Self {
        self.ranges.push(range);
        self
    }

    /// Adds an excluded range.
    pub fn add_excluded_range(&mut self, range: Range) -> &mut Self {
        self.excluded_ranges.push(range);
        self
    }

    /// Adds a comparison.
    pub fn add_comparison(&mut self, compare: Compare) -> &mut Self {
        self.comparisons.push(compare);
        self
    }

    /// Adds a pattern match.
    pub fn add_pattern_match(&mut self, pattern: PatternMatch) -> &mut Self {
        self.pattern_matchers.push(pattern);
        self
    }

    /// Simple values in insertion order.
    pub fn simple_values(&self) -> &[ModelValue] {
        &self.simple_values
    }

    /// Excluded simple values in insertion order.
    pub fn excluded_simple_values(&self) -> &[ModelValue] {
        &self.excluded_simple_values
    }

    /// Ranges in insertion order.
    pub fn ranges(&self) -> &[Range] {
        &self.ranges
    }

    /// Excluded ranges in insertion order.
    pub fn excluded_ranges(&self) -> &[Range] {
        &self.excluded_ranges
    }

    /// Comparisons in insertion order.
    pub fn comparisons(&self) -> &[Compare] {
        &self.comparisons
    }

    /// Pattern matches in insertion order.
    pub fn pattern_matchers(&self) -> &[PatternMatch] {
        &self.pattern_matchers
    }

    /// Total number of values over all kinds.
    pub fn count(&self) -> usize {
        self.simple_values.len()
            + self.excluded_simple_values.len()
            + self.ranges.len()
            + self.excluded_ranges.len()
            + self.comparisons.len()
            + self.pattern_matchers.len()
    }

    /// Returns `true` when the bag holds no values at all.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }
}

// =============================================================================
// ValuesGroup
// =============================================================================

/// Logical operator combining the members of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum GroupLogical {
    /// All members must match.
    #[default]
    And,
    /// Any member may match.
    Or,
}

impl std::fmt::Display for GroupLogical {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupLogical::And => write!(f, "AND"),
            GroupLogical::Or => write!(f, "OR"),
        }
    }
}

/// A node of the condition tree.
///
/// Fields keep their declaration order, as do subgroups.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValuesGroup {
    logical: GroupLogical,
    fields: IndexMap<String, ValuesBag>,
    groups: Vec<ValuesGroup>,
}

impl ValuesGroup {
    /// Creates an empty `AND` group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty group with the given logical.
    pub fn with_logical(logical: GroupLogical) -> Self {
        Self {
            logical,
            ..Self::default()
        }
    }

    /// The group logical.
    pub fn logical(&self) -> GroupLogical {
        self.logical
    }

    /// Changes the group logical.
    pub fn set_logical(&mut self, logical: GroupLogical) {
        self.logical = logical;
    }

    /// Adds the values of a field, replacing any earlier bag for it.
    pub fn add_field(&mut self, name: impl Into<String>, values: ValuesBag) -> &mut Self {
        self.fields.insert(name.into(), values);
        self
    }

    /// Appends a subgroup.
    pub fn add_group(&mut self, group: ValuesGroup) -> &mut Self {
        self.groups.push(group);
        self
    }

    /// Returns `true` when the field has a bag in this group.
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// The bag of a field.
    pub fn field(&self, name: &str) -> Option<&ValuesBag> {
        self.fields.get(name)
    }

    /// Fields with their bags, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ValuesBag)> {
        self.fields.iter().map(|(name, bag)| (name.as_str(), bag))
    }

    /// Number of fields in this group.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Subgroups in declaration order.
    pub fn groups(&self) -> &[ValuesGroup] {
        &self.groups
    }

    /// Returns `true` when the group has neither fields nor subgroups.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_keeps_insertion_order_per_kind() {
        let mut bag = ValuesBag::new();
        bag.add_simple_value(2)
            .add_range(Range::new(1, 10))
            .add_simple_value(1);

        assert_eq!(
            bag.simple_values(),
            &[ModelValue::Integer(2), ModelValue::Integer(1)]
        );
        assert_eq!(bag.ranges().len(), 1);
        assert_eq!(bag.count(), 3);
        assert!(!bag.is_empty());
    }

    #[test]
    fn test_range_defaults_inclusive() {
        let range = Range::new(1, 100);
        assert!(range.lower_inclusive);
        assert!(range.upper_inclusive);

        let range = range.with_inclusive(false, true);
        assert!(!range.lower_inclusive);
        assert!(range.upper_inclusive);
    }

    #[test]
    fn test_compare_operator_tokens() {
        for token in ["<", "<=", "<>", ">", ">="] {
            let op = CompareOperator::from_token(token).unwrap();
            assert_eq!(op.as_str(), token);
        }
        assert_eq!(CompareOperator::from_token("=<"), None);
    }

    #[test]
    fn test_pattern_match_type_from_operator() {
        assert_eq!(
            PatternMatchType::from_operator('*', false),
            Some(PatternMatchType::Contains)
        );
        assert_eq!(
            PatternMatchType::from_operator('<', true),
            Some(PatternMatchType::NotEndsWith)
        );
        assert_eq!(PatternMatchType::from_operator('?', false), None);
        assert!(PatternMatchType::NotStartsWith.is_negated());
        assert_eq!(PatternMatchType::NotStartsWith.operator_char(), '>');
    }

    #[test]
    fn test_group_defaults() {
        let group = ValuesGroup::new();
        assert_eq!(group.logical(), GroupLogical::And);
        assert!(group.is_empty());
    }

    #[test]
    fn test_group_fields_keep_declaration_order() {
        let mut group = ValuesGroup::new();
        group.add_field("zeta", ValuesBag::new());
        group.add_field("alpha", ValuesBag::new());

        let names: Vec<&str> = group.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_group() {
        let mut bag = ValuesBag::new();
        bag.add_simple_value(1).add_simple_value("x");
        let mut group = ValuesGroup::with_logical(GroupLogical::Or);
        group.add_field("f", bag);

        let json = serde_json::to_string(&group).unwrap();
        let parsed: ValuesGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, group);
    }
}
