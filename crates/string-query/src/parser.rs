//! Recursive-descent parser for the StringQuery format.
//!
//! Grammar:
//!
//! ```text
//! Condition      := GroupPrefix? PairOrGroup*
//! PairOrGroup    := Group | FieldValuePair
//! Group          := GroupPrefix? '(' PairOrGroup* ')' ';'?
//! FieldValuePair := FieldName ':' ValueList ';'?
//! ValueList      := Value (',' Value)*
//! Value          := '!'? (Range | SimpleValue) | CompareValue | PatternMatchValue
//! GroupPrefix    := '*' | '&'
//! ```
//!
//! At the root a leading `*` marks the whole condition `OR`, unless it is
//! directly followed by `(`, in which case it belongs to the first group.
//!
//! An error inside a field-value pair or group aborts that construct only;
//! parsing resumes with its next sibling so one call can report several
//! problems.

use std::sync::Arc;

use crate::builder::StructureBuilder;
use crate::condition::SearchCondition;
use crate::config::{FieldNameMode, ProcessorConfig};
use crate::error::{BuildError, ConditionError, ErrorKind, QueryError, QueryResult};
use crate::field::FieldSet;
use crate::lexer::{LexedValue, Lexer, ValueType, RESERVED_CHARS};
use crate::value::{Compare, GroupLogical, ModelValue, PatternMatch, Range, ValuesGroup};

/// Parses StringQuery input against a field set.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use string_query::{FieldSet, GroupLogical, IntegerTransformer, ModelValue, StringQueryParser};
///
/// let fields = Arc::new(
///     FieldSet::builder("products")
///         .field("id", IntegerTransformer)
///         .text("name")
///         .build()
///         .unwrap(),
/// );
///
/// let parser = StringQueryParser::new(fields);
/// let condition = parser.parse("id: 1, 2; *(name: foo; id: >10)").unwrap();
///
/// let root = condition.values_group();
/// assert_eq!(
///     root.field("id").unwrap().simple_values(),
///     &[ModelValue::Integer(1), ModelValue::Integer(2)]
/// );
/// assert_eq!(root.groups()[0].logical(), GroupLogical::Or);
/// ```
#[derive(Debug, Clone)]
pub struct StringQueryParser {
    field_set: Arc<FieldSet>,
    config: ProcessorConfig,
}

impl StringQueryParser {
    /// Creates a parser with the default configuration.
    pub fn new(field_set: Arc<FieldSet>) -> Self {
        Self::with_config(field_set, ProcessorConfig::default())
    }

    /// Creates a parser with a custom configuration.
    pub fn with_config(field_set: Arc<FieldSet>, config: ProcessorConfig) -> Self {
        Self { field_set, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// The field set input is resolved against.
    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }

    /// Parses `input` into a condition.
    ///
    /// All diagnostics are returned together in
    /// [`QueryError::InvalidCondition`].
    pub fn parse(&self, input: &str) -> QueryResult<SearchCondition> {
        log::debug!(
            "parsing condition for field set \"{}\" ({} characters)",
            self.field_set.name(),
            input.chars().count()
        );

        let parser = ConditionParser {
            lexer: Lexer::new(input),
            builder: StructureBuilder::new(),
            fields: &self.field_set,
            config: &self.config,
            level: 0,
            errors: Vec::new(),
        };

        match parser.run() {
            Ok(root) => {
                log::debug!(
                    "parsed condition with {} field(s) and {} group(s) at root",
                    root.field_count(),
                    root.groups().len()
                );
                Ok(SearchCondition::new(Arc::clone(&self.field_set), root))
            }
            Err(errors) => {
                log::debug!("condition rejected with {} error(s)", errors.len());
                Err(QueryError::InvalidCondition(errors))
            }
        }
    }
}

/// Parses `input` against `field_set` using the default configuration.
pub fn parse(input: &str, field_set: Arc<FieldSet>) -> QueryResult<SearchCondition> {
    StringQueryParser::new(field_set).parse(input)
}

// =============================================================================
// Driver
// =============================================================================

/// State of a single parse; discarded afterwards.
struct ConditionParser<'a> {
    lexer: Lexer<'a>,
    builder: StructureBuilder,
    fields: &'a FieldSet,
    config: &'a ProcessorConfig,
    level: usize,
    errors: Vec<ConditionError>,
}

impl<'a> ConditionParser<'a> {
    fn run(mut self) -> Result<ValuesGroup, Vec<ConditionError>> {
        self.lexer.skip_empty_lines();

        if self.lexer.is_glimpse("*") && !self.lexer.is_glimpse_group() {
            self.lexer.match_optional("*");
            self.builder.root_group_mut().set_logical(GroupLogical::Or);
        }

        self.field_values_pairs(false);
        self.assert_level0();

        if !self.errors.is_empty() {
            return Err(self.errors);
        }

        let column = self.lexer.column();
        self.builder
            .finish()
            .map_err(|error| vec![ConditionError::new(ErrorKind::Syntax, column, error.to_string())])
    }

    fn assert_level0(&mut self) {
        if self.level != 0 || self.builder.depth() != 0 || !self.lexer.is_end() {
            let error = self
                .lexer
                .create_format_error(ErrorKind::Syntax, "unclosed construct at end of input");
            self.errors.push(error);
        }
    }

    fn build_error(&self, column: usize, error: BuildError) -> ConditionError {
        ConditionError::new(ErrorKind::Syntax, column, error.to_string())
    }

    // =========================================================================
    // Pairs and groups
    // =========================================================================

    fn field_values_pairs(&mut self, in_group: bool) {
        loop {
            self.lexer.skip_empty_lines();
            if self.lexer.is_end() {
                return;
            }

            if self.lexer.is_glimpse(")") {
                if in_group {
                    return;
                }
                let error = self.lexer.create_format_error(
                    ErrorKind::Syntax,
                    "cannot close a group that was never opened",
                );
                self.errors.push(error);
                self.lexer.match_optional(")");
                self.lexer.match_optional(";");
                continue;
            }

            if self.lexer.is_glimpse_group() {
                self.field_group();
                continue;
            }

            let result = if self.lexer.is_glimpse("*") || self.lexer.is_glimpse("&") {
                Err(self.lexer.create_format_error(
                    ErrorKind::Syntax,
                    "group logical marker must be followed by \"(\"",
                ))
            } else {
                self.field_values()
            };

            if let Err(error) = result {
                log::trace!("abandoning field-value pair: {}", error);
                self.errors.push(error);
                self.builder.abandon_values();
                self.lexer.skip_to_pair_end();
            }
        }
    }

    fn field_group(&mut self) {
        self.lexer.skip_whitespace();
        let column = self.lexer.column();

        let logical = match self.lexer.group_open() {
            Ok(Some('*')) => GroupLogical::Or,
            Ok(_) => GroupLogical::And,
            Err(error) => {
                self.errors.push(error);
                self.lexer.skip_to_pair_end();
                return;
            }
        };

        self.level += 1;
        if self.level > self.config.max_nesting_level {
            self.errors.push(ConditionError::new(
                ErrorKind::DepthExceeded,
                column,
                format!(
                    "group nesting exceeds the maximum level of {}",
                    self.config.max_nesting_level
                ),
            ));
            self.lexer.skip_group_body();
        } else if self.builder.current_group().groups().len() >= self.config.max_groups {
            self.errors.push(ConditionError::new(
                ErrorKind::GroupsOverflow,
                column,
                format!(
                    "group exceeds the maximum of {} subgroups",
                    self.config.max_groups
                ),
            ));
            self.lexer.skip_group_body();
        } else {
            self.group_body(logical, column);
        }
        self.level -= 1;

        self.lexer.skip_empty_lines();
        self.lexer.match_optional(";");
    }

    fn group_body(&mut self, logical: GroupLogical, column: usize) {
        if let Err(error) = self.builder.enter_group(logical) {
            let error = self.build_error(column, error);
            self.errors.push(error);
            self.lexer.skip_group_body();
            return;
        }
        log::trace!("entered {} group at level {}", logical, self.level);

        self.field_values_pairs(true);

        if self.lexer.match_optional(")").is_none() {
            let error = self.lexer.create_format_error(
                ErrorKind::Syntax,
                format!("group opened at column {} is never closed, expected \")\"", column),
            );
            self.errors.push(error);
            // The frame was entered above, so this cannot fail.
            let _ = self.builder.discard_group();
            return;
        }

        if let Err(error) = self.builder.leave_group() {
            let error = self.build_error(column, error);
            self.errors.push(error);
        }
    }

    fn field_values(&mut self) -> Result<(), ConditionError> {
        let column = self.lexer.column();
        let name = self.field_name(column)?;
        self.builder
            .field(&name)
            .map_err(|error| self.build_error(column, error))?;
        log::trace!("reading values of field \"{}\"", name);

        self.lexer.skip_empty_lines();
        let mut count = 0usize;

        while !self.at_pair_end() {
            if count == self.config.max_values {
                return Err(self.lexer.create_format_error(
                    ErrorKind::ValuesOverflow,
                    format!(
                        "field \"{}\" exceeds the maximum of {} values",
                        name, self.config.max_values
                    ),
                ));
            }

            let unquoted_end = self.value(&name)?;
            count += 1;

            let value_end = self.lexer.position();
            self.lexer.skip_empty_lines();
            let separator = self.lexer.column();
            if self.lexer.match_optional(",").is_some() {
                self.lexer.skip_empty_lines();
                if self.at_pair_end() {
                    return Err(ConditionError::new(
                        ErrorKind::Syntax,
                        separator,
                        "dangling value separator \",\", expected another value",
                    ));
                }
            } else if !self.at_pair_end() {
                let spaced = self.lexer.position() != value_end;
                let reserved = self
                    .lexer
                    .peek_char()
                    .is_some_and(|c| RESERVED_CHARS.contains(&c));

                return Err(if unquoted_end && spaced && !reserved {
                    self.lexer.create_format_error(
                        ErrorKind::Lexical,
                        "unquoted values cannot contain whitespace, quote the value",
                    )
                } else {
                    self.lexer.create_format_error(
                        ErrorKind::Syntax,
                        format!(
                            "expected \",\" or \";\" after a value, found {}",
                            self.lexer.describe_current()
                        ),
                    )
                });
            }
        }

        if count == 0 {
            return Err(self.lexer.create_format_error(
                ErrorKind::Syntax,
                format!("field \"{}\" requires at least one value", name),
            ));
        }

        self.builder
            .end_values()
            .map_err(|error| self.build_error(column, error))?;
        self.lexer.match_optional(";");

        Ok(())
    }

    fn at_pair_end(&self) -> bool {
        self.lexer.is_end() || self.lexer.is_glimpse(";") || self.lexer.is_glimpse(")")
    }

    fn field_name(&mut self, column: usize) -> Result<String, ConditionError> {
        let (token, field) = match self.config.field_names {
            FieldNameMode::Name => {
                let token = self.lexer.field_identification()?;
                (token, self.fields.get(token))
            }
            FieldNameMode::Label => {
                let token = self.lexer.field_label_identification()?;
                (token, self.fields.find_by_label(token))
            }
        };

        match field {
            Some(field) => Ok(field.name().to_string()),
            None => Err(ConditionError::new(
                ErrorKind::UnknownField,
                column,
                format!("unknown field \"{}\"", token),
            )),
        }
    }

    // =========================================================================
    // Values
    // =========================================================================

    /// Reads one value into the open field. Returns `true` when the value
    /// ends with an unquoted literal.
    fn value(&mut self, name: &str) -> Result<bool, ConditionError> {
        let column = self.lexer.column();

        let (added, unquoted_end) = match self.lexer.detect_value_type() {
            ValueType::Compare => {
                let (operator, value) = self.lexer.comparison_value()?;
                let unquoted_end = !value.quoted;
                let added = match self.to_model(name, &value) {
                    Some(value) => self.builder.comparison_value(Compare { operator, value }),
                    None => Ok(()),
                };
                (added, unquoted_end)
            }
            ValueType::PatternMatch => {
                let parts = self.lexer.pattern_match_value()?;
                let unquoted_end = !parts.value.quoted;
                let added = self.builder.pattern_match_value(PatternMatch::new(
                    parts.kind,
                    parts.value.text,
                    parts.case_insensitive,
                ));
                (added, unquoted_end)
            }
            ValueType::Range => {
                let excluded = self.lexer.match_optional("!").is_some();
                let parts = self.lexer.range_value()?;
                let unquoted_end = !parts.upper.quoted && !parts.upper_delimited;
                let lower = self.to_model(name, &parts.lower);
                let upper = self.to_model(name, &parts.upper);

                let added = match (lower, upper) {
                    (Some(lower), Some(upper)) => {
                        let range = Range {
                            lower,
                            upper,
                            lower_inclusive: parts.lower_inclusive,
                            upper_inclusive: parts.upper_inclusive,
                        };
                        if excluded {
                            self.builder.excluded_range_value(range)
                        } else {
                            self.builder.range_value(range)
                        }
                    }
                    _ => Ok(()),
                };
                (added, unquoted_end)
            }
            ValueType::Simple => {
                let excluded = self.lexer.match_optional("!").is_some();
                let value = self.lexer.value_part()?;
                let unquoted_end = !value.quoted;
                let added = match self.to_model(name, &value) {
                    Some(value) if excluded => self.builder.excluded_simple_value(value),
                    Some(value) => self.builder.simple_value(value),
                    None => Ok(()),
                };
                (added, unquoted_end)
            }
        };

        added
            .map(|()| unquoted_end)
            .map_err(|error| self.build_error(column, error))
    }

    /// Converts a literal through the field; a rejected literal is recorded
    /// as a validation error without aborting the pair.
    fn to_model(&mut self, name: &str, value: &LexedValue) -> Option<ModelValue> {
        let field = self.fields.get(name)?;
        match field.text_to_model(&value.text) {
            Ok(model) => Some(model),
            Err(failure) => {
                self.errors.push(ConditionError::new(
                    ErrorKind::Validation,
                    value.column,
                    format!("invalid value for field \"{}\": {}", name, failure),
                ));
                None
            }
        }
    }
}
