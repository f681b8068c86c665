//! Error types for StringQuery processing.

use thiserror::Error;

/// Category of a [`ConditionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorKind {
    /// Malformed token: unterminated quote, reserved character in an
    /// unquoted value.
    Lexical,
    /// Unexpected token, unclosed group, dangling separator, stray group
    /// marker.
    Syntax,
    /// Field name not registered in the field set.
    UnknownField,
    /// Groups nested deeper than allowed.
    DepthExceeded,
    /// The field rejected a value.
    Validation,
    /// Too many values for a single field.
    ValuesOverflow,
    /// Too many subgroups in a single group.
    GroupsOverflow,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Syntax => "syntax",
            ErrorKind::UnknownField => "unknown field",
            ErrorKind::DepthExceeded => "nesting depth",
            ErrorKind::Validation => "validation",
            ErrorKind::ValuesOverflow => "values overflow",
            ErrorKind::GroupsOverflow => "groups overflow",
        };
        f.write_str(name)
    }
}

/// A single positioned diagnostic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[error("{kind} error at column {column}: {message}")]
pub struct ConditionError {
    /// Description of the problem.
    pub message: String,
    /// 1-based character (not byte) column in the input.
    pub column: usize,
    /// Category.
    pub kind: ErrorKind,
}

impl ConditionError {
    /// Creates a new diagnostic.
    pub fn new(kind: ErrorKind, column: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            column,
            kind,
        }
    }
}

/// Errors returned by the StringQuery parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// The input could not be turned into a condition; holds every
    /// collected diagnostic, in input order of detection.
    #[error("invalid search condition: {}", format_errors(.0))]
    InvalidCondition(Vec<ConditionError>),
}

impl QueryError {
    /// The collected diagnostics.
    pub fn errors(&self) -> &[ConditionError] {
        match self {
            QueryError::InvalidCondition(errors) => errors,
        }
    }
}

fn format_errors(errors: &[ConditionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Misuse of the [`StructureBuilder`](crate::StructureBuilder).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The field already has values in the current group.
    #[error("field \"{0}\" is already declared in this group")]
    DuplicateField(String),

    /// A field is open while another field or a group was requested.
    #[error("field \"{0}\" is still open")]
    FieldAlreadyOpen(String),

    /// A value was added while no field is open.
    #[error("no field is open")]
    NoOpenField,

    /// `leave_group` was called on the root group.
    #[error("cannot leave the root group")]
    CannotLeaveRoot,

    /// The builder was finished with groups still open.
    #[error("{0} group(s) still open")]
    UnclosedGroups(usize),
}

/// A field set could not be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldSetError {
    /// The name is not a valid field token: a letter or `_`, followed by
    /// letters, digits, `_` or `-`.
    #[error("field name \"{0}\" cannot be used in a condition")]
    InvalidFieldName(String),
}

/// A field rejected a literal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransformationFailed {
    /// Why the literal was rejected.
    pub message: String,
}

impl TransformationFailed {
    /// Creates a new failure.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type for StringQuery parsing.
pub type QueryResult<T> = std::result::Result<T, QueryError>;
