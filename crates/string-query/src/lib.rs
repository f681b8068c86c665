//! # string-query
//!
//! Parser and condition model for the StringQuery search format.
//!
//! StringQuery expresses search conditions as field/value pairs, grouped
//! with `AND`/`OR` logic:
//!
//! ```text
//! name: "John", Jane; birthday: [2000-01-01 ~ 2010-01-01[; *(status: active; age: >= 18)
//! ```
//!
//! This crate provides:
//! - **Lexer**: tokenizer with character-accurate error columns
//! - **StructureBuilder**: incremental assembly of the condition tree
//! - **StringQueryParser**: recursive-descent driver collecting all errors
//! - **Condition model**: [`SearchCondition`], [`ValuesGroup`], [`ValuesBag`]
//!
//! Exporting a condition back to text or JSON lives in the
//! `string-query-exporter` crate.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use string_query::{parse, FieldSet, IntegerTransformer, Range};
//!
//! let fields = Arc::new(
//!     FieldSet::builder("orders")
//!         .field("total", IntegerTransformer)
//!         .text("customer")
//!         .build()
//!         .unwrap(),
//! );
//!
//! let condition = parse("total: ]10 ~ 100]; customer: ~i* smith", fields).unwrap();
//! let total = condition.values_group().field("total").unwrap();
//! assert_eq!(total.ranges(), &[Range::new(10, 100).with_inclusive(false, true)]);
//! ```
//!
//! ## Syntax Quick Reference
//!
//! | Syntax | Meaning | Example |
//! |--------|---------|---------|
//! | `field: v1, v2;` | Any of the values | `id: 1, 2;` |
//! | `!value` | Excluded value | `id: !3;` |
//! | `a ~ b` | Range, inclusive | `id: 1 ~ 10;` |
//! | `]a ~ b[` | Range, exclusive bounds | `id: ]1 ~ 10[;` |
//! | `<`, `<=`, `<>`, `>`, `>=` | Comparison | `id: >= 5;` |
//! | `~*`, `~>`, `~<` | Contains, starts with, ends with | `name: ~> Jo;` |
//! | `~!*`, `~i*` | Negated, case-insensitive | `name: ~i!* foo;` |
//! | `( … )` | AND group | `(id: 1; name: foo)` |
//! | `*( … )` | OR group | `*(id: 1; name: foo)` |

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod builder;
mod condition;
mod config;
mod error;
mod field;
pub mod lexer;
mod parser;
mod value;

pub use builder::StructureBuilder;
pub use condition::SearchCondition;
pub use config::{FieldNameMode, ProcessorConfig, ProcessorConfigBuilder};
pub use error::{
    BuildError, ConditionError, ErrorKind, FieldSetError, QueryError, QueryResult,
    TransformationFailed,
};
pub use field::{
    DecimalTransformer, FieldDescriptor, FieldSet, FieldSetBuilder, IntegerTransformer,
    TextTransformer, ValueTransformer,
};
pub use lexer::{is_field_name, RESERVED_CHARS};
pub use parser::{parse, StringQueryParser};
pub use value::{
    Compare, CompareOperator, GroupLogical, ModelValue, PatternMatch, PatternMatchType, Range,
    ValuesBag, ValuesGroup,
};
