//! # string-query-exporter
//!
//! Exporters for [`string_query::SearchCondition`]:
//!
//! - [`StringQueryExporter`]: StringQuery text, re-parseable by
//!   [`string_query::StringQueryParser`]
//! - [`JsonExporter`]: a JSON document keyed by field name
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use string_query::{parse, FieldSet, IntegerTransformer};
//! use string_query_exporter::{JsonExporter, StringQueryExporter};
//!
//! let fields = Arc::new(
//!     FieldSet::builder("orders")
//!         .field("id", IntegerTransformer)
//!         .build()
//!         .unwrap(),
//! );
//! let condition = parse("*(id: 1~10[)", fields).unwrap();
//!
//! assert_eq!(StringQueryExporter::new().export_condition(&condition), "*(id: 1 ~ 10[)");
//! assert_eq!(
//!     JsonExporter::new().export_condition(&condition).unwrap(),
//!     r#"{"groups":[{"fields":{"id":{"ranges":[{"lower":"1","upper":"10","inclusive-upper":false}]}},"logical-case":"OR"}]}"#
//! );
//! ```

#![warn(missing_docs)]

mod error;
mod json;
mod label;
mod text;

pub use error::{ExportError, ExportResult};
pub use json::JsonExporter;
pub use label::{DefaultLabelResolver, LabelResolver};
pub use text::StringQueryExporter;
