//! Field registry consulted while parsing and exporting.
//!
//! The parser only needs to know whether a field exists, and how to turn a
//! literal into the field's [`ModelValue`]. Everything type specific lives
//! behind the [`ValueTransformer`] trait.
//!
//! # Example
//!
//! ```rust
//! use string_query::{FieldSet, IntegerTransformer};
//!
//! let fields = FieldSet::builder("users")
//!     .text("name")
//!     .field("id", IntegerTransformer)
//!     .private_text("secret")
//!     .build()
//!     .unwrap();
//!
//! assert!(fields.has("id"));
//! assert!(fields.is_private("secret"));
//! ```

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{FieldSetError, TransformationFailed};
use crate::lexer::is_field_name;
use crate::value::ModelValue;

// =============================================================================
// Transformers
// =============================================================================

/// Converts between the textual and the model representation of a value.
///
/// Implementations must round-trip: `text_to_model(model_to_text(v)) == v`.
pub trait ValueTransformer: Send + Sync {
    /// Converts a literal (quotes already removed) to a model value.
    fn text_to_model(&self, text: &str) -> Result<ModelValue, TransformationFailed>;

    /// Converts a model value back to its literal.
    fn model_to_text(&self, value: &ModelValue) -> String;
}

/// Keeps the literal as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextTransformer;

impl ValueTransformer for TextTransformer {
    fn text_to_model(&self, text: &str) -> Result<ModelValue, TransformationFailed> {
        Ok(ModelValue::Text(text.to_string()))
    }

    fn model_to_text(&self, value: &ModelValue) -> String {
        value.to_string()
    }
}

/// Parses signed 64-bit integers.
///
/// Surrounding whitespace and a leading `+` are accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntegerTransformer;

impl ValueTransformer for IntegerTransformer {
    fn text_to_model(&self, text: &str) -> Result<ModelValue, TransformationFailed> {
        text.trim()
            .parse::<i64>()
            .map(ModelValue::Integer)
            .map_err(|_| TransformationFailed::new(format!("\"{}\" is not a valid integer", text)))
    }

    fn model_to_text(&self, value: &ModelValue) -> String {
        value.to_string()
    }
}

/// Parses decimal numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecimalTransformer;

impl ValueTransformer for DecimalTransformer {
    fn text_to_model(&self, text: &str) -> Result<ModelValue, TransformationFailed> {
        let parsed = text
            .trim()
            .parse::<f64>()
            .map_err(|_| TransformationFailed::new(format!("\"{}\" is not a valid number", text)))?;

        if !parsed.is_finite() {
            return Err(TransformationFailed::new(format!(
                "\"{}\" is not a finite number",
                text
            )));
        }

        Ok(ModelValue::Decimal(parsed))
    }

    fn model_to_text(&self, value: &ModelValue) -> String {
        value.to_string()
    }
}

// =============================================================================
// FieldDescriptor / FieldSet
// =============================================================================

/// Description of a single searchable field.
#[derive(Clone)]
pub struct FieldDescriptor {
    name: String,
    label: Option<String>,
    private: bool,
    transformer: Arc<dyn ValueTransformer>,
}

impl FieldDescriptor {
    /// Creates a public field without a label.
    pub fn new(name: impl Into<String>, transformer: impl ValueTransformer + 'static) -> Self {
        Self {
            name: name.into(),
            label: None,
            private: false,
            transformer: Arc::new(transformer),
        }
    }

    /// Sets the `label` option.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Marks the field private; private fields are never exported.
    pub fn private(mut self) -> Self {
        self.private = true;
        self
    }

    /// Machine name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured `label` option, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Whether the field is private.
    pub fn is_private(&self) -> bool {
        self.private
    }

    /// Converts a literal to this field's model value.
    pub fn text_to_model(&self, text: &str) -> Result<ModelValue, TransformationFailed> {
        self.transformer.text_to_model(text)
    }

    /// Converts a model value of this field back to a literal.
    pub fn model_to_text(&self, value: &ModelValue) -> String {
        self.transformer.model_to_text(value)
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("private", &self.private)
            .finish_non_exhaustive()
    }
}

/// A named set of fields, in declaration order.
#[derive(Debug, Clone)]
pub struct FieldSet {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldSet {
    /// Creates a new builder for a field set.
    pub fn builder(name: impl Into<String>) -> FieldSetBuilder {
        FieldSetBuilder {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    /// Name of the set.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` when a field with this machine name exists.
    pub fn has(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns `true` when the field exists and is private.
    pub fn is_private(&self, name: &str) -> bool {
        self.fields.get(name).is_some_and(FieldDescriptor::is_private)
    }

    /// Looks up a field by machine name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    /// Looks up a field by its `label` option, falling back to the name for
    /// fields without a label.
    pub fn find_by_label(&self, label: &str) -> Option<&FieldDescriptor> {
        self.fields
            .values()
            .find(|field| field.label().unwrap_or(field.name()) == label)
    }

    /// All fields in declaration order.
    pub fn all(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.values()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the set has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Builder for [`FieldSet`].
#[derive(Debug, Clone)]
pub struct FieldSetBuilder {
    name: String,
    fields: IndexMap<String, FieldDescriptor>,
}

impl FieldSetBuilder {
    /// Adds a field; a later field with the same name replaces the earlier one.
    pub fn add(mut self, field: FieldDescriptor) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    /// Adds a public field using the given transformer.
    pub fn field(self, name: &str, transformer: impl ValueTransformer + 'static) -> Self {
        self.add(FieldDescriptor::new(name, transformer))
    }

    /// Adds a public text field.
    pub fn text(self, name: &str) -> Self {
        self.field(name, TextTransformer)
    }

    /// Adds a private text field.
    pub fn private_text(self, name: &str) -> Self {
        self.add(FieldDescriptor::new(name, TextTransformer).private())
    }

    /// Builds the field set.
    ///
    /// Every name must be writable as a field token in a condition (see
    /// [`is_field_name`]), otherwise exported conditions would not parse.
    pub fn build(self) -> Result<FieldSet, FieldSetError> {
        if let Some(name) = self.fields.keys().find(|name| !is_field_name(name)) {
            return Err(FieldSetError::InvalidFieldName(name.clone()));
        }

        Ok(FieldSet {
            name: self.name,
            fields: self.fields,
        })
    }
}
