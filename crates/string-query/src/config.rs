//! Configuration for the StringQuery parser.

/// How field tokens in the input are resolved against the field set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum FieldNameMode {
    /// Field tokens are machine names (default).
    #[default]
    Name,
    /// Field tokens are labels, as written by the labelled exporter.
    Label,
}

/// Limits and options for a parse.
///
/// # Example
///
/// ```rust
/// use string_query::{FieldNameMode, ProcessorConfig};
///
/// let config = ProcessorConfig::builder()
///     .with_max_nesting_level(5)
///     .with_max_values(50)
///     .with_field_names(FieldNameMode::Label)
///     .build();
///
/// assert_eq!(config.max_nesting_level, 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProcessorConfig {
    /// Deepest allowed group nesting; the root is level 0.
    pub max_nesting_level: usize,
    /// Maximum number of values in one field-value pair.
    pub max_values: usize,
    /// Maximum number of subgroups directly inside one group.
    pub max_groups: usize,
    /// Field token resolution.
    pub field_names: FieldNameMode,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_nesting_level: 100,
            max_values: 10_000,
            max_groups: 100,
            field_names: FieldNameMode::Name,
        }
    }
}

impl ProcessorConfig {
    /// Creates a new builder starting from the defaults.
    pub fn builder() -> ProcessorConfigBuilder {
        ProcessorConfigBuilder::default()
    }
}

/// Builder for [`ProcessorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfigBuilder {
    config: ProcessorConfig,
}

impl ProcessorConfigBuilder {
    /// Sets the deepest allowed group nesting.
    pub fn with_max_nesting_level(mut self, level: usize) -> Self {
        self.config.max_nesting_level = level;
        self
    }

    /// Sets the maximum number of values per field-value pair.
    pub fn with_max_values(mut self, max_values: usize) -> Self {
        self.config.max_values = max_values;
        self
    }

    /// Sets the maximum number of subgroups per group.
    pub fn with_max_groups(mut self, max_groups: usize) -> Self {
        self.config.max_groups = max_groups;
        self
    }

    /// Sets how field tokens are resolved.
    pub fn with_field_names(mut self, mode: FieldNameMode) -> Self {
        self.config.field_names = mode;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ProcessorConfig {
        self.config
    }
}
