//! Incremental assembly of a condition tree.
//!
//! The [`StructureBuilder`] keeps the groups under construction on a stack
//! of owned frames. A group is only attached to its parent once it is left,
//! so the tree never holds references into itself.
//!
//! ```rust
//! use string_query::{GroupLogical, ModelValue, StructureBuilder};
//!
//! let mut builder = StructureBuilder::new();
//! builder.field("id").unwrap();
//! builder.simple_value(ModelValue::Integer(1)).unwrap();
//! builder.end_values().unwrap();
//!
//! builder.enter_group(GroupLogical::Or).unwrap();
//! builder.field("name").unwrap();
//! builder.simple_value(ModelValue::text("foo")).unwrap();
//! builder.end_values().unwrap();
//! builder.leave_group().unwrap();
//!
//! let root = builder.finish().unwrap();
//! assert_eq!(root.field_count(), 1);
//! assert_eq!(root.groups()[0].logical(), GroupLogical::Or);
//! ```

use crate::error::BuildError;
use crate::value::{Compare, GroupLogical, ModelValue, PatternMatch, Range, ValuesBag, ValuesGroup};

/// Stack-based builder for a [`ValuesGroup`] tree.
#[derive(Debug, Clone, Default)]
pub struct StructureBuilder {
    root: ValuesGroup,
    frames: Vec<ValuesGroup>,
    open_field: Option<(String, ValuesBag)>,
}

impl StructureBuilder {
    /// Creates a builder with an empty `AND` root group.
    pub fn new() -> Self {
        Self::default()
    }

    /// The outermost group.
    pub fn root_group(&self) -> &ValuesGroup {
        &self.root
    }

    /// Mutable access to the outermost group, eg. to set its logical.
    pub fn root_group_mut(&mut self) -> &mut ValuesGroup {
        &mut self.root
    }

    /// The group currently receiving fields and subgroups.
    pub fn current_group(&self) -> &ValuesGroup {
        self.frames.last().unwrap_or(&self.root)
    }

    fn current_group_mut(&mut self) -> &mut ValuesGroup {
        self.frames.last_mut().unwrap_or(&mut self.root)
    }

    /// Number of groups entered and not yet left.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Name of the open field, if any.
    pub fn open_field(&self) -> Option<&str> {
        self.open_field.as_ref().map(|(name, _)| name.as_str())
    }

    fn ensure_no_open_field(&self) -> Result<(), BuildError> {
        match &self.open_field {
            Some((name, _)) => Err(BuildError::FieldAlreadyOpen(name.clone())),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Groups
    // =========================================================================

    /// Starts a new subgroup of the current group.
    pub fn enter_group(&mut self, logical: GroupLogical) -> Result<(), BuildError> {
        self.ensure_no_open_field()?;
        self.frames.push(ValuesGroup::with_logical(logical));
        Ok(())
    }

    /// Completes the current subgroup, appending it to its parent.
    pub fn leave_group(&mut self) -> Result<(), BuildError> {
        self.ensure_no_open_field()?;
        let group = self.frames.pop().ok_or(BuildError::CannotLeaveRoot)?;
        self.current_group_mut().add_group(group);
        Ok(())
    }

    /// Drops the current subgroup (and any open field) without attaching it.
    pub fn discard_group(&mut self) -> Result<(), BuildError> {
        self.open_field = None;
        self.frames.pop().map(drop).ok_or(BuildError::CannotLeaveRoot)
    }

    // =========================================================================
    // Fields and values
    // =========================================================================

    /// Opens the values of `name` in the current group.
    pub fn field(&mut self, name: &str) -> Result<(), BuildError> {
        self.ensure_no_open_field()?;
        if self.current_group().has_field(name) {
            return Err(BuildError::DuplicateField(name.to_string()));
        }
        self.open_field = Some((name.to_string(), ValuesBag::new()));
        Ok(())
    }

    fn bag(&mut self) -> Result<&mut ValuesBag, BuildError> {
        self.open_field
            .as_mut()
            .map(|(_, bag)| bag)
            .ok_or(BuildError::NoOpenField)
    }

    /// Appends a simple value to the open field.
    pub fn simple_value(&mut self, value: ModelValue) -> Result<(), BuildError> {
        self.bag()?.add_simple_value(value);
        Ok(())
    }

    /// Appends an excluded simple value to the open field.
    pub fn excluded_simple_value(&mut self, value: ModelValue) -> Result<(), BuildError> {
        self.bag()?.add_excluded_simple_value(value);
        Ok(())
    }

    /// Appends a range to the open field.
    pub fn range_value(&mut self, range: Range) -> Result<(), BuildError> {
        self.bag()?.add_range(range);
        Ok(())
    }

    /// Appends an excluded range to the open field.
    pub fn excluded_range_value(&mut self, range: Range) -> Result<(), BuildError> {
        self.bag()?.add_excluded_range(range);
        Ok(())
    }

    /// Appends a comparison to the open field.
    pub fn comparison_value(&mut self, compare: Compare) -> Result<(), BuildError> {
        self.bag()?.add_comparison(compare);
        Ok(())
    }

    /// Appends a pattern match to the open field.
    pub fn pattern_match_value(&mut self, pattern: PatternMatch) -> Result<(), BuildError> {
        self.bag()?.add_pattern_match(pattern);
        Ok(())
    }

    /// Closes the open field, storing its values in the current group.
    pub fn end_values(&mut self) -> Result<(), BuildError> {
        let (name, bag) = self.open_field.take().ok_or(BuildError::NoOpenField)?;
        self.current_group_mut().add_field(name, bag);
        Ok(())
    }

    /// Drops the open field and its values, if any.
    pub fn abandon_values(&mut self) {
        self.open_field = None;
    }

    /// Returns the finished root group.
    pub fn finish(self) -> Result<ValuesGroup, BuildError> {
        self.ensure_no_open_field()?;
        if !self.frames.is_empty() {
            return Err(BuildError::UnclosedGroups(self.frames.len()));
        }
        Ok(self.root)
    }
}
