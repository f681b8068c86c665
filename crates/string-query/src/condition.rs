//! The finished, read-only search condition.

use std::sync::Arc;

use crate::field::FieldSet;
use crate::value::ValuesGroup;

/// A parsed condition paired with the field set it was parsed against.
///
/// The tree is only reachable through shared references; cloning is cheap
/// for the field set and copies the tree.
#[derive(Debug, Clone)]
pub struct SearchCondition {
    field_set: Arc<FieldSet>,
    root: ValuesGroup,
}

impl SearchCondition {
    /// Creates a condition from an already built tree.
    pub fn new(field_set: Arc<FieldSet>, root: ValuesGroup) -> Self {
        Self { field_set, root }
    }

    /// The field set the condition belongs to.
    pub fn field_set(&self) -> &FieldSet {
        &self.field_set
    }

    /// Shared handle to the field set.
    pub fn field_set_handle(&self) -> Arc<FieldSet> {
        Arc::clone(&self.field_set)
    }

    /// The root group.
    pub fn values_group(&self) -> &ValuesGroup {
        &self.root
    }

    /// Returns `true` when the root group has neither fields nor subgroups.
    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }
}

/// Conditions are equal when their trees are; the field set is compared by
/// name only.
impl PartialEq for SearchCondition {
    fn eq(&self, other: &Self) -> bool {
        self.field_set.name() == other.field_set.name() && self.root == other.root
    }
}
