//! Field label resolution for human-readable exports.

use string_query::FieldDescriptor;

/// Resolves the text written in place of a field name.
///
/// Closures taking a [`FieldDescriptor`] implement this trait as well.
pub trait LabelResolver: Send + Sync {
    /// Returns the label for `field`.
    fn resolve(&self, field: &FieldDescriptor) -> String;
}

/// Uses the field's configured label, falling back to its name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLabelResolver;

impl LabelResolver for DefaultLabelResolver {
    fn resolve(&self, field: &FieldDescriptor) -> String {
        field.label().unwrap_or(field.name()).to_string()
    }
}

impl<F> LabelResolver for F
where
    F: Fn(&FieldDescriptor) -> String + Send + Sync,
{
    fn resolve(&self, field: &FieldDescriptor) -> String {
        self(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use string_query::TextTransformer;

    #[test]
    fn test_default_resolver() {
        let labelled = FieldDescriptor::new("id", TextTransformer).with_label("Identifier");
        let plain = FieldDescriptor::new("name", TextTransformer);

        assert_eq!(DefaultLabelResolver.resolve(&labelled), "Identifier");
        assert_eq!(DefaultLabelResolver.resolve(&plain), "name");
    }

    #[test]
    fn test_closure_resolver() {
        let resolver = |field: &FieldDescriptor| field.name().to_uppercase();
        let field = FieldDescriptor::new("id", TextTransformer);
        assert_eq!(resolver.resolve(&field), "ID");
    }
}
