//! Per-type comparison overrides for filter predicates.

use std::sync::Arc;

use hashbrown::HashMap;

use super::value::{FieldType, FieldValue};

/// Decides whether a property value satisfies one filter value.
///
/// Called as `comparator(property_value, filter_value)`.
pub type Comparator = Arc<dyn Fn(&FieldValue, &FieldValue) -> bool + Send + Sync>;

/// The catch-all comparison: equality with numeric widening.
pub fn default_comparator() -> Comparator {
    Arc::new(|value: &FieldValue, expected: &FieldValue| value.loosely_eq(expected))
}

/// Registry of comparison overrides keyed by [`FieldType`].
///
/// Lookup walks the tag's fallback chain and picks the most specific
/// override; if nothing matches, the catch-all default applies.
///
/// ```ignore
/// let overrides = ComparisonOverrides::new().with(FieldType::Text, |value, expected| {
///     value.to_string().to_lowercase().contains(&expected.to_string().to_lowercase())
/// });
/// ```
#[derive(Clone)]
pub struct ComparisonOverrides {
    by_type: HashMap<FieldType, Comparator>,
    fallback: Comparator,
}

impl Default for ComparisonOverrides {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonOverrides {
    pub fn new() -> Self {
        Self {
            by_type: HashMap::new(),
            fallback: default_comparator(),
        }
    }

    /// Registers an override for `field_type` and every more specific tag
    /// that doesn't have its own.
    pub fn with<F>(mut self, field_type: FieldType, comparator: F) -> Self
    where
        F: Fn(&FieldValue, &FieldValue) -> bool + Send + Sync + 'static,
    {
        self.by_type.insert(field_type, Arc::new(comparator));
        self
    }

    /// Replaces the catch-all comparison.
    pub fn with_fallback<F>(mut self, comparator: F) -> Self
    where
        F: Fn(&FieldValue, &FieldValue) -> bool + Send + Sync + 'static,
    {
        self.fallback = Arc::new(comparator);
        self
    }

    /// Most specific comparator registered along `field_type`'s chain.
    pub fn resolve(&self, field_type: FieldType) -> Comparator {
        field_type
            .chain()
            .find_map(|ty| self.by_type.get(&ty).cloned())
            .unwrap_or_else(|| self.fallback.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

impl core::fmt::Debug for ComparisonOverrides {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComparisonOverrides")
            .field("types", &self.by_type.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn most_specific_override_wins() {
        let overrides = ComparisonOverrides::new()
            .with(FieldType::Number, |_, _| false)
            .with(FieldType::Int, |_, _| true);

        let int_cmp = overrides.resolve(FieldType::Int);
        let float_cmp = overrides.resolve(FieldType::Float);
        assert!(int_cmp(&FieldValue::Int(1), &FieldValue::Int(2)));
        assert!(!float_cmp(&FieldValue::Float(1.0), &FieldValue::Float(1.0)));
    }

    #[test]
    fn falls_back_to_equality() {
        let cmp = ComparisonOverrides::new().resolve(FieldType::Text);
        assert!(cmp(&FieldValue::Text("a".into()), &FieldValue::Text("a".into())));
        assert!(!cmp(&FieldValue::Text("a".into()), &FieldValue::Text("b".into())));
    }

    #[test]
    fn any_override_catches_everything() {
        let overrides = ComparisonOverrides::new().with(FieldType::Any, |_, _| true);
        let cmp = overrides.resolve(FieldType::Bool);
        assert!(cmp(&FieldValue::Bool(true), &FieldValue::Bool(false)));
    }
}
