//! `filter[..]` -> predicates.

use core::any::Any;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::error::{ApiError, Result};
use crate::schema::{FieldValue, ResourceDescriptor};

use super::context::FilteringContext;
use super::sequence::{AsObject, Predicate, Sequence};

/// Compiles filters against one resource type.
#[derive(Debug, Clone, Copy)]
pub struct FilteringInterpreter<'d> {
    descriptor: &'d ResourceDescriptor,
}

impl<'d> FilteringInterpreter<'d> {
    pub fn new(descriptor: &'d ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    /// One predicate per filtered property, in request order.
    ///
    /// Values are converted to the property's type up front, so a bad value
    /// fails here rather than silently matching nothing.
    pub fn compile(&self, context: &FilteringContext) -> Result<Vec<Predicate>> {
        context
            .properties()
            .iter()
            .map(|property| {
                let field = self
                    .descriptor
                    .field(&property.name)
                    .ok_or_else(|| ApiError::AttributeNotFound(property.name.clone()))?
                    .clone();

                let expected = property
                    .values
                    .iter()
                    .map(|raw| {
                        field.parse(raw).map_err(|reason| ApiError::InvalidQueryValue {
                            key: format!("filter[{}]", property.name),
                            value: raw.clone(),
                            reason,
                        })
                    })
                    .collect::<Result<SmallVec<[FieldValue; 4]>>>()?;

                let predicate: Predicate = Arc::new(move |object: &dyn Any| {
                    let value = field.value(object).unwrap_or(FieldValue::Null);
                    expected.iter().any(|candidate| field.matches(&value, candidate))
                });
                Ok(predicate)
            })
            .collect()
    }

    pub fn apply<E: AsObject>(
        &self,
        sequence: Sequence<E>,
        context: &FilteringContext,
    ) -> Result<Sequence<E>> {
        let predicates = self.compile(context)?;
        crate::hypermedia_trace_query!("filter", self.descriptor.type_name(), predicates.len());
        Ok(predicates
            .into_iter()
            .fold(sequence, |sequence, predicate| sequence.filter(predicate)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::context::FilterProperty;
    use crate::schema::{ComparisonOverrides, FieldType, Resource, SchemaRegistry};

    #[derive(Debug)]
    struct Person {
        id: u32,
        name: &'static str,
        age: Option<u32>,
    }

    impl Resource for Person {
        fn descriptor() -> crate::Result<ResourceDescriptor> {
            ResourceDescriptor::builder::<Person>("person")
                .id(|p| p.id)
                .attribute("full-name", |p| p.name)
                .attribute("age", |p| p.age)
                .build()
        }
    }

    fn people() -> Vec<Arc<Person>> {
        vec![
            Arc::new(Person { id: 1, name: "Ann", age: Some(20) }),
            Arc::new(Person { id: 2, name: "bob", age: Some(30) }),
            Arc::new(Person { id: 3, name: "Cid", age: None }),
            Arc::new(Person { id: 4, name: "Bob", age: Some(20) }),
        ]
    }

    fn filter(name: &str, values: &[&str]) -> FilteringContext {
        FilteringContext::new(vec![FilterProperty {
            name: name.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }])
    }

    fn ids(seq: Sequence<Arc<Person>>) -> Vec<u32> {
        seq.collect().iter().map(|p| p.id).collect()
    }

    #[test]
    fn values_are_ored() {
        let descriptor = Person::descriptor().unwrap();
        let seq = FilteringInterpreter::new(&descriptor)
            .apply(Sequence::from(people()), &filter("age", &["20", "30"]))
            .unwrap();
        assert_eq!(ids(seq), vec![1, 2, 4]);
    }

    #[test]
    fn properties_are_anded_and_names_normalized() {
        let descriptor = Person::descriptor().unwrap();
        let context = FilteringContext::new(vec![
            FilterProperty { name: "age".into(), values: vec!["20".into()] },
            FilterProperty { name: "fullName".into(), values: vec!["Bob".into()] },
        ]);
        let seq = FilteringInterpreter::new(&descriptor)
            .apply(Sequence::from(people()), &context)
            .unwrap();
        assert_eq!(ids(seq), vec![4]);
    }

    #[test]
    fn unknown_property_is_a_client_error() {
        let descriptor = Person::descriptor().unwrap();
        let err = FilteringInterpreter::new(&descriptor)
            .compile(&filter("bogus", &["1"]))
            .err().unwrap();
        assert_eq!(err.to_string(), "Attribute 'bogus' not found");
    }

    #[test]
    fn unparseable_value_is_rejected() {
        let descriptor = Person::descriptor().unwrap();
        let err = FilteringInterpreter::new(&descriptor)
            .compile(&filter("age", &["old"]))
            .err().unwrap();
        assert!(matches!(err, ApiError::InvalidQueryValue { ref key, .. } if key == "filter[age]"));
    }

    #[test]
    fn overrides_apply_per_field_type() {
        let registry = SchemaRegistry::with_overrides(ComparisonOverrides::new().with(
            FieldType::Text,
            |value, expected| match (value, expected) {
                (FieldValue::Text(a), FieldValue::Text(b)) => a.eq_ignore_ascii_case(b),
                _ => false,
            },
        ));
        let descriptor = registry.get::<Person>().unwrap();
        let seq = FilteringInterpreter::new(&descriptor)
            .apply(Sequence::from(people()), &filter("full-name", &["BOB"]))
            .unwrap();
        assert_eq!(ids(seq), vec![2, 4]);
    }
}
