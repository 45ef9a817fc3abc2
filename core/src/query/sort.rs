//! `sort=..` -> ordering keys.

use crate::error::{ApiError, Result};
use crate::schema::ResourceDescriptor;

use super::context::SortingContext;
use super::sequence::{AsObject, Sequence, SortKey};

#[derive(Debug, Clone, Copy)]
pub struct SortingInterpreter<'d> {
    descriptor: &'d ResourceDescriptor,
}

impl<'d> SortingInterpreter<'d> {
    pub fn new(descriptor: &'d ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn compile(&self, context: &SortingContext) -> Result<Vec<SortKey>> {
        context
            .properties()
            .iter()
            .map(|property| {
                self.descriptor
                    .field(&property.name)
                    .map(|field| SortKey::new(field.clone(), property.order))
                    .ok_or_else(|| ApiError::AttributeNotFound(property.name.clone()))
            })
            .collect()
    }

    /// Orders by the first key, breaking ties with each following one.
    pub fn apply<E: AsObject>(
        &self,
        sequence: Sequence<E>,
        context: &SortingContext,
    ) -> Result<Sequence<E>> {
        let keys = self.compile(context)?;
        crate::hypermedia_trace_query!("sort", self.descriptor.type_name(), keys.len());
        Ok(sequence.sort(&keys))
    }
}
