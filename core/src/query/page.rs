//! `page[number]`/`page[size]` -> skip/take.

use crate::schema::ResourceDescriptor;

use super::context::PaginationContext;
use super::sequence::{AsObject, Sequence, SortKey};

#[derive(Debug, Clone, Copy)]
pub struct PaginationInterpreter<'d> {
    descriptor: &'d ResourceDescriptor,
}

impl<'d> PaginationInterpreter<'d> {
    pub fn new(descriptor: &'d ResourceDescriptor) -> Self {
        Self { descriptor }
    }

    /// Skips `number * size` elements and takes `size`.
    ///
    /// Deferred sources without an ordering are ordered by identifier first,
    /// otherwise page boundaries would be arbitrary.
    pub fn apply<E: AsObject>(&self, sequence: Sequence<E>, context: &PaginationContext) -> Sequence<E> {
        let sequence = if sequence.is_ordered() {
            sequence
        } else {
            sequence.sort(&[SortKey::asc(self.descriptor.id_field().clone())])
        };
        crate::hypermedia_trace_query!("page", self.descriptor.type_name(), context.number());
        sequence.skip_take(context.skip(), context.size())
    }
}
