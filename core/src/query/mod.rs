//! Query interpretation.
//!
//! The pipeline: a [`QueryContext`] is parsed from the request, then
//! [`QueryPipeline`] runs the [`FilteringInterpreter`], [`SortingInterpreter`]
//! and [`PaginationInterpreter`] over a [`Sequence`], always in that order.
//! Deferred sequences only record operations; nothing runs until the
//! sequence is collected.

mod context;
mod csv;
mod filter;
mod page;
mod sequence;
mod sort;

pub use context::{
    FilterProperty, FilteringContext, IncludingContext, PaginationContext, QueryContext,
    SortProperty, SortingContext,
};
pub use csv::split_csv;
pub use filter::FilteringInterpreter;
pub use page::PaginationInterpreter;
pub use sequence::{
    AsObject, DeferredQuery, OrderBy, Predicate, QueryOp, QueryProvider, Sequence, SortKey,
    apply_ops,
};
pub use sort::SortingInterpreter;

use crate::error::Result;
use crate::schema::ResourceDescriptor;

/// Applies a request's query to collections of one resource type.
#[derive(Debug, Clone, Copy)]
pub struct QueryPipeline<'a> {
    descriptor: &'a ResourceDescriptor,
    context: &'a QueryContext,
    allow_query: bool,
}

impl<'a> QueryPipeline<'a> {
    pub fn new(descriptor: &'a ResourceDescriptor, context: &'a QueryContext) -> Self {
        Self {
            descriptor,
            context,
            allow_query: true,
        }
    }

    /// With `false`, filters and sorts are ignored; pagination still applies.
    pub fn allow_query(mut self, allow: bool) -> Self {
        self.allow_query = allow;
        self
    }

    /// Filter, then sort, then paginate.
    pub fn apply<E: AsObject>(&self, sequence: Sequence<E>) -> Result<Sequence<E>> {
        let mut sequence = sequence;

        if self.allow_query {
            if let Some(filtering) = self.context.filtering() {
                sequence = FilteringInterpreter::new(self.descriptor).apply(sequence, filtering)?;
            }
            if let Some(sorting) = self.context.sorting() {
                sequence = SortingInterpreter::new(self.descriptor).apply(sequence, sorting)?;
            }
        }

        if let Some(pagination) = self.context.pagination() {
            sequence = PaginationInterpreter::new(self.descriptor).apply(sequence, pagination);
        }

        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SerializerConfig;
    use crate::schema::Resource;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Person {
        id: u32,
        age: u32,
    }

    impl Resource for Person {
        fn descriptor() -> crate::Result<ResourceDescriptor> {
            ResourceDescriptor::builder::<Person>("person")
                .id(|p| p.id)
                .attribute("age", |p| p.age)
                .build()
        }
    }

    fn people() -> Vec<Arc<Person>> {
        (0..30).map(|id| Arc::new(Person { id, age: 20 + id % 3 })).collect()
    }

    fn run(query: &str, allow_query: bool) -> Result<Vec<u32>> {
        let config = SerializerConfig::default().paginated(4, None);
        let context = QueryContext::from_query_string(query, &config)?;
        let descriptor = Person::descriptor()?;
        let seq = QueryPipeline::new(&descriptor, &context)
            .allow_query(allow_query)
            .apply(Sequence::deferred(people))?;
        Ok(seq.collect().iter().map(|p| p.id).collect())
    }

    #[test]
    fn filter_sort_page_compose_in_order() {
        // ages 20 are ids 0,3,6,..; descending id, second page of 4
        let ids = run("page[number]=1&sort=-id&filter[age]=20", true).unwrap();
        assert_eq!(ids, vec![15, 12, 9, 6]);
    }

    #[test]
    fn disallowed_query_only_paginates() {
        let ids = run("filter[age]=21&sort=-id", false).unwrap();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn errors_surface_before_execution() {
        assert!(run("filter[bogus]=1", true).is_err());
    }
}
