//! Sequences of domain objects that query interpreters compose over.
//!
//! A [`Sequence`] is either already in memory or a [`DeferredQuery`]: a
//! [`QueryProvider`] plus the chain of operations recorded so far. Deferred
//! chains only run when [`Sequence::collect`] is called, and providers may push
//! the recorded [`QueryOp`]s down to their backing store.

use core::any::Any;
use core::cmp::Ordering;
use std::sync::Arc;

use crate::schema::{AttributeDescriptor, FieldValue, ObjectRef};

// =============================================================================
// Elements
// =============================================================================

/// Something a sequence can hold: a shared handle to a domain object.
pub trait AsObject: Send + Sync + 'static {
    /// Borrows the object for descriptor accessors.
    fn as_object(&self) -> &dyn Any;

    /// Converts into the type-erased handle the graph stores.
    fn into_object_ref(self) -> ObjectRef;
}

impl<T: Any + Send + Sync> AsObject for Arc<T> {
    fn as_object(&self) -> &dyn Any {
        &**self
    }

    fn into_object_ref(self) -> ObjectRef {
        self
    }
}

impl AsObject for ObjectRef {
    fn as_object(&self) -> &dyn Any {
        &**self
    }

    fn into_object_ref(self) -> ObjectRef {
        self
    }
}

// =============================================================================
// Operations
// =============================================================================

/// Row predicate compiled from a filter.
pub type Predicate = Arc<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderBy {
    #[default]
    Asc,
    Desc,
}

/// One property to order by.
#[derive(Clone, Debug)]
pub struct SortKey {
    field: AttributeDescriptor,
    order: OrderBy,
}

impl SortKey {
    pub fn new(field: AttributeDescriptor, order: OrderBy) -> Self {
        Self { field, order }
    }

    pub fn asc(field: AttributeDescriptor) -> Self {
        Self::new(field, OrderBy::Asc)
    }

    pub fn desc(field: AttributeDescriptor) -> Self {
        Self::new(field, OrderBy::Desc)
    }

    pub fn field(&self) -> &AttributeDescriptor {
        &self.field
    }

    pub fn order(&self) -> OrderBy {
        self.order
    }

    /// Compares two objects on this key. Absent values sort as null.
    pub fn compare(&self, a: &dyn Any, b: &dyn Any) -> Ordering {
        let left = self.field.value(a).unwrap_or(FieldValue::Null);
        let right = self.field.value(b).unwrap_or(FieldValue::Null);
        let ordering = left.total_cmp(&right);
        match self.order {
            OrderBy::Asc => ordering,
            OrderBy::Desc => ordering.reverse(),
        }
    }
}

/// A recorded step of a deferred query.
#[derive(Clone)]
pub enum QueryOp {
    Filter(Predicate),
    /// Starts a new ordering, replacing any earlier one.
    OrderBy(SortKey),
    /// Breaks ties left by the preceding `OrderBy`/`ThenBy`.
    ThenBy(SortKey),
    Skip(usize),
    Take(usize),
}

impl core::fmt::Debug for QueryOp {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QueryOp::Filter(_) => f.write_str("Filter(..)"),
            QueryOp::OrderBy(key) => f.debug_tuple("OrderBy").field(key).finish(),
            QueryOp::ThenBy(key) => f.debug_tuple("ThenBy").field(key).finish(),
            QueryOp::Skip(n) => f.debug_tuple("Skip").field(n).finish(),
            QueryOp::Take(n) => f.debug_tuple("Take").field(n).finish(),
        }
    }
}

fn compare_chain(keys: &[SortKey], a: &dyn Any, b: &dyn Any) -> Ordering {
    keys.iter()
        .map(|key| key.compare(a, b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn sort_stable<E: AsObject>(items: &mut [E], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }
    items.sort_by(|a, b| compare_chain(keys, a.as_object(), b.as_object()));
}

fn skip<E>(items: &mut Vec<E>, n: usize) {
    let n = n.min(items.len());
    items.drain(..n);
}

/// Runs `ops` over `items` in memory, in order.
pub fn apply_ops<E: AsObject>(mut items: Vec<E>, ops: &[QueryOp]) -> Vec<E> {
    let mut ordering: Vec<SortKey> = Vec::new();

    for op in ops {
        match op {
            QueryOp::OrderBy(key) => {
                sort_stable(&mut items, &ordering);
                ordering = vec![key.clone()];
                continue;
            }
            QueryOp::ThenBy(key) => {
                ordering.push(key.clone());
                continue;
            }
            _ => {}
        }

        sort_stable(&mut items, &core::mem::take(&mut ordering));
        match op {
            QueryOp::Filter(predicate) => items.retain(|item| predicate(item.as_object())),
            QueryOp::Skip(n) => skip(&mut items, *n),
            QueryOp::Take(n) => items.truncate(*n),
            QueryOp::OrderBy(_) | QueryOp::ThenBy(_) => {}
        }
    }

    sort_stable(&mut items, &ordering);
    items
}

// =============================================================================
// Deferred sources
// =============================================================================

/// Backing store for a deferred sequence.
///
/// Implementors only need [`fetch`](QueryProvider::fetch); override
/// [`execute`](QueryProvider::execute) to push operations down.
pub trait QueryProvider<E>: Send + Sync {
    /// Every element, unfiltered and unordered.
    fn fetch(&self) -> Vec<E>;

    /// Elements after running `ops`.
    fn execute(&self, ops: &[QueryOp]) -> Vec<E>
    where
        E: AsObject,
    {
        apply_ops(self.fetch(), ops)
    }
}

impl<E, F> QueryProvider<E> for F
where
    E: AsObject,
    F: Fn() -> Vec<E> + Send + Sync,
{
    fn fetch(&self) -> Vec<E> {
        self()
    }
}

/// A provider plus the operations recorded against it.
pub struct DeferredQuery<E> {
    provider: Arc<dyn QueryProvider<E>>,
    ops: Vec<QueryOp>,
}

impl<E> Clone for DeferredQuery<E> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            ops: self.ops.clone(),
        }
    }
}

impl<E> core::fmt::Debug for DeferredQuery<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredQuery")
            .field("ops", &self.ops)
            .finish_non_exhaustive()
    }
}

impl<E: AsObject> DeferredQuery<E> {
    pub fn new<P>(provider: P) -> Self
    where
        P: QueryProvider<E> + 'static,
    {
        Self {
            provider: Arc::new(provider),
            ops: Vec::new(),
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.ops.push(QueryOp::Filter(predicate));
        self
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.ops.push(QueryOp::OrderBy(key));
        self
    }

    pub fn then_by(mut self, key: SortKey) -> Self {
        self.ops.push(QueryOp::ThenBy(key));
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.ops.push(QueryOp::Skip(n));
        self
    }

    pub fn take(mut self, n: usize) -> Self {
        self.ops.push(QueryOp::Take(n));
        self
    }

    pub fn ops(&self) -> &[QueryOp] {
        &self.ops
    }

    /// `true` once an ordering has been recorded.
    pub fn is_ordered(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, QueryOp::OrderBy(_) | QueryOp::ThenBy(_)))
    }

    pub fn execute(self) -> Vec<E> {
        self.provider.execute(&self.ops)
    }
}

// =============================================================================
// Sequence
// =============================================================================

/// Collection payload: in memory or deferred.
#[derive(Debug)]
pub enum Sequence<E> {
    Materialized(Vec<E>),
    Deferred(DeferredQuery<E>),
}

impl<E> From<Vec<E>> for Sequence<E> {
    fn from(items: Vec<E>) -> Self {
        Sequence::Materialized(items)
    }
}

impl<E: AsObject> Sequence<E> {
    pub fn deferred<P>(provider: P) -> Self
    where
        P: QueryProvider<E> + 'static,
    {
        Sequence::Deferred(DeferredQuery::new(provider))
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self, Sequence::Deferred(_))
    }

    /// In-memory sequences already have an order; deferred ones only after
    /// an `OrderBy` was recorded.
    pub fn is_ordered(&self) -> bool {
        match self {
            Sequence::Materialized(_) => true,
            Sequence::Deferred(query) => query.is_ordered(),
        }
    }

    pub fn filter(self, predicate: Predicate) -> Self {
        match self {
            Sequence::Materialized(mut items) => {
                items.retain(|item| predicate(item.as_object()));
                Sequence::Materialized(items)
            }
            Sequence::Deferred(query) => Sequence::Deferred(query.filter(predicate)),
        }
    }

    /// Orders by `keys[0]`, then each following key for ties. Stable.
    pub fn sort(self, keys: &[SortKey]) -> Self {
        let Some((first, rest)) = keys.split_first() else {
            return self;
        };
        match self {
            Sequence::Materialized(mut items) => {
                sort_stable(&mut items, keys);
                Sequence::Materialized(items)
            }
            Sequence::Deferred(query) => {
                let query = rest
                    .iter()
                    .fold(query.order_by(first.clone()), |query, key| {
                        query.then_by(key.clone())
                    });
                Sequence::Deferred(query)
            }
        }
    }

    pub fn skip_take(self, skip_n: usize, take_n: usize) -> Self {
        match self {
            Sequence::Materialized(mut items) => {
                skip(&mut items, skip_n);
                items.truncate(take_n);
                Sequence::Materialized(items)
            }
            Sequence::Deferred(query) => Sequence::Deferred(query.skip(skip_n).take(take_n)),
        }
    }

    /// Runs any deferred work and returns the elements.
    pub fn collect(self) -> Vec<E> {
        match self {
            Sequence::Materialized(items) => items,
            Sequence::Deferred(query) => query.execute(),
        }
    }
}
