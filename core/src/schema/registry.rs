//! Process-wide descriptor registry.

use std::any::TypeId;
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;

use super::Resource;
use super::compare::ComparisonOverrides;
use super::descriptor::{RelatedType, ResourceDescriptor};
use crate::error::{ApiError, Result};

/// Holds the one canonical descriptor per resource type.
///
/// Constructed once at startup and shared (`Arc<SchemaRegistry>`) with all
/// request handling. Descriptors are built lazily on first use; two threads
/// racing on the same type may both build one, but only the first insert is
/// kept and readers only ever see fully built descriptors.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    descriptors: RwLock<HashMap<TypeId, Arc<ResourceDescriptor>>>,
    overrides: ComparisonOverrides,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose descriptors use `overrides` for filter comparisons.
    pub fn with_overrides(overrides: ComparisonOverrides) -> Self {
        Self {
            descriptors: RwLock::default(),
            overrides,
        }
    }

    /// Descriptor of `T`, building it on first access.
    pub fn get<T: Resource>(&self) -> Result<Arc<ResourceDescriptor>> {
        self.resolve(&RelatedType::of::<T>())
    }

    /// Descriptor behind a relationship's related type.
    pub fn resolve(&self, related: &RelatedType) -> Result<Arc<ResourceDescriptor>> {
        if let Some(found) = self.lookup(related.type_id()) {
            return Ok(found);
        }
        let descriptor = related.describe()?;
        if descriptor.type_id() != related.type_id() {
            return Err(ApiError::schema(format!(
                "descriptor '{}' was built for a different type than {}",
                descriptor.type_name(),
                related.rust_name()
            )));
        }
        Ok(self.insert(descriptor))
    }

    /// Registers a descriptor built elsewhere. An existing entry for the same
    /// type wins and is returned instead.
    pub fn register(&self, descriptor: ResourceDescriptor) -> Arc<ResourceDescriptor> {
        self.insert(descriptor)
    }

    pub fn len(&self) -> usize {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, type_id: TypeId) -> Option<Arc<ResourceDescriptor>> {
        self.descriptors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
            .cloned()
    }

    fn insert(&self, mut descriptor: ResourceDescriptor) -> Arc<ResourceDescriptor> {
        descriptor.bind_comparators(&self.overrides);
        let mut descriptors = self
            .descriptors
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        descriptors
            .entry(descriptor.type_id())
            .or_insert_with(|| Arc::new(descriptor))
            .clone()
    }
}
