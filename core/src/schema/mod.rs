//! Resource schema: descriptors, typed field accessors, comparison overrides
//! and the descriptor registry.

mod compare;
mod descriptor;
mod registry;
mod value;

pub use compare::{Comparator, ComparisonOverrides, default_comparator};
pub use descriptor::{
    AttributeDescriptor, DescriptorBuilder, LinkVisibility, ObjectRef, Related, RelatedType,
    RelationshipDescriptor, RelationshipKind, RelationshipOptions, ResourceDescriptor,
};
pub use registry::SchemaRegistry;
pub use value::{FieldType, FieldValue, IntoFieldValue};

use crate::error::Result;

/// A domain type that can be rendered as a resource.
///
/// The descriptor is built once per registry and cached; see [`SchemaRegistry`].
pub trait Resource: std::any::Any + Send + Sync {
    fn descriptor() -> Result<ResourceDescriptor>;
}
