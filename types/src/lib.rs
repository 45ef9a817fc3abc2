//! Wire document model for hypermedia compound documents.
//!
//! This crate only describes the *shape* of a document:
//!
//! - [`Document`] - the top-level tree (`data`, `errors`, `meta`, `links`, `included`, `jsonapi`)
//! - [`ResourceObject`] / [`ResourceIdentifier`] - full and minimal resource representations
//! - [`RelationshipObject`] - relationship `links` plus optional linkage `data`
//! - [`ErrorObject`] - an entry of the top-level `errors` array
//! - [`Data`] - the null / single / array tri-state used for primary and relationship data
//!
//! Rendering and parsing live in `hypermedia-core`.

mod data;
mod document;
mod error;
mod links;
pub mod serde_helpers;

pub use data::Data;
pub use document::{Document, JsonApiObject, RelationshipObject, ResourceIdentifier, ResourceObject};
pub use error::ErrorObject;
pub use links::Links;

/// Attribute map of a resource object.
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Names permitted as top-level document members.
pub const TOP_LEVEL_MEMBERS: &[&str] = &["data", "errors", "meta", "links", "included", "jsonapi"];

/// Member names a resource may not use for attributes or relationships.
pub const RESERVED_MEMBER_NAMES: &[&str] = &["id", "links", "relationships"];

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::{
        Attributes, Data, Document, ErrorObject, Links, RelationshipObject, ResourceIdentifier,
        ResourceObject,
    };
}
