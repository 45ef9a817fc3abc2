//! # Hypermedia
//!
//! Renders domain objects as compound documents (`data` plus `included`),
//! applies `filter`, `sort`, `include` and `page` query parameters, and parses
//! incoming documents back into domain types.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use hypermedia::prelude::*;
//!
//! struct Person {
//!     id: u64,
//!     name: String,
//!     employer: Option<Arc<Company>>,
//! }
//!
//! struct Company {
//!     id: u64,
//! }
//!
//! impl Resource for Person {
//!     fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
//!         ResourceDescriptor::builder::<Person>("person")
//!             .id(|p| p.id)
//!             .url_path("people")
//!             .attribute("name", |p| p.name.clone())
//!             .to_one("employer", |p| p.employer.clone())
//!             .build()
//!     }
//! }
//!
//! impl Resource for Company {
//!     fn descriptor() -> hypermedia::Result<ResourceDescriptor> {
//!         ResourceDescriptor::builder::<Company>("company").id(|c| c.id).build()
//!     }
//! }
//!
//! let serializer = ResourceSerializer::new(
//!     Arc::new(SchemaRegistry::new()),
//!     SerializerConfig::default(),
//! );
//! let request = RequestContext::parse("https://api.example.com/people/1/").unwrap();
//! let person = Arc::new(Person {
//!     id: 1,
//!     name: "Ann".into(),
//!     employer: Some(Arc::new(Company { id: 7 })),
//! });
//!
//! let response = serializer.serialize::<Person, _>(Payload::One(person), &request);
//! let doc = response.to_value();
//! assert_eq!(doc["data"]["relationships"]["employer"]["data"]["id"], "7");
//! assert_eq!(doc["included"][0]["type"], "company");
//! ```
//!
//! ## Crates
//!
//! | Crate              | Contents                                                   |
//! |--------------------|------------------------------------------------------------|
//! | `hypermedia-types` | Wire document model (`Document`, `ResourceObject`, ...)    |
//! | `hypermedia-core`  | Schema, graph, query interpreters, rendering, parsing      |

// =============================================================================
// Root-level exports
// =============================================================================

/// Result type for serializer operations
pub use hypermedia_core::error::Result;

pub use hypermedia_core::{
    ApiError, ErrorClass, Payload, RequestContext, ResourceSerializer, Response, ResponseStatus,
};

/// Error types
pub mod error {
    pub use hypermedia_core::error::{ApiError, ErrorClass};
    pub use hypermedia_core::config::ConfigError;
}

/// Wire document model.
pub use hypermedia_types as types;

/// Serializer configuration (TOML-loadable).
pub mod config {
    pub use hypermedia_core::config::{
        ConfigError, NamingConvention, PaginationConfig, SerializerConfig, canonical_name,
    };
}

/// Resource descriptors, typed field accessors and the schema registry.
pub use hypermedia_core::schema;

/// Resource graph construction.
pub use hypermedia_core::graph;

/// Query parsing and interpretation (`filter`, `sort`, `include`, `page`).
pub use hypermedia_core::query;

/// Rendering, link generation and parsing.
pub use hypermedia_core::document;

// =============================================================================
// Prelude
// =============================================================================

/// Prelude module for commonly used types
pub mod prelude {
    pub use hypermedia_core::config::{NamingConvention, PaginationConfig, SerializerConfig};
    pub use hypermedia_core::document::{DefaultUrlPathBuilder, UrlPathBuilder};
    pub use hypermedia_core::error::{ApiError, ErrorClass};
    pub use hypermedia_core::query::{AsObject, QueryProvider, Sequence};
    pub use hypermedia_core::schema::{
        ComparisonOverrides, FieldType, FieldValue, LinkVisibility, RelationshipOptions, Resource,
        ResourceDescriptor, SchemaRegistry,
    };
    pub use hypermedia_core::serializer::{
        Payload, RequestContext, ResourceSerializer, Response, ResponseStatus,
    };
    pub use hypermedia_types::prelude::*;
}
