//! Core of the hypermedia serializer: resource schemas, the resource graph,
//! query interpretation, document rendering and parsing.

pub mod config;
pub mod document;
pub mod error;
pub mod graph;
pub mod query;
pub mod schema;
pub mod serializer;
pub mod tracing;

// Re-export key types and traits
pub use config::{ConfigError, NamingConvention, PaginationConfig, SerializerConfig};
pub use error::{ApiError, ErrorClass, Result};
pub use graph::{Graph, GraphNode, NodeKey, PathSet, Root};
pub use query::{AsObject, QueryContext, QueryPipeline, Sequence};
pub use schema::{Resource, ResourceDescriptor, SchemaRegistry};
pub use serializer::{Payload, RequestContext, ResourceSerializer, Response, ResponseStatus};
