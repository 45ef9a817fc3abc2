//! Resource graph: the deduplicated set of resources reachable from a root
//! object along the requested include paths.
//!
//! [`Graph::build`] walks the object graph depth-first. Each resource becomes
//! one [`GraphNode`] keyed by [`NodeKey`]; a node's `graph_depth` is the
//! shortest distance from a root seen so far, so roots (depth 0) render in
//! `data` and everything else is a candidate for `included`.

mod builder;
mod key;
mod path_set;

use std::any::Any;
use std::sync::Arc;

use compact_str::CompactString;
use hashbrown::HashMap;

pub use key::NodeKey;
pub use path_set::PathSet;

use crate::error::Result;
use crate::schema::{ObjectRef, Related, ResourceDescriptor, SchemaRegistry};

/// The value being serialized.
#[derive(Clone, Debug, Default)]
pub enum Root {
    #[default]
    Null,
    One(ObjectRef),
    Many(Vec<ObjectRef>),
}

impl Root {
    pub fn one<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Root::One(value)
    }

    pub fn many<T, I>(values: I) -> Self
    where
        T: Any + Send + Sync,
        I: IntoIterator<Item = Arc<T>>,
    {
        Root::Many(values.into_iter().map(|v| v as ObjectRef).collect())
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Root::Many(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Root::Null)
    }

    pub fn objects(&self) -> &[ObjectRef] {
        match self {
            Root::Null => &[],
            Root::One(object) => core::slice::from_ref(object),
            Root::Many(objects) => objects,
        }
    }
}

/// A relationship as seen when its node was built.
#[derive(Clone, Debug)]
pub struct RelationshipEntry {
    /// The active path set asked for this relationship.
    pub included: bool,
    /// Value read from the object; `None` when the property doesn't exist.
    pub value: Option<Related>,
    /// Keys of the related resources, in relationship order.
    pub targets: Vec<NodeKey>,
}

/// One resource in the graph.
#[derive(Clone)]
pub struct GraphNode {
    key: NodeKey,
    object: ObjectRef,
    descriptor: Arc<ResourceDescriptor>,
    path_set: PathSet,
    graph_depth: usize,
    property_name: Option<CompactString>,
    relationships: HashMap<CompactString, RelationshipEntry>,
}

impl GraphNode {
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    pub fn descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.descriptor
    }

    pub fn path_set(&self) -> &PathSet {
        &self.path_set
    }

    /// 0 for primary data, >0 for included candidates.
    pub fn graph_depth(&self) -> usize {
        self.graph_depth
    }

    /// Relationship through which the node was reached; `None` for roots.
    pub fn property_name(&self) -> Option<&str> {
        self.property_name.as_deref()
    }

    pub fn relationship(&self, name: &str) -> Option<&RelationshipEntry> {
        self.relationships.get(name)
    }
}

impl core::fmt::Debug for GraphNode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GraphNode")
            .field("key", &self.key)
            .field("path_set", &self.path_set)
            .field("graph_depth", &self.graph_depth)
            .field("property_name", &self.property_name)
            .finish()
    }
}

/// All nodes of one serialization pass.
#[derive(Debug)]
pub struct Graph {
    root_descriptor: Arc<ResourceDescriptor>,
    root_is_collection: bool,
    roots: Vec<NodeKey>,
    order: Vec<NodeKey>,
    nodes: HashMap<NodeKey, GraphNode>,
}

impl Graph {
    /// Builds the graph reachable from `root` along `paths`.
    pub fn build(
        registry: &SchemaRegistry,
        root: &Root,
        descriptor: &Arc<ResourceDescriptor>,
        paths: &PathSet,
    ) -> Result<Graph> {
        builder::GraphBuilder::new(registry).build(root, descriptor, paths)
    }

    pub fn root_descriptor(&self) -> &Arc<ResourceDescriptor> {
        &self.root_descriptor
    }

    pub fn is_collection(&self) -> bool {
        self.root_is_collection
    }

    /// Primary resources, in the order the root presented them.
    pub fn data_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.roots
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .filter(|node| node.graph_depth == 0)
    }

    /// Non-primary resources, in discovery order.
    pub fn included_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order
            .iter()
            .filter_map(|key| self.nodes.get(key))
            .filter(|node| node.graph_depth > 0)
    }

    pub fn get(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.nodes.get(key)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
