//! Depth-first construction of the deduplicated resource graph.

use std::sync::Arc;

use compact_str::CompactString;
use hashbrown::{HashMap, HashSet};

use super::key::NodeKey;
use super::path_set::PathSet;
use super::{Graph, GraphNode, RelationshipEntry, Root};
use crate::error::Result;
use crate::schema::{ObjectRef, Related, RelationshipDescriptor, ResourceDescriptor, SchemaRegistry};

pub(super) struct GraphBuilder<'r> {
    registry: &'r SchemaRegistry,
    nodes: HashMap<NodeKey, GraphNode>,
    order: Vec<NodeKey>,
}

impl<'r> GraphBuilder<'r> {
    pub(super) fn new(registry: &'r SchemaRegistry) -> Self {
        Self {
            registry,
            nodes: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub(super) fn build(
        mut self,
        root: &Root,
        descriptor: &Arc<ResourceDescriptor>,
        paths: &PathSet,
    ) -> Result<Graph> {
        let mut roots = Vec::new();
        let mut seen = HashSet::new();
        for object in root.objects() {
            let key = self.visit(object, descriptor, paths, 0, None)?;
            if seen.insert(key.clone()) {
                roots.push(key);
            }
        }

        let graph = Graph {
            root_descriptor: Arc::clone(descriptor),
            root_is_collection: root.is_collection(),
            roots,
            order: self.order,
            nodes: self.nodes,
        };
        crate::hypermedia_trace_graph!(
            descriptor.type_name(),
            graph.len(),
            graph.included_nodes().count()
        );
        Ok(graph)
    }

    /// Visits one object at `depth`, returning its key.
    ///
    /// Termination on cyclic object graphs: a node is only rebuilt when the
    /// incoming route brings paths the stored node doesn't already cover, and
    /// path sets only ever grow.
    fn visit(
        &mut self,
        object: &ObjectRef,
        descriptor: &Arc<ResourceDescriptor>,
        paths: &PathSet,
        depth: usize,
        property: Option<&str>,
    ) -> Result<NodeKey> {
        let key = NodeKey::for_object(&**object, descriptor)?;

        let (paths, depth, property) = match self.nodes.get_mut(&key) {
            None => (paths.clone(), depth, property.map(CompactString::from)),
            Some(existing) => {
                let merged = existing.path_set.union(paths);
                if merged == existing.path_set {
                    // Same reach as before; only a more direct route matters.
                    if depth < existing.graph_depth {
                        existing.graph_depth = depth;
                        existing.property_name = property.map(CompactString::from);
                    }
                    return Ok(key);
                }
                if depth < existing.graph_depth {
                    (merged, depth, property.map(CompactString::from))
                } else {
                    (merged, existing.graph_depth, existing.property_name.clone())
                }
            }
        };

        let mut relationships = HashMap::with_capacity(descriptor.relationships().len());
        let mut pending: Vec<(&RelationshipDescriptor, Arc<ResourceDescriptor>, Related)> = Vec::new();
        for rel in descriptor.relationships() {
            let included = paths.matches_property(rel.name());
            let value = rel.value(&**object);
            let mut targets = Vec::new();
            if let Some(value) = &value {
                let related = self.registry.resolve(rel.related())?;
                for child in value.objects() {
                    targets.push(NodeKey::for_object(&**child, &related)?);
                }
                if included {
                    pending.push((rel, related, value.clone()));
                }
            }
            relationships.insert(
                CompactString::from(rel.name()),
                RelationshipEntry {
                    included,
                    value,
                    targets,
                },
            );
        }

        let node = GraphNode {
            key: key.clone(),
            object: Arc::clone(object),
            descriptor: Arc::clone(descriptor),
            path_set: paths.clone(),
            graph_depth: depth,
            property_name: property,
            relationships,
        };
        if self.nodes.insert(key.clone(), node).is_none() {
            self.order.push(key.clone());
        }

        for (rel, related, value) in pending {
            let child_paths = paths.child_path_set(rel.name());
            for child in value.objects() {
                self.visit(child, &related, &child_paths, depth + 1, Some(rel.name()))?;
            }
        }

        Ok(key)
    }
}
