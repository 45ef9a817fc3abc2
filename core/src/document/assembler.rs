//! Graph -> wire document.

use core::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use hypermedia_types::{
    Attributes, Data, Document, Links, RelationshipObject, ResourceIdentifier, ResourceObject,
};
use url::Url;

use crate::config::NamingConvention;
use crate::graph::{Graph, GraphNode, NodeKey};
use crate::query::{IncludingContext, PaginationContext, QueryContext};
use crate::schema::{
    LinkVisibility, ObjectRef, RelationshipDescriptor, RelationshipKind, ResourceDescriptor,
};

use super::links::{UrlPathBuilder, join_url, page_link};

/// Everything rendering needs besides the graph.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    /// The request URL; its origin prefixes every link, and it is the top-level `self`.
    pub request: &'a Url,
    pub url_builder: &'a dyn UrlPathBuilder,
    pub pagination: Option<PaginationContext>,
    pub including: &'a IncludingContext,
    /// Decoded query pairs, reused for pagination links.
    pub query_pairs: &'a [(String, String)],
    pub naming: NamingConvention,
}

impl<'a> RenderContext<'a> {
    pub fn new(request: &'a Url, url_builder: &'a dyn UrlPathBuilder, query: &'a QueryContext) -> Self {
        Self {
            request,
            url_builder,
            pagination: query.pagination().copied(),
            including: query.including(),
            query_pairs: query.pairs(),
            naming: NamingConvention::default(),
        }
    }

    pub fn naming(mut self, naming: NamingConvention) -> Self {
        self.naming = naming;
        self
    }

    fn link(&self, path: String) -> Option<String> {
        join_url(self.request, &path)
    }
}

impl core::fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RenderContext")
            .field("request", &self.request.as_str())
            .field("pagination", &self.pagination)
            .field("including", &self.including)
            .field("naming", &self.naming)
            .finish_non_exhaustive()
    }
}

/// Renders `graph` as a compound document.
///
/// `data` follows the root's presentation order; `included` follows discovery
/// order and is dropped entirely when default inclusion is disabled and the
/// request named no include paths. Only primary resources of a collection
/// carry a per-item `self` link.
pub fn render(graph: &Graph, context: &RenderContext<'_>) -> Document {
    let descriptor = graph.root_descriptor();
    let collection = graph.is_collection();

    let data_nodes: Vec<&GraphNode> = graph.data_nodes().collect();
    let resources: Vec<ResourceObject> = data_nodes
        .iter()
        .map(|node| render_node(node, collection, context))
        .collect();
    let count = resources.len();
    let data = if collection {
        Data::Many(resources)
    } else {
        resources.into_iter().next().map_or(Data::Null, Data::One)
    };

    let included = context.including.renders_included().then(|| {
        graph
            .included_nodes()
            .filter(|node| context.including.allows(node.property_name().unwrap_or_default()))
            .map(|node| render_node(node, false, context))
            .collect()
    });

    let objects: Vec<ObjectRef> = data_nodes
        .iter()
        .map(|node| Arc::clone(node.object()))
        .collect();

    Document {
        data: Some(data),
        included,
        links: top_level_links(descriptor, context, collection.then_some(count)),
        meta: descriptor.meta(&objects, collection),
        ..Document::default()
    }
}

/// `{ "data": null, "links": ... }` for a missing root.
pub fn render_null(descriptor: &ResourceDescriptor, context: &RenderContext<'_>) -> Document {
    Document {
        data: Some(Data::Null),
        links: top_level_links(descriptor, context, None),
        ..Document::default()
    }
}

/// `self` plus, for paginated collections, `first`/`prev`/`next`.
fn top_level_links(
    descriptor: &ResourceDescriptor,
    context: &RenderContext<'_>,
    page_count: Option<usize>,
) -> Option<Links> {
    let mut links = Links::default();
    if descriptor.link_visibility().contains(LinkVisibility::TOP_SELF) {
        links.self_link = Some(context.request.as_str().to_string());
    }
    if let (Some(page), Some(count)) = (context.pagination, page_count) {
        let url = context.request;
        links.first = Some(page_link(url, context.query_pairs, 0));
        links.prev = page
            .previous()
            .map(|n| page_link(url, context.query_pairs, n));
        links.next = page
            .has_next(count)
            .then(|| page_link(url, context.query_pairs, page.next()));
    }
    links.non_empty()
}

fn render_node(node: &GraphNode, item_links: bool, context: &RenderContext<'_>) -> ResourceObject {
    let descriptor = node.descriptor();
    let object: &dyn Any = &**node.object();
    let id = node.key().id();

    let mut attributes = Attributes::new();
    for attr in descriptor.attributes() {
        if let Some(value) = attr.value(object) {
            attributes.insert(context.naming.apply(attr.name()), value.to_json());
        }
    }

    let relationships: BTreeMap<String, RelationshipObject> = descriptor
        .relationships()
        .iter()
        .map(|rel| {
            (
                context.naming.apply(rel.name()),
                render_relationship(node, descriptor, rel, context),
            )
        })
        .collect();

    let links = (item_links && descriptor.link_visibility().contains(LinkVisibility::SELF))
        .then(|| context.link(context.url_builder.canonical_path(descriptor, Some(id))))
        .flatten()
        .map(|self_link| Links {
            self_link: Some(self_link),
            ..Links::default()
        });

    ResourceObject {
        resource_type: node.key().type_name().to_string(),
        id: Some(id.to_string()),
        attributes: (!attributes.is_empty()).then_some(attributes),
        relationships: (!relationships.is_empty()).then_some(relationships),
        links,
    }
}

fn render_relationship(
    node: &GraphNode,
    descriptor: &ResourceDescriptor,
    rel: &RelationshipDescriptor,
    context: &RenderContext<'_>,
) -> RelationshipObject {
    let id = node.key().id();
    let entry = node.relationship(rel.name());
    let related_id = match rel.kind() {
        RelationshipKind::ToOne => entry.and_then(|e| e.targets.first()).map(NodeKey::id),
        RelationshipKind::ToMany => None,
    };

    let visibility = rel.link_visibility();
    let links = Links {
        self_link: visibility
            .contains(LinkVisibility::SELF)
            .then(|| {
                context.link(
                    context
                        .url_builder
                        .relationship_self_path(descriptor, id, rel, related_id),
                )
            })
            .flatten(),
        related: visibility
            .contains(LinkVisibility::RELATED)
            .then(|| context.link(context.url_builder.relationship_path(descriptor, id, rel)))
            .flatten(),
        ..Links::default()
    };

    let data = entry
        .filter(|e| e.included && e.value.is_some())
        .map(|e| match rel.kind() {
            RelationshipKind::ToOne => e
                .targets
                .first()
                .map_or(Data::Null, |key| Data::One(identifier(key))),
            RelationshipKind::ToMany => Data::Many(e.targets.iter().map(identifier).collect()),
        });

    RelationshipObject {
        links: links.non_empty(),
        data,
    }
}

fn identifier(key: &NodeKey) -> ResourceIdentifier {
    ResourceIdentifier::new(key.type_name(), key.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SerializerConfig;
    use crate::document::DefaultUrlPathBuilder;
    use crate::graph::Root;
    use crate::schema::{Resource, SchemaRegistry};
    use serde_json::json;

    struct Person {
        id: u32,
        first_name: &'static str,
        nickname: Option<&'static str>,
        job: Option<Arc<Company>>,
        friends: Vec<Arc<Person>>,
    }

    struct Company {
        id: u32,
        name: &'static str,
    }

    impl Resource for Person {
        fn descriptor() -> crate::Result<ResourceDescriptor> {
            ResourceDescriptor::builder::<Person>("person")
                .id(|p| p.id)
                .url_path("people")
                .attribute("first_name", |p| p.first_name)
                .attribute_with("nickname", crate::schema::FieldType::Text, |p| {
                    p.nickname.map(|n| crate::schema::FieldValue::Text(n.into()))
                })
                .to_one("job", |p| p.job.clone())
                .to_many("friends", |p| p.friends.clone())
                .build()
        }
    }

    impl Resource for Company {
        fn descriptor() -> crate::Result<ResourceDescriptor> {
            ResourceDescriptor::builder::<Company>("corporation")
                .id(|c| c.id)
                .attribute("name", |c| c.name)
                .build()
        }
    }

    fn person(id: u32, job: Option<Arc<Company>>) -> Arc<Person> {
        Arc::new(Person {
            id,
            first_name: "John",
            nickname: None,
            job,
            friends: Vec::new(),
        })
    }

    fn render_with(root: Root, query: &str, config: &SerializerConfig) -> serde_json::Value {
        let registry = SchemaRegistry::new();
        let descriptor = registry.get::<Person>().unwrap();
        let url = match query {
            "" => Url::parse("http://example.com/people/").unwrap(),
            query => Url::parse(&format!("http://example.com/people/?{query}")).unwrap(),
        };
        let query = QueryContext::from_url(&url, config).unwrap();
        let builder = DefaultUrlPathBuilder::default();
        let context = RenderContext::new(&url, &builder, &query);
        let graph = Graph::build(&registry, &root, &descriptor, &query.including().path_set()).unwrap();
        render(&graph, &context).to_value()
    }

    #[test]
    fn single_resource_with_included_job() {
        let company = Arc::new(Company { id: 456, name: "Acme" });
        let doc = render_with(
            Root::one(person(123, Some(company))),
            "",
            &SerializerConfig::default(),
        );

        assert_eq!(doc["data"]["id"], "123");
        assert_eq!(doc["data"]["attributes"], json!({ "first-name": "John" }));
        assert_eq!(
            doc["data"]["relationships"]["job"],
            json!({
                "links": {
                    "self": "http://example.com/people/123/relationships/job/",
                    "related": "http://example.com/people/123/job/"
                },
                "data": { "type": "corporation", "id": "456" }
            })
        );
        assert_eq!(doc["data"]["relationships"]["friends"]["data"], json!([]));
        assert!(doc["data"].get("links").is_none());
        assert_eq!(
            doc["included"],
            json!([{ "type": "corporation", "id": "456", "attributes": { "name": "Acme" } }])
        );
        assert_eq!(doc["links"]["self"], "http://example.com/people/");
    }

    #[test]
    fn missing_to_one_renders_null() {
        let doc = render_with(Root::one(person(1, None)), "", &SerializerConfig::default());
        assert_eq!(doc["data"]["relationships"]["job"]["data"], json!(null));
        assert_eq!(doc["included"], json!([]));
    }

    #[test]
    fn collections_get_item_links_and_page_links() {
        let people = (0..3).map(|id| person(id, None));
        let config = SerializerConfig::default().paginated(3, None);
        let doc = render_with(Root::many(people), "page[number]=1", &config);

        assert_eq!(doc["data"][0]["links"]["self"], "http://example.com/people/0/");
        assert_eq!(doc["links"]["first"], "http://example.com/people/?page[number]=0");
        assert_eq!(doc["links"]["prev"], "http://example.com/people/?page[number]=0");
        assert_eq!(doc["links"]["next"], "http://example.com/people/?page[number]=2");
    }

    #[test]
    fn short_page_has_no_next() {
        let people = (0..2).map(|id| person(id, None));
        let config = SerializerConfig::default().paginated(3, None);
        let doc = render_with(Root::many(people), "", &config);
        assert!(doc["links"].get("next").is_none());
        assert!(doc["links"].get("prev").is_none());
    }

    #[test]
    fn disabled_default_inclusion() {
        let company = Arc::new(Company { id: 9, name: "Acme" });
        let config = SerializerConfig {
            disable_default_included: true,
            ..SerializerConfig::default()
        };

        let doc = render_with(Root::one(person(1, Some(Arc::clone(&company)))), "", &config);
        assert!(doc.get("included").is_none());
        assert!(doc["data"]["relationships"]["job"].get("data").is_none());

        let doc = render_with(Root::one(person(1, Some(company))), "include=job", &config);
        assert_eq!(doc["included"][0]["id"], "9");
    }

    #[test]
    fn null_root() {
        let registry = SchemaRegistry::new();
        let descriptor = registry.get::<Person>().unwrap();
        let url = Url::parse("http://example.com/people/1/").unwrap();
        let query = QueryContext::default();
        let builder = DefaultUrlPathBuilder::default();
        let doc = render_null(&descriptor, &RenderContext::new(&url, &builder, &query));
        assert_eq!(
            doc.to_value(),
            json!({ "data": null, "links": { "self": "http://example.com/people/1/" } })
        );
    }
}
