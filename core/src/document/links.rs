//! Link generation: URL path builders, absolute-link joining and pagination
//! links.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

use crate::schema::{RelationshipDescriptor, ResourceDescriptor};

/// Characters escaped inside one path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Characters escaped in query keys and values. Brackets and commas stay
/// readable (`page[number]=2`, `sort=-age,id`).
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Produces the paths links are built from.
///
/// Returning an empty string from any method suppresses that link.
pub trait UrlPathBuilder: Send + Sync {
    /// Collection path (`id == None`) or resource path.
    fn canonical_path(&self, resource: &ResourceDescriptor, id: Option<&str>) -> String;

    /// `related` link of a relationship.
    fn relationship_path(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        relationship: &RelationshipDescriptor,
    ) -> String;

    /// `self` link of a relationship. `related_id` is the target of a to-one.
    fn relationship_self_path(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        relationship: &RelationshipDescriptor,
        related_id: Option<&str>,
    ) -> String;
}

/// `/{prefix}/{resource}/{id}/`, `/{prefix}/{resource}/{id}/{segment}/` and
/// `/{prefix}/{resource}/{id}/relationships/{segment}/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultUrlPathBuilder {
    prefix: String,
}

impl DefaultUrlPathBuilder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn resource_segments(&self, resource: &ResourceDescriptor) -> Vec<String> {
        let mut segments: Vec<String> = self
            .prefix
            .split('/')
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        segments.push(resource.url_path().to_string());
        segments
    }
}

impl UrlPathBuilder for DefaultUrlPathBuilder {
    fn canonical_path(&self, resource: &ResourceDescriptor, id: Option<&str>) -> String {
        let mut segments = self.resource_segments(resource);
        if let Some(id) = id {
            segments.push(encode_segment(id));
        }
        join_path(&segments)
    }

    fn relationship_path(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        relationship: &RelationshipDescriptor,
    ) -> String {
        let mut segments = self.resource_segments(resource);
        segments.push(encode_segment(id));
        segments.push(relationship.url_segment().to_string());
        join_path(&segments)
    }

    fn relationship_self_path(
        &self,
        resource: &ResourceDescriptor,
        id: &str,
        relationship: &RelationshipDescriptor,
        _related_id: Option<&str>,
    ) -> String {
        let mut segments = self.resource_segments(resource);
        segments.push(encode_segment(id));
        segments.push("relationships".to_string());
        segments.push(relationship.url_segment().to_string());
        join_path(&segments)
    }
}

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

fn join_path<S: AsRef<str>>(segments: &[S]) -> String {
    let mut path = String::from("/");
    for segment in segments {
        let segment = segment.as_ref().trim_matches('/');
        if segment.is_empty() {
            continue;
        }
        path.push_str(segment);
        path.push('/');
    }
    path
}

/// Absolute link from the request's scheme and authority plus `path`.
///
/// Segments are joined by exactly one `/` and the result ends with `/`.
/// `None` for an empty path or a request URL without a host.
pub fn join_url(base: &Url, path: &str) -> Option<String> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return None;
    }
    let host = base.host_str()?;
    let authority = match base.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };
    Some(format!(
        "{}://{}{}",
        base.scheme(),
        authority,
        join_path(&segments)
    ))
}

/// `url` with `page[number]` set to `page`, other query pairs kept in order.
pub fn page_link(url: &Url, pairs: &[(String, String)], page: usize) -> String {
    let page = page.to_string();
    let mut replaced = false;
    let mut query: Vec<String> = pairs
        .iter()
        .map(|(key, value)| {
            let value = if key == "page[number]" {
                replaced = true;
                page.as_str()
            } else {
                value.as_str()
            };
            encode_pair(key, value)
        })
        .collect();
    if !replaced {
        query.push(encode_pair("page[number]", &page));
    }

    let mut base = url.clone();
    base.set_query(None);
    base.set_fragment(None);
    format!("{}?{}", base.as_str(), query.join("&"))
}

fn encode_pair(key: &str, value: &str) -> String {
    format!(
        "{}={}",
        utf8_percent_encode(key, QUERY_COMPONENT),
        utf8_percent_encode(value, QUERY_COMPONENT)
    )
}
