//! Top-level entry point: payload in, document out.
//!
//! [`ResourceSerializer::serialize`] never fails. Any error raised while
//! querying, building the graph or rendering is turned into an `errors`
//! document, with a [`ResponseStatus`] telling the boundary layer which status
//! family to answer with.

use std::error::Error as StdError;
use std::sync::Arc;

use hypermedia_types::{Document, ErrorObject};
use url::Url;

use crate::config::SerializerConfig;
use crate::document::{DefaultUrlPathBuilder, RenderContext, UrlPathBuilder, render, render_null};
use crate::error::{ApiError, ErrorClass, Result};
use crate::graph::{Graph, Root};
use crate::query::{AsObject, QueryContext, QueryPipeline, Sequence};
use crate::schema::{Resource, SchemaRegistry};

/// What to serialize.
#[derive(Debug)]
pub enum Payload<E> {
    Null,
    One(E),
    Many(Sequence<E>),
}

impl<E> Payload<E> {
    pub fn many(items: impl Into<Sequence<E>>) -> Self {
        Payload::Many(items.into())
    }
}

impl<E> From<Option<E>> for Payload<E> {
    fn from(value: Option<E>) -> Self {
        value.map_or(Payload::Null, Payload::One)
    }
}

/// The request being answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    url: Url,
}

impl RequestContext {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn parse(url: &str) -> core::result::Result<Self, url::ParseError> {
        Url::parse(url).map(Self::new)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl From<Url> for RequestContext {
    fn from(url: Url) -> Self {
        Self::new(url)
    }
}

/// Status family of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    Ok,
    ClientError,
    ServerError,
}

impl ResponseStatus {
    /// Representative HTTP status code.
    pub fn status_code(self) -> u16 {
        match self {
            ResponseStatus::Ok => 200,
            ResponseStatus::ClientError => 400,
            ResponseStatus::ServerError => 500,
        }
    }

    pub fn is_success(self) -> bool {
        self == ResponseStatus::Ok
    }
}

impl From<ErrorClass> for ResponseStatus {
    fn from(class: ErrorClass) -> Self {
        match class {
            ErrorClass::Client => ResponseStatus::ClientError,
            ErrorClass::Server => ResponseStatus::ServerError,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: ResponseStatus,
    pub document: Document,
}

impl Response {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn to_value(&self) -> serde_json::Value {
        self.document.to_value()
    }
}

/// Serializes payloads of registered resource types.
#[derive(Clone)]
pub struct ResourceSerializer {
    registry: Arc<SchemaRegistry>,
    config: SerializerConfig,
    url_builder: Arc<dyn UrlPathBuilder>,
}

impl core::fmt::Debug for ResourceSerializer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResourceSerializer")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ResourceSerializer {
    /// Uses a [`DefaultUrlPathBuilder`] rooted at `config.url_prefix`.
    pub fn new(registry: Arc<SchemaRegistry>, config: SerializerConfig) -> Self {
        let url_builder = Arc::new(DefaultUrlPathBuilder::new(config.url_prefix.clone()));
        Self {
            registry,
            config,
            url_builder,
        }
    }

    pub fn with_url_builder<B: UrlPathBuilder + 'static>(mut self, url_builder: B) -> Self {
        self.url_builder = Arc::new(url_builder);
        self
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SerializerConfig {
        &self.config
    }

    /// Serializes `payload` as resources of type `T`, or an error document.
    pub fn serialize<T, E>(&self, payload: Payload<E>, request: &RequestContext) -> Response
    where
        T: Resource,
        E: AsObject,
    {
        match self.try_serialize::<T, E>(payload, request) {
            Ok(document) => Response {
                status: ResponseStatus::Ok,
                document,
            },
            Err(err) => self.serialize_error(&err),
        }
    }

    /// Like [`serialize`](Self::serialize) but hands errors back.
    pub fn try_serialize<T, E>(&self, payload: Payload<E>, request: &RequestContext) -> Result<Document>
    where
        T: Resource,
        E: AsObject,
    {
        let descriptor = self.registry.get::<T>()?;
        let query = QueryContext::from_url(request.url(), &self.config)?;
        let context = RenderContext::new(request.url(), &*self.url_builder, &query)
            .naming(self.config.naming);

        let root = match payload {
            Payload::Null => return Ok(render_null(&descriptor, &context)),
            Payload::One(item) => Root::One(item.into_object_ref()),
            Payload::Many(sequence) => {
                let sequence = QueryPipeline::new(&descriptor, &query)
                    .allow_query(self.config.allow_query)
                    .apply(sequence)?;
                Root::Many(
                    sequence
                        .collect()
                        .into_iter()
                        .map(AsObject::into_object_ref)
                        .collect(),
                )
            }
        };

        let graph = Graph::build(
            &self.registry,
            &root,
            &descriptor,
            &query.including().path_set(),
        )?;
        Ok(render(&graph, &context))
    }

    /// One error as an error document.
    pub fn serialize_error(&self, error: &(dyn StdError + 'static)) -> Response {
        self.serialize_errors([error])
    }

    /// Many errors merged into one `errors` array.
    ///
    /// The status is a server error if any entry is (or if there are no
    /// entries at all), a client error otherwise. Errors that aren't
    /// [`ApiError`]s count as server errors.
    pub fn serialize_errors<'e, I>(&self, errors: I) -> Response
    where
        I: IntoIterator<Item = &'e (dyn StdError + 'static)>,
    {
        let mut status: Option<ResponseStatus> = None;
        let mut entries = Vec::new();

        for error in errors {
            let (class, code) = match error.downcast_ref::<ApiError>() {
                Some(api) => (api.class(), api.code()),
                None => (ErrorClass::Server, "internal_error"),
            };
            crate::hypermedia_trace_error!(code, error);

            let mut entry = ErrorObject::new(error.to_string()).with_code(code);
            if let Some(source) = error.source() {
                entry = entry.with_detail(source.to_string());
            }
            if let Some(docs) = &self.config.error_docs_url {
                entry = entry.with_about(format!("{docs}#{code}"));
            }
            entries.push(entry);

            status = Some(match (status, ResponseStatus::from(class)) {
                (Some(ResponseStatus::ServerError), _) | (_, ResponseStatus::ServerError) => {
                    ResponseStatus::ServerError
                }
                _ => ResponseStatus::ClientError,
            });
        }

        Response {
            status: status.unwrap_or(ResponseStatus::ServerError),
            document: Document::from_errors(entries),
        }
    }
}
