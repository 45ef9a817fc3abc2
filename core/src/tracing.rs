//! Tracing utilities for graph building, query interpretation and error conversion.
//!
//! Enable the `tracing` feature to emit spans and events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site.

/// Emit a debug-level event once a resource graph is built.
///
/// ```ignore
/// hypermedia_trace_graph!(descriptor.type_name(), graph.len(), included);
/// ```
#[macro_export]
macro_rules! hypermedia_trace_graph {
    ($resource:expr, $nodes:expr, $included:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            resource = %$resource,
            nodes = $nodes,
            included = $included,
            "hypermedia.graph"
        );
    };
}

/// Emit a debug-level event for one applied query stage (filter, sort, page).
///
/// ```ignore
/// hypermedia_trace_query!("filter", "people", context.len());
/// ```
#[macro_export]
macro_rules! hypermedia_trace_query {
    ($stage:literal, $resource:expr, $terms:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            stage = $stage,
            resource = %$resource,
            terms = $terms,
            "hypermedia.query"
        );
    };
}

/// Emit a warn-level event when an error is converted into an error document.
///
/// ```ignore
/// hypermedia_trace_error!(err.code(), &err);
/// ```
#[macro_export]
macro_rules! hypermedia_trace_error {
    ($code:expr, $error:expr) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(code = $code, error = %$error, "hypermedia.error");
    };
}
