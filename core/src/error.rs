use thiserror::Error;

/// Who is responsible for an error.
///
/// Boundary layers map `Client` to a 4xx status and `Server` to a 5xx status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// The request was malformed or asked for something that doesn't exist.
    Client,
    /// The server's schema or configuration is wrong.
    Server,
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource schema is inconsistent (reserved names, missing identifier, ...)
    #[error("Schema error: {0}")]
    Schema(String),

    /// A filter or sort named a property the resource doesn't have
    #[error("Attribute '{0}' not found")]
    AttributeNotFound(String),

    /// A query value could not be converted to the property's type
    #[error("Invalid value '{value}' for '{key}': {reason}")]
    InvalidQueryValue {
        key: String,
        value: String,
        reason: String,
    },

    /// `page[size]` above the configured limit
    #[error("Page size {requested} exceeds the limit of {limit}")]
    PageSizeExceeded { requested: usize, limit: usize },

    /// Structural violation in an incoming document
    #[error("Document error: {0}")]
    Document(String),

    /// Error mapping a flattened document onto the target type
    #[error("Mapping error: {0}")]
    Mapping(#[from] serde_json::Error),
}

impl ApiError {
    /// Client or server responsibility.
    pub fn class(&self) -> ErrorClass {
        match self {
            ApiError::Schema(_) => ErrorClass::Server,
            ApiError::AttributeNotFound(_)
            | ApiError::InvalidQueryValue { .. }
            | ApiError::PageSizeExceeded { .. }
            | ApiError::Document(_)
            | ApiError::Mapping(_) => ErrorClass::Client,
        }
    }

    /// Stable machine-readable code, used as the wire `code` member.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Schema(_) => "schema_error",
            ApiError::AttributeNotFound(_) => "attribute_not_found",
            ApiError::InvalidQueryValue { .. } => "invalid_query_value",
            ApiError::PageSizeExceeded { .. } => "page_size_exceeded",
            ApiError::Document(_) => "invalid_document",
            ApiError::Mapping(_) => "mapping_error",
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        ApiError::Schema(message.into())
    }

    pub(crate) fn document(message: impl Into<String>) -> Self {
        ApiError::Document(message.into())
    }
}

/// Result type for serializer operations
pub type Result<T> = std::result::Result<T, ApiError>;
