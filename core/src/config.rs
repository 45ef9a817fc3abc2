//! Serializer configuration (`hypermedia.toml` or inline TOML).

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Member-name convention for attributes and relationships on the wire.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    /// `first-name`
    #[default]
    Kebab,
    /// `firstName`
    Camel,
    /// `first_name`
    Snake,
}

impl NamingConvention {
    /// Converts a domain property name to its wire member name.
    pub fn apply(&self, name: &str) -> String {
        match self {
            NamingConvention::Kebab => name.to_kebab_case(),
            NamingConvention::Camel => name.to_lower_camel_case(),
            NamingConvention::Snake => name.to_snake_case(),
        }
    }
}

/// Canonical property name used for lookups: dashed, underscored and camel
/// input all collapse to the same snake-case key.
pub fn canonical_name(name: &str) -> String {
    name.to_snake_case()
}

/// Pagination settings for a paginated endpoint
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Page size used when the client sends no `page[size]`
    #[serde(default = "default_per_page")]
    pub per_page: usize,
    /// Largest `page[size]` a client may request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size_limit: Option<usize>,
}

fn default_per_page() -> usize {
    10
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page_size_limit: None,
        }
    }
}

/// Main configuration struct
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SerializerConfig {
    /// Wire naming convention for attribute and relationship members
    #[serde(default)]
    pub naming: NamingConvention,
    /// Path prefix prepended to every generated link (e.g. `api/v1`)
    #[serde(default)]
    pub url_prefix: String,
    /// Apply `filter`/`sort` query parameters to collections (pagination follows `pagination`)
    #[serde(default = "default_allow_query")]
    pub allow_query: bool,
    /// Only include relationships that were asked for with `include=`
    #[serde(default)]
    pub disable_default_included: bool,
    /// Pagination; `None` leaves collections unpaginated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationConfig>,
    /// Base URL for `links.about` on error entries (the error code is appended as a fragment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_docs_url: Option<String>,
}

fn default_allow_query() -> bool {
    true
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            naming: NamingConvention::default(),
            url_prefix: String::new(),
            allow_query: default_allow_query(),
            disable_default_included: false,
            pagination: None,
            error_docs_url: None,
        }
    }
}

impl SerializerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::parse(&contents)
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Enables pagination with the given page size.
    pub fn paginated(mut self, per_page: usize, page_size_limit: Option<usize>) -> Self {
        self.pagination = Some(PaginationConfig {
            per_page,
            page_size_limit,
        });
        self
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
}
