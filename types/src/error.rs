use serde::{Deserialize, Serialize};

use crate::Links;

/// An entry of the top-level `errors` array.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorObject {
    /// Short, human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Explanation specific to this occurrence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Application-specific error code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// `links.about` pointing at further documentation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl ErrorObject {
    /// Creates an error entry with a title only.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    /// Sets `detail`.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Sets `code`.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Sets `links.about`.
    pub fn with_about(mut self, about: impl Into<String>) -> Self {
        self.links = Some(Links {
            about: Some(about.into()),
            ..Links::default()
        });
        self
    }
}
