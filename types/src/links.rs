use serde::{Deserialize, Serialize};

/// A `links` member.
///
/// One struct covers every place links appear; unused members stay `None`
/// and are skipped on output.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Links {
    /// `self`
    #[serde(rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// `related` (relationship objects only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// `first` page (top level only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// `prev` page (top level only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// `next` page (top level only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// `about` (error objects only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
}

impl Links {
    /// `true` when no member is set.
    pub fn is_empty(&self) -> bool {
        self.self_link.is_none()
            && self.related.is_none()
            && self.first.is_none()
            && self.prev.is_none()
            && self.next.is_none()
            && self.about.is_none()
    }

    /// Returns `None` for an empty set so the member is dropped from output.
    pub fn non_empty(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }
}
