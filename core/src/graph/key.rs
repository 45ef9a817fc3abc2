use std::any::Any;

use compact_str::CompactString;

use crate::error::{ApiError, Result};
use crate::schema::ResourceDescriptor;

/// Identity of a resource within one document: `(type, id)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    type_name: CompactString,
    id: String,
}

impl NodeKey {
    pub fn new(type_name: impl Into<CompactString>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Key of `object` as described by `descriptor`.
    ///
    /// Every resource must have an identity; a missing or null identifier is
    /// a schema error.
    pub fn for_object(object: &dyn Any, descriptor: &ResourceDescriptor) -> Result<Self> {
        let id = descriptor.id_of(object).ok_or_else(|| {
            ApiError::schema(format!(
                "resource of type '{}' has no value for identifier property '{}'",
                descriptor.type_name(),
                descriptor.id_property()
            ))
        })?;
        Ok(Self::new(descriptor.type_name(), id))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl core::fmt::Display for NodeKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}:{}", self.type_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        id: Option<String>,
    }

    fn descriptor() -> ResourceDescriptor {
        ResourceDescriptor::builder::<Note>("note")
            .id(|n| n.id.clone())
            .build()
            .unwrap()
    }

    #[test]
    fn keys_compare_by_type_and_id() {
        assert_eq!(NodeKey::new("a", "1"), NodeKey::new("a", "1"));
        assert_ne!(NodeKey::new("a", "1"), NodeKey::new("b", "1"));
        assert_ne!(NodeKey::new("a", "1"), NodeKey::new("a", "2"));
    }

    #[test]
    fn key_from_object() {
        let note = Note {
            id: Some("n-1".into()),
        };
        let key = NodeKey::for_object(&note, &descriptor()).unwrap();
        assert_eq!(key, NodeKey::new("note", "n-1"));
        assert_eq!(key.to_string(), "note:n-1");
    }

    #[test]
    fn null_identifier_is_fatal() {
        let note = Note { id: None };
        let err = NodeKey::for_object(&note, &descriptor()).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }
}
