use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Attributes, Data, ErrorObject, Links};

/// Top-level compound document.
///
/// A successful response carries `data` (and possibly `included`); a failed
/// one carries `errors`. The two never appear together.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Document {
    /// Primary data. `Some(Data::Null)` renders as `"data": null`.
    #[serde(
        default,
        deserialize_with = "crate::data::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Data<ResourceObject>>,
    /// Error entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
    /// Free-form metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// Top-level links (`self`, `first`, `prev`, `next`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Related resources pulled in by include paths.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<ResourceObject>>,
    /// Implementation information.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jsonapi: Option<JsonApiObject>,
}

impl Document {
    /// A document carrying only errors.
    pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::default()
        }
    }

    /// Converts the document into a JSON tree.
    pub fn to_value(&self) -> serde_json::Value {
        // Every member is a plain map/string/array; serialization is infallible.
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    /// Iterates over `data` and `included` resources in output order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceObject> {
        self.data
            .iter()
            .flat_map(Data::iter)
            .chain(self.included.iter().flatten())
    }
}

/// `jsonapi` member.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct JsonApiObject {
    /// Highest supported wire version.
    pub version: String,
}

/// Full resource representation.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct ResourceObject {
    /// Resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Identifier, always a string on the wire. Optional for client-created resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Attribute members.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Attributes>,
    /// Relationship members keyed by relationship name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<BTreeMap<String, RelationshipObject>>,
    /// Resource-level links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
}

impl ResourceObject {
    /// Minimal `{type, id}` reference to this resource.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        self.id.as_ref().map(|id| ResourceIdentifier {
            resource_type: self.resource_type.clone(),
            id: id.clone(),
        })
    }

    /// Looks up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.as_ref().and_then(|a| a.get(name))
    }

    /// Looks up a relationship.
    pub fn relationship(&self, name: &str) -> Option<&RelationshipObject> {
        self.relationships.as_ref().and_then(|r| r.get(name))
    }
}

/// Minimal `{type, id}` reference.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceIdentifier {
    /// Resource type name.
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Identifier.
    pub id: String,
}

impl ResourceIdentifier {
    /// Creates a reference.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }
}

/// Relationship member of a resource object.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RelationshipObject {
    /// `self` / `related` links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    /// Resource linkage; absent when the relationship was not included.
    #[serde(
        default,
        deserialize_with = "crate::data::present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<Data<ResourceIdentifier>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_primary_data_is_kept() {
        let doc = Document {
            data: Some(Data::Null),
            ..Document::default()
        };
        assert_eq!(doc.to_value(), json!({ "data": null }));
    }

    #[test]
    fn error_document_omits_data() {
        let doc = Document::from_errors(vec![ErrorObject::new("boom")]);
        assert_eq!(doc.to_value(), json!({ "errors": [{ "title": "boom" }] }));
    }

    #[test]
    fn resource_round_trips_through_json() {
        let json = json!({
            "type": "people",
            "id": "1",
            "attributes": { "name": "Ada" },
            "relationships": {
                "job": { "data": { "type": "corporation", "id": "9" } },
                "friends": { "data": [] }
            }
        });
        let resource: ResourceObject = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(resource.id.as_deref(), Some("1"));
        assert_eq!(
            resource.relationship("job").and_then(|r| r.data.clone()),
            Some(Data::One(ResourceIdentifier::new("corporation", "9")))
        );
        assert_eq!(serde_json::to_value(&resource).unwrap(), json);
    }

    #[test]
    fn explicit_null_data_differs_from_missing_data() {
        let with_null: RelationshipObject = serde_json::from_value(json!({ "data": null })).unwrap();
        let without: RelationshipObject = serde_json::from_value(json!({})).unwrap();
        assert_eq!(with_null.data, Some(Data::Null));
        assert_eq!(without.data, None);
    }
}
