//! Wire document -> domain object.
//!
//! Parsing runs in three steps: the top-level structure is validated, primary
//! resources are flattened into plain `{id, attr, rel: {...}}` maps, and the
//! flattened value is handed to serde for the final mapping.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use hypermedia_types::TOP_LEVEL_MEMBERS;

use crate::config::canonical_name;
use crate::error::{ApiError, Result};

/// Checks the top-level member rules of a document.
pub fn validate(document: &Value) -> Result<()> {
    let Value::Object(members) = document else {
        return Err(ApiError::document("document must be a JSON object"));
    };

    if let Some(unknown) = members
        .keys()
        .find(|key| !TOP_LEVEL_MEMBERS.contains(&key.as_str()))
    {
        return Err(ApiError::document(format!(
            "unexpected top-level member '{unknown}'"
        )));
    }

    let has = |name: &str| members.contains_key(name);
    if !has("data") && !has("errors") && !has("meta") {
        return Err(ApiError::document(
            "document must contain at least one of 'data', 'errors' or 'meta'",
        ));
    }
    if has("data") && has("errors") {
        return Err(ApiError::document("'data' and 'errors' must not coexist"));
    }
    if has("included") && !has("data") {
        return Err(ApiError::document("'included' requires 'data'"));
    }

    match members.get("data") {
        None | Some(Value::Null) | Some(Value::Object(_)) => {}
        Some(Value::Array(items)) => {
            if items.iter().any(|item| !item.is_object()) {
                return Err(ApiError::document(
                    "'data' array must only contain resource objects",
                ));
            }
        }
        Some(_) => {
            return Err(ApiError::document(
                "'data' must be a resource object, an array of resource objects or null",
            ));
        }
    }

    Ok(())
}

/// Validates `document` and flattens its primary data.
///
/// A single resource becomes an object, a collection an array, missing or
/// `null` data becomes `null`.
pub fn flatten(document: &Value) -> Result<Value> {
    validate(document)?;
    let included = Included::new(document.get("included"));

    match document.get("data") {
        Some(Value::Object(resource)) => included.flatten(resource, &mut Vec::new()),
        Some(Value::Array(resources)) => resources
            .iter()
            .filter_map(Value::as_object)
            .map(|resource| included.flatten(resource, &mut Vec::new()))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array),
        _ => Ok(Value::Null),
    }
}

/// Parses a document into `T`.
pub fn parse<T: DeserializeOwned>(document: &Value) -> Result<T> {
    let flat = flatten(document)?;
    Ok(serde_json::from_value(flat)?)
}

/// Parses document text into `T`.
pub fn parse_str<T: DeserializeOwned>(text: &str) -> Result<T> {
    let document: Value = serde_json::from_str(text)
        .map_err(|e| ApiError::document(format!("malformed JSON: {e}")))?;
    parse(&document)
}

/// Lookup of `included` resources by `(type, id)`, for expanding linkage.
struct Included<'a> {
    resources: Vec<&'a Map<String, Value>>,
}

impl<'a> Included<'a> {
    fn new(included: Option<&'a Value>) -> Self {
        let resources = included
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_object).collect())
            .unwrap_or_default();
        Self { resources }
    }

    fn find(&self, resource_type: &str, id: &str) -> Option<&'a Map<String, Value>> {
        self.resources
            .iter()
            .copied()
            .find(|r| identity(r) == Some((resource_type, id)))
    }

    fn flatten(
        &self,
        resource: &Map<String, Value>,
        stack: &mut Vec<(String, String)>,
    ) -> Result<Value> {
        if !resource.get("type").is_some_and(Value::is_string) {
            return Err(ApiError::document("resource object is missing 'type'"));
        }

        let mut flat = Map::new();
        if let Some(id) = resource.get("id") {
            flat.insert("id".to_string(), id.clone());
        }

        if let Some(attributes) = resource.get("attributes") {
            let attributes = attributes
                .as_object()
                .ok_or_else(|| ApiError::document("'attributes' must be an object"))?;
            for (name, value) in attributes {
                flat.insert(canonical_name(name), value.clone());
            }
        }

        if let Some(relationships) = resource.get("relationships") {
            let relationships = relationships
                .as_object()
                .ok_or_else(|| ApiError::document("'relationships' must be an object"))?;

            let key = identity(resource).map(|(t, id)| (t.to_string(), id.to_string()));
            if let Some(key) = &key {
                stack.push(key.clone());
            }
            for (name, relationship) in relationships {
                let value = match relationship.get("data") {
                    None | Some(Value::Null) => Value::Null,
                    Some(Value::Object(linkage)) => self.expand(linkage, stack)?,
                    Some(Value::Array(linkages)) => Value::Array(
                        linkages
                            .iter()
                            .filter_map(Value::as_object)
                            .map(|linkage| self.expand(linkage, stack))
                            .collect::<Result<_>>()?,
                    ),
                    Some(_) => {
                        return Err(ApiError::document(format!(
                            "relationship '{name}' has invalid 'data'"
                        )));
                    }
                };
                flat.insert(canonical_name(name), value);
            }
            if key.is_some() {
                stack.pop();
            }
        }

        Ok(Value::Object(flat))
    }

    /// Linkage -> flattened included resource, or `{id}` when it isn't there
    /// (or is already being expanded further up).
    fn expand(
        &self,
        linkage: &Map<String, Value>,
        stack: &mut Vec<(String, String)>,
    ) -> Result<Value> {
        if let Some((resource_type, id)) = identity(linkage)
            && !stack.iter().any(|(t, i)| t == resource_type && i == id)
            && let Some(resource) = self.find(resource_type, id)
        {
            return self.flatten(resource, stack);
        }
        self.flatten(linkage, stack)
    }
}

fn identity(resource: &Map<String, Value>) -> Option<(&str, &str)> {
    Some((
        resource.get("type")?.as_str()?,
        resource.get("id")?.as_str()?,
    ))
}
