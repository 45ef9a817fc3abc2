//! Serde helpers for wire identifiers.
//!
//! Identifiers are always strings on the wire, while domain types usually
//! store them as integers or UUIDs. These helpers bridge the two in
//! `#[serde(with = ...)]` / `#[serde(deserialize_with = ...)]` attributes.
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Person {
//!     #[serde(deserialize_with = "hypermedia_types::serde_helpers::id_from_str")]
//!     id: u64,
//! }
//! ```

use core::fmt::Display;
use core::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serializer};

/// A string or a bare number, as ids arrive from lenient clients.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Int(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Int(n) => n.to_string(),
            RawId::Unsigned(n) => n.to_string(),
        }
    }
}

/// Deserialize a wire id into any `FromStr` type.
pub fn id_from_str<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = RawId::deserialize(deserializer)?.into_string();
    raw.parse()
        .map_err(|e| D::Error::custom(format!("invalid id '{raw}': {e}")))
}

/// Deserialize an optional wire id (`null` or missing -> `None`).
pub fn id_option_from_str<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    match Option::<RawId>::deserialize(deserializer)? {
        Some(raw) => {
            let raw = raw.into_string();
            raw.parse()
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid id '{raw}': {e}")))
        }
        None => Ok(None),
    }
}

/// Serialize any `Display` id as a wire string.
pub fn id_to_string<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    serializer.collect_str(value)
}

/// `#[serde(with = "hypermedia_types::serde_helpers::string_id")]`
pub mod string_id {
    use super::*;

    pub use super::id_from_str as deserialize;
    pub use super::id_to_string as serialize;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Deserialize, Serialize, Debug, PartialEq)]
    struct Row {
        #[serde(with = "string_id")]
        id: u64,
        #[serde(default, deserialize_with = "id_option_from_str")]
        parent: Option<u32>,
    }

    #[test]
    fn string_and_numeric_ids() {
        let row: Row = serde_json::from_value(json!({ "id": "42", "parent": 7 })).unwrap();
        assert_eq!(row, Row { id: 42, parent: Some(7) });

        let row: Row = serde_json::from_value(json!({ "id": 42, "parent": null })).unwrap();
        assert_eq!(row.parent, None);
    }

    #[test]
    fn ids_serialize_as_strings() {
        let value = serde_json::to_value(Row { id: 9, parent: None }).unwrap();
        assert_eq!(value, json!({ "id": "9", "parent": null }));
    }

    #[test]
    fn bad_id_is_an_error() {
        let err = serde_json::from_value::<Row>(json!({ "id": "abc" })).unwrap_err();
        assert!(err.to_string().contains("invalid id 'abc'"));
    }
}
