//! Tri-state linkage container.
//!
//! Both primary data and relationship data can be `null`, a single object or
//! an array. Serde's `Option` can't tell "absent" from "null", so the member
//! itself is wrapped in `Option<Data<T>>` and `Data::Null` encodes the
//! explicit `null`.

use serde::de::{Deserialize, DeserializeOwned, Deserializer};
use serde::ser::{Serialize, Serializer};

/// `null`, one item, or an array of items.
#[derive(Debug, Clone, PartialEq)]
pub enum Data<T> {
    /// Serialized as JSON `null`.
    Null,
    /// A single object.
    One(T),
    /// An array (possibly empty, never `null`).
    Many(Vec<T>),
}

impl<T> Data<T> {
    /// Returns the single item, if this is [`Data::One`].
    pub fn as_one(&self) -> Option<&T> {
        match self {
            Data::One(item) => Some(item),
            _ => None,
        }
    }

    /// Returns the items, if this is [`Data::Many`].
    pub fn as_many(&self) -> Option<&[T]> {
        match self {
            Data::Many(items) => Some(items),
            _ => None,
        }
    }

    /// `true` for [`Data::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Data::Null)
    }

    /// Iterates over every contained item regardless of shape.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let slice: &[T] = match self {
            Data::Null => &[],
            Data::One(item) => core::slice::from_ref(item),
            Data::Many(items) => items,
        };
        slice.iter()
    }
}

impl<T: Serialize> Serialize for Data<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Data::Null => serializer.serialize_none(),
            Data::One(item) => item.serialize(serializer),
            Data::Many(items) => items.serialize(serializer),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Data<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        #[serde(bound = "U: DeserializeOwned")]
        enum Shape<U> {
            Many(Vec<U>),
            One(U),
        }

        match Option::<Shape<T>>::deserialize(deserializer)? {
            None => Ok(Data::Null),
            Some(Shape::One(item)) => Ok(Data::One(item)),
            Some(Shape::Many(items)) => Ok(Data::Many(items)),
        }
    }
}

/// Deserializes a member that is present, keeping an explicit `null` as
/// `Some(Data::Null)` instead of collapsing it to `None`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Data<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Data::deserialize(deserializer).map(Some)
}
