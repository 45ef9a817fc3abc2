//! Dynamically typed scalar values read from domain objects.

use core::cmp::Ordering;
use core::fmt;

use compact_str::{CompactString, ToCompactString};

/// Type tag of a field.
///
/// Tags form a fallback chain (`Int -> Number -> Any`) that comparison
/// overrides are resolved along.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    /// Abstract parent of `Int` and `Float`.
    Number,
    Text,
    #[cfg(feature = "uuid")]
    Uuid,
    #[cfg(feature = "chrono")]
    DateTime,
    /// Root of every chain; also used for untyped fields.
    Any,
}

impl FieldType {
    /// The next, less specific tag.
    pub fn parent(self) -> Option<FieldType> {
        match self {
            FieldType::Int | FieldType::Float => Some(FieldType::Number),
            FieldType::Any => None,
            _ => Some(FieldType::Any),
        }
    }

    /// This tag followed by every ancestor, most specific first.
    pub fn chain(self) -> impl Iterator<Item = FieldType> {
        core::iter::successors(Some(self), |ty| ty.parent())
    }

    /// Converts a raw query-string value to a value of this type.
    pub fn parse(self, raw: &str) -> Result<FieldValue, String> {
        match self {
            FieldType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => Ok(FieldValue::Bool(true)),
                "false" | "0" => Ok(FieldValue::Bool(false)),
                _ => Err("expected a boolean".into()),
            },
            FieldType::Int => parse_int(raw.trim()).map_err(|e| e.to_string()),
            FieldType::Float => raw
                .trim()
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|e| e.to_string()),
            FieldType::Number => match parse_int(raw.trim()) {
                Ok(n) => Ok(n),
                Err(_) => FieldType::Float.parse(raw),
            },
            FieldType::Text => Ok(FieldValue::Text(raw.into())),
            FieldType::Any => Ok(infer(raw)),
            #[cfg(feature = "uuid")]
            FieldType::Uuid => uuid::Uuid::parse_str(raw.trim())
                .map(FieldValue::Uuid)
                .map_err(|e| e.to_string()),
            #[cfg(feature = "chrono")]
            FieldType::DateTime => chrono::DateTime::parse_from_rfc3339(raw.trim())
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&chrono::Utc)))
                .map_err(|e| e.to_string()),
        }
    }
}

/// Signed parse, falling back to `u64` above `i64::MAX`.
fn parse_int(raw: &str) -> Result<FieldValue, core::num::ParseIntError> {
    match raw.parse::<i64>() {
        Ok(n) => Ok(FieldValue::Int(n)),
        Err(e) => raw.parse::<u64>().map(FieldValue::UInt).map_err(|_| e),
    }
}

/// Best-effort typing of an untyped raw value: bool, integer, float, text.
fn infer(raw: &str) -> FieldValue {
    let trimmed = raw.trim();
    match trimmed {
        "true" => return FieldValue::Bool(true),
        "false" => return FieldValue::Bool(false),
        _ => {}
    }
    if let Ok(n) = parse_int(trimmed) {
        return n;
    }
    match trimmed.parse::<f64>() {
        Ok(x) if x.is_finite() => FieldValue::Float(x),
        _ => FieldValue::Text(raw.into()),
    }
}

/// A scalar read from a domain object.
///
/// Integers that fit `i64` are always `Int`; `UInt` only holds values above
/// `i64::MAX`.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(CompactString),
    #[cfg(feature = "uuid")]
    Uuid(uuid::Uuid),
    #[cfg(feature = "chrono")]
    DateTime(chrono::DateTime<chrono::Utc>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Wire representation of an identifier. `None` for `Null`.
    pub fn to_id_string(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// JSON representation used for attribute members.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(n) => Value::from(*n),
            FieldValue::UInt(n) => Value::from(*n),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Text(s) => Value::String(s.to_string()),
            #[cfg(feature = "uuid")]
            FieldValue::Uuid(u) => Value::String(u.to_string()),
            #[cfg(feature = "chrono")]
            FieldValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Null => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Int(_) | FieldValue::UInt(_) | FieldValue::Float(_) => 2,
            FieldValue::Text(_) => 3,
            #[cfg(feature = "uuid")]
            FieldValue::Uuid(_) => 4,
            #[cfg(feature = "chrono")]
            FieldValue::DateTime(_) => 5,
        }
    }

    /// Total order used for sorting. `Null` sorts first; `Int` and `Float`
    /// compare numerically with each other.
    pub fn total_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Int(a), FieldValue::Int(b)) => a.cmp(b),
            (FieldValue::UInt(a), FieldValue::UInt(b)) => a.cmp(b),
            (FieldValue::Int(_), FieldValue::UInt(_)) => Ordering::Less,
            (FieldValue::UInt(_), FieldValue::Int(_)) => Ordering::Greater,
            (FieldValue::Int(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::Int(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::UInt(a), FieldValue::Float(b)) => (*a as f64).total_cmp(b),
            (FieldValue::Float(a), FieldValue::UInt(b)) => a.total_cmp(&(*b as f64)),
            (FieldValue::Float(a), FieldValue::Float(b)) => a.total_cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            #[cfg(feature = "uuid")]
            (FieldValue::Uuid(a), FieldValue::Uuid(b)) => a.cmp(b),
            #[cfg(feature = "chrono")]
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    /// Equality with numeric widening; the default filter comparison.
    ///
    /// Text compares against any other non-null value by its rendering, so
    /// `Text("20")` equals `Int(20)`.
    pub fn loosely_eq(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (a, b) if a.is_numeric() && b.is_numeric() => a.total_cmp(b) == Ordering::Equal,
            (FieldValue::Text(text), value) | (value, FieldValue::Text(text))
                if !value.is_null() =>
            {
                value.to_string() == text.as_str()
            }
            _ => self == other,
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldValue::Int(_) | FieldValue::UInt(_) | FieldValue::Float(_)
        )
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("null"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Int(n) => write!(f, "{n}"),
            FieldValue::UInt(n) => write!(f, "{n}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Text(s) => f.write_str(s),
            #[cfg(feature = "uuid")]
            FieldValue::Uuid(u) => write!(f, "{u}"),
            #[cfg(feature = "chrono")]
            FieldValue::DateTime(dt) => f.write_str(&dt.to_rfc3339()),
        }
    }
}

/// Conversion from a Rust field into a [`FieldValue`], carrying its type tag.
pub trait IntoFieldValue {
    const FIELD_TYPE: FieldType;

    fn into_field_value(self) -> FieldValue;
}

macro_rules! int_field_value {
    ($($ty:ty),*) => {
        $(
            impl IntoFieldValue for $ty {
                const FIELD_TYPE: FieldType = FieldType::Int;

                fn into_field_value(self) -> FieldValue {
                    FieldValue::Int(i64::from(self))
                }
            }
        )*
    };
}

int_field_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! wide_int_field_value {
    ($($ty:ty),*) => {
        $(
            impl IntoFieldValue for $ty {
                const FIELD_TYPE: FieldType = FieldType::Int;

                fn into_field_value(self) -> FieldValue {
                    match i64::try_from(self) {
                        Ok(n) => FieldValue::Int(n),
                        Err(_) => FieldValue::UInt(self as u64),
                    }
                }
            }
        )*
    };
}

wide_int_field_value!(u64, usize);

impl IntoFieldValue for isize {
    const FIELD_TYPE: FieldType = FieldType::Int;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Int(self as i64)
    }
}

impl IntoFieldValue for f32 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(f64::from(self))
    }
}

impl IntoFieldValue for f64 {
    const FIELD_TYPE: FieldType = FieldType::Float;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Float(self)
    }
}

impl IntoFieldValue for bool {
    const FIELD_TYPE: FieldType = FieldType::Bool;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }
}

impl IntoFieldValue for String {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self.into())
    }
}

impl IntoFieldValue for CompactString {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self)
    }
}

impl IntoFieldValue for &'static str {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self.to_compact_string())
    }
}

impl IntoFieldValue for char {
    const FIELD_TYPE: FieldType = FieldType::Text;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Text(self.to_compact_string())
    }
}

impl<T: IntoFieldValue> IntoFieldValue for Option<T> {
    const FIELD_TYPE: FieldType = T::FIELD_TYPE;

    fn into_field_value(self) -> FieldValue {
        self.map_or(FieldValue::Null, IntoFieldValue::into_field_value)
    }
}

impl IntoFieldValue for FieldValue {
    const FIELD_TYPE: FieldType = FieldType::Any;

    fn into_field_value(self) -> FieldValue {
        self
    }
}

#[cfg(feature = "uuid")]
impl IntoFieldValue for uuid::Uuid {
    const FIELD_TYPE: FieldType = FieldType::Uuid;

    fn into_field_value(self) -> FieldValue {
        FieldValue::Uuid(self)
    }
}

#[cfg(feature = "chrono")]
impl IntoFieldValue for chrono::DateTime<chrono::Utc> {
    const FIELD_TYPE: FieldType = FieldType::DateTime;

    fn into_field_value(self) -> FieldValue {
        FieldValue::DateTime(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_walks_to_any() {
        let chain: Vec<_> = FieldType::Int.chain().collect();
        assert_eq!(chain, vec![FieldType::Int, FieldType::Number, FieldType::Any]);
        assert_eq!(FieldType::Text.chain().count(), 2);
    }

    #[test]
    fn parse_by_type() {
        assert_eq!(FieldType::Int.parse("20"), Ok(FieldValue::Int(20)));
        assert_eq!(FieldType::Bool.parse("TRUE"), Ok(FieldValue::Bool(true)));
        assert_eq!(FieldType::Number.parse("1.5"), Ok(FieldValue::Float(1.5)));
        assert!(FieldType::Int.parse("twenty").is_err());
    }

    #[test]
    fn ids_render_as_strings() {
        assert_eq!(FieldValue::Int(123).to_id_string().as_deref(), Some("123"));
        assert_eq!(
            FieldValue::Text("abc".into()).to_id_string().as_deref(),
            Some("abc")
        );
        assert_eq!(FieldValue::Null.to_id_string(), None);
    }

    #[test]
    fn null_sorts_first_and_numbers_mix() {
        assert_eq!(FieldValue::Null.total_cmp(&FieldValue::Int(-5)), Ordering::Less);
        assert_eq!(
            FieldValue::Int(2).total_cmp(&FieldValue::Float(1.5)),
            Ordering::Greater
        );
        assert!(FieldValue::Int(3).loosely_eq(&FieldValue::Float(3.0)));
    }

    #[test]
    fn wide_unsigned_values_stay_exact() {
        assert_eq!(u64::MAX.into_field_value(), FieldValue::UInt(u64::MAX));
        assert_eq!(7u64.into_field_value(), FieldValue::Int(7));
        assert_eq!(
            u64::MAX.into_field_value().to_id_string().as_deref(),
            Some("18446744073709551615")
        );
        assert_ne!(
            u64::MAX.into_field_value(),
            (u64::MAX - 1).into_field_value()
        );
        assert_eq!(
            FieldType::Int.parse("18446744073709551615"),
            Ok(FieldValue::UInt(u64::MAX))
        );
        assert_eq!(
            (u64::MAX - 1).into_field_value().total_cmp(&u64::MAX.into_field_value()),
            Ordering::Less
        );
        assert_eq!(
            FieldValue::Int(i64::MAX).total_cmp(&FieldValue::UInt(u64::MAX)),
            Ordering::Less
        );
        assert_eq!(
            u64::MAX.into_field_value().to_json(),
            serde_json::json!(18446744073709551615u64)
        );
    }

    #[test]
    fn untyped_values_are_inferred() {
        assert_eq!(FieldType::Any.parse("20"), Ok(FieldValue::Int(20)));
        assert_eq!(FieldType::Any.parse("2.5"), Ok(FieldValue::Float(2.5)));
        assert_eq!(FieldType::Any.parse("true"), Ok(FieldValue::Bool(true)));
        assert_eq!(FieldType::Any.parse("abc"), Ok(FieldValue::Text("abc".into())));
        assert_eq!(FieldType::Any.parse("NaN"), Ok(FieldValue::Text("NaN".into())));
    }

    #[test]
    fn text_matches_other_values_by_rendering() {
        assert!(FieldValue::Text("20".into()).loosely_eq(&FieldValue::Int(20)));
        assert!(FieldValue::Bool(true).loosely_eq(&FieldValue::Text("true".into())));
        assert!(!FieldValue::Text("null".into()).loosely_eq(&FieldValue::Null));
        assert!(!FieldValue::Text("21".into()).loosely_eq(&FieldValue::Int(20)));
    }

    #[test]
    fn options_keep_the_inner_tag() {
        assert_eq!(<Option<i32> as IntoFieldValue>::FIELD_TYPE, FieldType::Int);
        assert_eq!(None::<i32>.into_field_value(), FieldValue::Null);
    }
}
