//! Structural field access over export records.
//!
//! A record is either a key-value mapping, looked up by whole key, or a
//! structured value whose members are reached one path segment at a time.
//! Types opt in by implementing [`FieldAccess`].

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::BuildHasher;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// How the resolver treats a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumRecordShape {
    /// Whole-path key lookup; missing key is an empty value.
    Mapping,
    /// Segment-wise member lookup; missing member is an error.
    Structured,
}

/// Value of one record member.
#[derive(Clone)]
pub enum EnumFieldValue<'a> {
    /// Present but empty.
    Null,
    /// Text.
    Text(Cow<'a, str>),
    /// Integer number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Boolean.
    Boolean(bool),
    /// Date-only value.
    Date(NaiveDate),
    /// Time-only value.
    Time(NaiveTime),
    /// Date-and-time value without zone.
    DateTime(NaiveDateTime),
    /// UTC instant; formatted like a date-and-time value.
    Timestamp(DateTime<Utc>),
    /// Nested record.
    Record(&'a dyn FieldAccess),
}

impl<'a> EnumFieldValue<'a> {
    /// Nested record member, or `Null` when absent.
    pub fn from_record<T: FieldAccess + 'a>(value: Option<&'a T>) -> Self {
        match value {
            Some(record) => EnumFieldValue::Record(record),
            None => EnumFieldValue::Null,
        }
    }
}

impl fmt::Debug for EnumFieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "Null"),
            Self::Text(v) => f.debug_tuple("Text").field(v).finish(),
            Self::Integer(v) => f.debug_tuple("Integer").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Boolean(v) => f.debug_tuple("Boolean").field(v).finish(),
            Self::Date(v) => f.debug_tuple("Date").field(v).finish(),
            Self::Time(v) => f.debug_tuple("Time").field(v).finish(),
            Self::DateTime(v) => f.debug_tuple("DateTime").field(v).finish(),
            Self::Timestamp(v) => f.debug_tuple("Timestamp").field(v).finish(),
            Self::Record(_) => write!(f, "Record(..)"),
        }
    }
}

/// Named-member access plus per-member formatting metadata.
pub trait FieldAccess {
    /// Record shape; structured unless overridden.
    fn shape(&self) -> EnumRecordShape {
        EnumRecordShape::Structured
    }

    /// Whether the record itself is absent.
    fn is_null(&self) -> bool {
        false
    }

    /// Member value; `None` when no such member exists.
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>>;

    /// Date pattern attached to the member itself.
    fn get_field_pattern(&self, _name: &str) -> Option<&str> {
        None
    }

    /// Date pattern attached to the member's accessor.
    fn get_accessor_pattern(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for &T {
    fn shape(&self) -> EnumRecordShape {
        (**self).shape()
    }
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        (**self).get_field(name)
    }
    fn get_field_pattern(&self, name: &str) -> Option<&str> {
        (**self).get_field_pattern(name)
    }
    fn get_accessor_pattern(&self, name: &str) -> Option<&str> {
        (**self).get_accessor_pattern(name)
    }
}

impl<T: FieldAccess + ?Sized> FieldAccess for Box<T> {
    fn shape(&self) -> EnumRecordShape {
        (**self).shape()
    }
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        (**self).get_field(name)
    }
    fn get_field_pattern(&self, name: &str) -> Option<&str> {
        (**self).get_field_pattern(name)
    }
    fn get_accessor_pattern(&self, name: &str) -> Option<&str> {
        (**self).get_accessor_pattern(name)
    }
}

impl<T: FieldAccess> FieldAccess for Option<T> {
    fn shape(&self) -> EnumRecordShape {
        self.as_ref()
            .map_or(EnumRecordShape::Structured, FieldAccess::shape)
    }
    fn is_null(&self) -> bool {
        self.as_ref().is_none_or(FieldAccess::is_null)
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        self.as_ref().and_then(|record| record.get_field(name))
    }
    fn get_field_pattern(&self, name: &str) -> Option<&str> {
        self.as_ref()
            .and_then(|record| record.get_field_pattern(name))
    }
    fn get_accessor_pattern(&self, name: &str) -> Option<&str> {
        self.as_ref()
            .and_then(|record| record.get_accessor_pattern(name))
    }
}

impl<V: ToFieldValue> FieldAccess for BTreeMap<String, V> {
    fn shape(&self) -> EnumRecordShape {
        EnumRecordShape::Mapping
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        self.get(name).map(ToFieldValue::to_field_value)
    }
}

impl<V: ToFieldValue, S: BuildHasher> FieldAccess for HashMap<String, V, S> {
    fn shape(&self) -> EnumRecordShape {
        EnumRecordShape::Mapping
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        self.get(name).map(ToFieldValue::to_field_value)
    }
}

impl FieldAccess for serde_json::Map<String, serde_json::Value> {
    fn shape(&self) -> EnumRecordShape {
        EnumRecordShape::Mapping
    }
    fn get_field(&self, name: &str) -> Option<EnumFieldValue<'_>> {
        self.get(name).map(ToFieldValue::to_field_value)
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region ValueConversion

/// Conversion of plain member types into [`EnumFieldValue`].
pub trait ToFieldValue {
    /// Borrow `self` as a field value.
    fn to_field_value(&self) -> EnumFieldValue<'_>;
}

impl<T: ToFieldValue + ?Sized> ToFieldValue for &T {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        (**self).to_field_value()
    }
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        match self {
            Some(value) => value.to_field_value(),
            None => EnumFieldValue::Null,
        }
    }
}

impl ToFieldValue for str {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Text(Cow::Borrowed(self))
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Text(Cow::Borrowed(self.as_str()))
    }
}

macro_rules! impl_to_field_value_integer {
    ($($ty:ty),*) => {
        $(
            impl ToFieldValue for $ty {
                fn to_field_value(&self) -> EnumFieldValue<'_> {
                    EnumFieldValue::Integer(i64::from(*self))
                }
            }
        )*
    };
}

impl_to_field_value_integer!(i8, i16, i32, i64, u8, u16, u32);

impl ToFieldValue for u64 {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        match i64::try_from(*self) {
            Ok(n) => EnumFieldValue::Integer(n),
            Err(_) => EnumFieldValue::Text(Cow::Owned(self.to_string())),
        }
    }
}

impl ToFieldValue for usize {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        match i64::try_from(*self) {
            Ok(n) => EnumFieldValue::Integer(n),
            Err(_) => EnumFieldValue::Text(Cow::Owned(self.to_string())),
        }
    }
}

impl ToFieldValue for f32 {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Float(f64::from(*self))
    }
}

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Float(*self)
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Boolean(*self)
    }
}

impl ToFieldValue for NaiveDate {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Date(*self)
    }
}

impl ToFieldValue for NaiveTime {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Time(*self)
    }
}

impl ToFieldValue for NaiveDateTime {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::DateTime(*self)
    }
}

impl ToFieldValue for DateTime<Utc> {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        EnumFieldValue::Timestamp(*self)
    }
}

impl ToFieldValue for serde_json::Value {
    fn to_field_value(&self) -> EnumFieldValue<'_> {
        match self {
            serde_json::Value::Null => EnumFieldValue::Null,
            serde_json::Value::Bool(v) => EnumFieldValue::Boolean(*v),
            serde_json::Value::Number(v) => {
                if let Some(n) = v.as_i64() {
                    EnumFieldValue::Integer(n)
                } else if let Some(n) = v.as_f64() {
                    EnumFieldValue::Float(n)
                } else {
                    EnumFieldValue::Text(Cow::Owned(v.to_string()))
                }
            }
            serde_json::Value::String(v) => EnumFieldValue::Text(Cow::Borrowed(v.as_str())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                EnumFieldValue::Text(Cow::Owned(self.to_string()))
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_records_report_mapping_shape() {
        let mut dict_record = BTreeMap::new();
        dict_record.insert("a.b".to_string(), "x".to_string());

        assert_eq!(dict_record.shape(), EnumRecordShape::Mapping);
        assert!(matches!(
            dict_record.get_field("a.b"),
            Some(EnumFieldValue::Text(v)) if v == "x"
        ));
        assert!(dict_record.get_field("a").is_none());
    }

    #[test]
    fn test_option_record_is_null_when_none() {
        let record_none: Option<BTreeMap<String, String>> = None;
        assert!(record_none.is_null());
        assert!(!Some(BTreeMap::<String, String>::new()).is_null());
    }

    #[test]
    fn test_json_values_convert_by_kind() {
        let value = serde_json::json!({"n": 3, "f": 1.5, "s": "t", "z": null, "l": [1]});
        let serde_json::Value::Object(dict_record) = value else {
            panic!("object expected");
        };

        assert!(matches!(dict_record.get_field("n"), Some(EnumFieldValue::Integer(3))));
        assert!(matches!(dict_record.get_field("f"), Some(EnumFieldValue::Float(v)) if v == 1.5));
        assert!(matches!(dict_record.get_field("z"), Some(EnumFieldValue::Null)));
        assert!(matches!(
            dict_record.get_field("l"),
            Some(EnumFieldValue::Text(v)) if v == "[1]"
        ));
    }

    #[test]
    fn test_large_unsigned_falls_back_to_text() {
        assert!(matches!(
            u64::MAX.to_field_value(),
            EnumFieldValue::Text(v) if v == u64::MAX.to_string()
        ));
    }
}
