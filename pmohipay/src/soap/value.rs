//! Value tree handed to the SOAP body builder
//!
//! Typed requests are lowered into a [`Record`] of [`SoapValue`]s before being turned
//! into XML. The set of variants is closed so each serialization rule lives in one
//! place (see [`super::builder`]).

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

/// One node of a request tree
#[derive(Debug, Clone, PartialEq)]
pub enum SoapValue {
    /// Strings and numbers, emitted as-is
    Scalar(String),
    /// Emitted as `1` / `0`
    Bool(bool),
    /// Emitted as `YYYY-MM-DDTHH:MM:SS` (UTC, no offset, no fraction)
    DateTime(DateTime<Utc>),
    /// Emitted as one `<item>` child per entry
    List(Vec<SoapValue>),
    /// Free-form bag, emitted as `<item><key/><value/></item>` pairs
    Dictionary(IndexMap<String, String>),
    /// Nested structure, field name as tag
    Record(Record),
}

/// Ordered set of named fields
///
/// Absent values are never stored: `field` silently skips anything whose
/// [`ToSoapValue::to_soap_value`] returns `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: IndexMap<String, SoapValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field (builder style). Replacing an existing name keeps its position.
    pub fn field<V: ToSoapValue + ?Sized>(mut self, name: &str, value: &V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<V: ToSoapValue + ?Sized>(&mut self, name: &str, value: &V) {
        if let Some(value) = value.to_soap_value() {
            self.fields.insert(name.to_string(), value);
        }
    }

    /// Overlay `other` on top of `self`: fields of `other` win
    pub fn merge(mut self, other: Record) -> Self {
        self.fields.extend(other.fields);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SoapValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SoapValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Conversion into the request tree
///
/// `None` means "absent": the field is dropped, not emitted empty.
pub trait ToSoapValue {
    fn to_soap_value(&self) -> Option<SoapValue>;
}

impl<T: ToSoapValue + ?Sized> ToSoapValue for &T {
    fn to_soap_value(&self) -> Option<SoapValue> {
        (**self).to_soap_value()
    }
}

impl<T: ToSoapValue> ToSoapValue for Option<T> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        self.as_ref().and_then(ToSoapValue::to_soap_value)
    }
}

impl ToSoapValue for str {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Scalar(self.to_string()))
    }
}

impl ToSoapValue for String {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Scalar(self.clone()))
    }
}

macro_rules! impl_numeric_soap_value {
    ($($ty:ty),*) => {
        $(
            impl ToSoapValue for $ty {
                fn to_soap_value(&self) -> Option<SoapValue> {
                    Some(SoapValue::Scalar(self.to_string()))
                }
            }
        )*
    };
}

impl_numeric_soap_value!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl ToSoapValue for bool {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Bool(*self))
    }
}

impl ToSoapValue for DateTime<Utc> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::DateTime(*self))
    }
}

impl<T: ToSoapValue> ToSoapValue for [T] {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::List(
            self.iter().filter_map(ToSoapValue::to_soap_value).collect(),
        ))
    }
}

impl<T: ToSoapValue> ToSoapValue for Vec<T> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        self.as_slice().to_soap_value()
    }
}

impl ToSoapValue for IndexMap<String, String> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Dictionary(self.clone()))
    }
}

impl ToSoapValue for BTreeMap<String, String> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Dictionary(
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ))
    }
}

impl ToSoapValue for HashMap<String, String> {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Dictionary(
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ))
    }
}

impl ToSoapValue for Record {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(SoapValue::Record(self.clone()))
    }
}

impl ToSoapValue for SoapValue {
    fn to_soap_value(&self) -> Option<SoapValue> {
        Some(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_are_dropped() {
        let none: Option<String> = None;
        let record = Record::new()
            .field("a", "x")
            .field("b", &none)
            .field("c", &Some(3u32));

        assert_eq!(record.len(), 2);
        assert!(!record.contains("b"));
        assert_eq!(record.get("c"), Some(&SoapValue::Scalar("3".to_string())));
    }

    #[test]
    fn test_merge_overrides_in_place() {
        let defaults = Record::new().field("wsLogin", "a").field("wsPassword", "b");
        let explicit = Record::new().field("amount", "9.99").field("wsLogin", "c");

        let merged = defaults.merge(explicit);
        let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["wsLogin", "wsPassword", "amount"]);
        assert_eq!(merged.get("wsLogin"), Some(&SoapValue::Scalar("c".to_string())));
    }

    #[test]
    fn test_map_becomes_dictionary() {
        let mut data = BTreeMap::new();
        data.insert("sessionId".to_string(), "42".to_string());
        match data.to_soap_value() {
            Some(SoapValue::Dictionary(map)) => assert_eq!(map["sessionId"], "42"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
