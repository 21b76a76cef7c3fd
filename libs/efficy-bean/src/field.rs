//! Field shapes found in Efficy beans.

use serde_json::{Map, Value};

/// Descriptor keys in resolution order.
pub const RAW_VALUE: &str = "raw_value";
pub const VALUE: &str = "value";
pub const LABEL: &str = "label";

/// A resolved representation: either a single text or an ordered list of texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// Borrow this value.
    #[must_use]
    pub fn as_field_ref(&self) -> FieldRef<'_> {
        match self {
            Self::Text(text) => FieldRef::Text(text),
            Self::List(items) => FieldRef::List(items),
        }
    }

    /// Convert one descriptor entry. `null` means "not available".
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::List(items.iter().filter_map(scalar_text).collect())),
            Value::Object(map) => {
                // Nested descriptor: collapse it with the same priority.
                let nested = FieldDescriptor::from_map(map);
                nested.resolve().map(FieldRef::into_owned)
            }
            other => scalar_text(other).map(Self::Text),
        }
    }
}

/// Borrowed view of a resolved field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRef<'a> {
    Text(&'a str),
    List(&'a [String]),
}

impl<'a> FieldRef<'a> {
    /// The text itself, or the first element of a list.
    #[must_use]
    pub fn first_text(self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(items) => items.first().map(String::as_str),
        }
    }

    #[must_use]
    pub fn into_owned(self) -> FieldValue {
        match self {
            Self::Text(text) => FieldValue::Text(text.to_owned()),
            Self::List(items) => FieldValue::List(items.to_vec()),
        }
    }
}

/// Structured field carrying up to three alternative representations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub raw_value: Option<FieldValue>,
    pub value: Option<FieldValue>,
    pub label: Option<FieldValue>,
}

impl FieldDescriptor {
    /// Resolve with the `raw_value > value > label` priority.
    #[must_use]
    pub fn resolve(&self) -> Option<FieldRef<'_>> {
        self.resolve_raw()
            .or_else(|| self.label.as_ref().map(FieldValue::as_field_ref))
    }

    /// Resolve with `raw_value > value`, never falling back to the display label.
    #[must_use]
    pub fn resolve_raw(&self) -> Option<FieldRef<'_>> {
        self.raw_value
            .as_ref()
            .or(self.value.as_ref())
            .map(FieldValue::as_field_ref)
    }

    fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            raw_value: map.get(RAW_VALUE).and_then(FieldValue::from_json),
            value: map.get(VALUE).and_then(FieldValue::from_json),
            label: map.get(LABEL).and_then(FieldValue::from_json),
        }
    }
}

/// One bean field, in whichever of the three shapes the CRM sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeanField {
    Scalar(String),
    List(Vec<String>),
    Descriptor(FieldDescriptor),
}

impl BeanField {
    /// Build a field from raw JSON. Returns `None` for `null`, which counts as absent.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Array(items) => Some(Self::List(items.iter().filter_map(scalar_text).collect())),
            Value::Object(map) => Some(Self::Descriptor(FieldDescriptor::from_map(map))),
            other => scalar_text(other).map(Self::Scalar),
        }
    }

    /// Canonical value by `raw_value > value > label`.
    #[must_use]
    pub fn resolve(&self) -> Option<FieldRef<'_>> {
        match self {
            Self::Scalar(text) => Some(FieldRef::Text(text)),
            Self::List(items) => Some(FieldRef::List(items)),
            Self::Descriptor(descriptor) => descriptor.resolve(),
        }
    }

    /// Canonical value ignoring descriptor labels.
    #[must_use]
    pub fn resolve_raw(&self) -> Option<FieldRef<'_>> {
        match self {
            Self::Descriptor(descriptor) => descriptor.resolve_raw(),
            other => other.resolve(),
        }
    }
}

/// Text form of a scalar JSON value; objects collapse through descriptor priority.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Object(map) => FieldDescriptor::from_map(map)
            .resolve()
            .and_then(FieldRef::first_text)
            .map(str::to_owned),
        Value::Null | Value::Array(_) => None,
    }
}
