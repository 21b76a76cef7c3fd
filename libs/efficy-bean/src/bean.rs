//! The bean record and its typed accessors.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::entities::decode_entities;
use crate::field::{BeanField, FieldRef, FieldValue};
use crate::ids::push_ids;
use crate::number::parse_locale_number;

/// Keys under which the CRM wraps record collections.
const ENVELOPE_KEYS: [&str; 5] = ["data", "items", "result", "records", "beans"];

/// A CRM record: field name to field, in any of the three shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bean {
    fields: BTreeMap<String, BeanField>,
}

impl Bean {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bean from a JSON object. `null` fields are treated as absent.
    #[must_use]
    pub fn from_json_object(map: &Map<String, Value>) -> Self {
        let fields = map
            .iter()
            .filter_map(|(key, value)| BeanField::from_json(value).map(|f| (key.clone(), f)))
            .collect();
        Self { fields }
    }

    /// Build a bean from any JSON value; only objects are beans.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        value.as_object().map(Self::from_json_object)
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, field: BeanField) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&BeanField> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical value of `key` by `raw_value > value > label`, `None` when absent.
    #[must_use]
    pub fn read_scalar(&self, key: &str) -> Option<FieldRef<'_>> {
        self.fields.get(key).and_then(BeanField::resolve)
    }

    /// Display text of `key`, entity-decoded. Lists yield their first element.
    #[must_use]
    pub fn read_text(&self, key: &str) -> String {
        text_of(self.read_scalar(key))
    }

    /// Like [`read_text`](Self::read_text) but never falls back to a descriptor label.
    ///
    /// Use this for ids that must round-trip into an update: a translated label is
    /// never a valid id.
    #[must_use]
    pub fn read_raw_text(&self, key: &str) -> String {
        text_of(self.fields.get(key).and_then(BeanField::resolve_raw))
    }

    /// Display label of `key`: a descriptor's own `label` when it has one, otherwise
    /// the same as [`read_text`](Self::read_text).
    #[must_use]
    pub fn read_label(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(BeanField::Descriptor(descriptor)) if descriptor.label.is_some() => {
                text_of(descriptor.label.as_ref().map(FieldValue::as_field_ref))
            }
            _ => self.read_text(key),
        }
    }

    /// A descriptor's own `label` only; empty for plain values.
    ///
    /// Fits lookups where a bare value is an id and only a descriptor carries the name.
    #[must_use]
    pub fn read_descriptor_label(&self, key: &str) -> String {
        match self.fields.get(key) {
            Some(BeanField::Descriptor(descriptor)) => {
                text_of(descriptor.label.as_ref().map(FieldValue::as_field_ref))
            }
            _ => String::new(),
        }
    }

    /// Identifiers held by `key`, split, unwrapped, de-duplicated, in order.
    #[must_use]
    pub fn read_id_list(&self, key: &str) -> Vec<String> {
        let mut ids = Vec::new();
        match self.read_scalar(key) {
            Some(FieldRef::Text(text)) => push_ids(&mut ids, text),
            Some(FieldRef::List(items)) => {
                for item in items {
                    push_ids(&mut ids, item);
                }
            }
            None => {}
        }
        ids
    }

    /// Numeric value of `key`, parsed locale-agnostically; `0.0` when missing or garbage.
    #[must_use]
    pub fn read_number(&self, key: &str) -> f64 {
        self.read_scalar(key)
            .and_then(FieldRef::first_text)
            .map_or(0.0, parse_locale_number)
    }

    /// Collect the beans of a CRM response.
    ///
    /// Accepts a bare array of records, a single record, or either of those wrapped under
    /// one of the usual envelope keys (`data`, `items`, `result`, ...). A scalar under such
    /// a key is an ordinary field, not an envelope.
    #[must_use]
    pub fn list_from_response(body: &Value) -> Vec<Self> {
        match body {
            Value::Array(items) => items.iter().filter_map(Self::from_json).collect(),
            Value::Object(map) => {
                let envelope = ENVELOPE_KEYS
                    .iter()
                    .filter_map(|key| map.get(*key))
                    .find(|inner| inner.is_array() || inner.is_object());
                match envelope {
                    Some(inner) => Self::list_from_response(inner),
                    None => vec![Self::from_json_object(map)],
                }
            }
            _ => Vec::new(),
        }
    }

    /// Every occurrence of field `key` in a response, depth first.
    /// `null` occurrences are skipped.
    #[must_use]
    pub fn find_fields(body: &Value, key: &str) -> Vec<BeanField> {
        let mut found = Vec::new();
        collect_fields(body, key, &mut found);
        found
    }
}

impl<'de> Deserialize<'de> for Bean {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        Ok(Self::from_json_object(&map))
    }
}

fn collect_fields(body: &Value, key: &str, found: &mut Vec<BeanField>) {
    match body {
        Value::Object(map) => {
            for (name, value) in map {
                if name == key {
                    found.extend(BeanField::from_json(value));
                } else {
                    collect_fields(value, key, found);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_fields(item, key, found);
            }
        }
        _ => {}
    }
}

fn text_of(field: Option<FieldRef<'_>>) -> String {
    field
        .and_then(FieldRef::first_text)
        .map(|text| decode_entities(text).into_owned())
        .unwrap_or_default()
}
