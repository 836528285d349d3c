//! Typed record model for platform entities.
//!
//! A `Record` is an attribute bag keyed by logical attribute name. The
//! platform distinguishes three states per attribute: never provided
//! (absent key), explicitly null, and a typed value. `AttributeValue::Null`
//! keeps the middle state representable; the qualification mapper relies
//! on "absent" meaning "do not touch this column on write".

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A pointer to a record: logical entity name plus unique id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    pub logical_name: String,
    pub id: Uuid,
}

impl EntityReference {
    pub fn new(logical_name: impl Into<String>, id: Uuid) -> Self {
        Self {
            logical_name: logical_name.into(),
            id,
        }
    }
}

/// An entity-and-field-scoped option choice. The raw code is only meaningful
/// for the (entity, attribute) pair it was read from; codes are not
/// comparable across entities without stringmap reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionValue(pub i32);

/// One attribute slot in a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    DateTime(DateTime<Utc>),
    Reference(EntityReference),
    Option(OptionValue),
    /// Explicit null: present on the wire, carries no value.
    Null,
}

impl AttributeValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

/// A typed, uniquely identified business record.
///
/// `attributes` holds the data columns; `formatted` holds the display labels
/// the platform returns alongside raw values (option labels, lookup names).
/// Labels are carried separately because reconciliation matches on them
/// while writes only ever send raw values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub logical_name: String,
    pub id: Option<Uuid>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    formatted: BTreeMap<String, String>,
}

impl Record {
    pub fn new(logical_name: impl Into<String>) -> Self {
        Self {
            logical_name: logical_name.into(),
            id: None,
            attributes: BTreeMap::new(),
            formatted: BTreeMap::new(),
        }
    }

    pub fn with_id(logical_name: impl Into<String>, id: Uuid) -> Self {
        let mut record = Self::new(logical_name);
        record.id = Some(id);
        record
    }

    /// Reference to this record, when it has an id.
    pub fn reference(&self) -> Option<EntityReference> {
        self.id
            .map(|id| EntityReference::new(self.logical_name.clone(), id))
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    /// Store the display label the platform reported for an attribute.
    pub fn set_formatted(&mut self, name: impl Into<String>, label: impl Into<String>) {
        self.formatted.insert(name.into(), label.into());
    }

    /// Raw slot lookup. `None` means the attribute is absent, which is not
    /// the same as `Some(&AttributeValue::Null)`.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Like `get`, but treats an explicit null as no value.
    pub fn value(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn formatted(&self, name: &str) -> Option<&str> {
        self.formatted.get(name).map(String::as_str)
    }

    pub fn get_string(&self, name: &str) -> Option<&str> {
        match self.value(name)? {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_reference(&self, name: &str) -> Option<EntityReference> {
        match self.value(name)? {
            AttributeValue::Reference(r) => Some(r.clone()),
            _ => None,
        }
    }

    /// Option-set accessor. Accepts a plain integer slot as well: the wire
    /// format carries option codes as bare numbers, so a record hydrated
    /// from JSON may not have the `Option` tag. An integer outside the
    /// option-code range reads as absent rather than a wrapped value.
    pub fn get_option(&self, name: &str) -> Option<OptionValue> {
        match self.value(name)? {
            AttributeValue::Option(v) => Some(*v),
            AttributeValue::Integer(n) => i32::try_from(*n).ok().map(OptionValue),
            _ => None,
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
