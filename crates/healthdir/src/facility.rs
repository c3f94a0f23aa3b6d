//! Facility records and the documents they are built from.
//!
//! A store hands back [`Document`]s: an opaque id plus a JSON field map.
//! [`FacilityRecord::from_document`] merges the two into the typed record the
//! rest of the crate works with. Malformed fields never fail the conversion;
//! each one falls back to "absent".

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fallback shown when a facility has no address.
pub const ADDRESS_FALLBACK: &str = "Não informado";

/// Fallback shown when a facility has no opening hours.
pub const HOURS_FALLBACK: &str = "Verificar localmente";

/// Fallback shown when a facility has no phone number.
pub const PHONE_FALLBACK: &str = "Sem telefone de contato";

/// Field keys as stored in the facility collection.
pub mod keys {
    /// Display name.
    pub const NAME: &str = "nome";
    /// Unit classification (UBS, UPA, ...).
    pub const UNIT_TYPE: &str = "tipo_unidade";
    /// Neighborhood.
    pub const NEIGHBORHOOD: &str = "bairro";
    /// Street address.
    pub const ADDRESS: &str = "endereco";
    /// Opening hours.
    pub const OPENING_HOURS: &str = "horario_funcionamento";
    /// Contact phone.
    pub const PHONE: &str = "telefone";
    /// Offered services.
    pub const SERVICES: &str = "servicos";
}

/// A raw document as returned by a [`DocumentStore`](crate::store::DocumentStore).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Identifier assigned by the store.
    pub id: String,
    /// Field payload.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Create a document from an id and a field map.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Compute a stable BLAKE3 hash of the field payload.
    ///
    /// `serde_json::Map` keeps keys sorted, so equal payloads hash equally
    /// regardless of the order they arrived in.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let payload = Value::Object(self.fields.clone()).to_string();
        blake3::hash(payload.as_bytes()).to_hex().to_string()
    }
}

/// One health unit in the directory.
///
/// Records are immutable once loaded; a reload replaces the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    /// Opaque identifier assigned by the store.
    pub id: String,
    /// Display name. Empty when the document has none.
    #[serde(rename = "nome")]
    pub name: String,
    /// Unit classification.
    #[serde(rename = "tipo_unidade", skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    /// Neighborhood the unit is in.
    #[serde(rename = "bairro", skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Street address.
    #[serde(rename = "endereco", skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Opening hours.
    #[serde(
        rename = "horario_funcionamento",
        skip_serializing_if = "Option::is_none"
    )]
    pub opening_hours: Option<String>,
    /// Contact phone.
    #[serde(rename = "telefone", skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Offered services, in stored order.
    #[serde(rename = "servicos", default)]
    pub services: Vec<String>,
}

impl FacilityRecord {
    /// Build a record from a store document.
    ///
    /// The record's id is always the store-assigned id; an `"id"` key in the
    /// payload is ignored.
    #[must_use]
    pub fn from_document(document: Document) -> Self {
        let Document { id, fields } = document;
        let text = |key: &str| fields.get(key).and_then(scalar_text);

        Self {
            name: text(keys::NAME).unwrap_or_default(),
            unit_type: text(keys::UNIT_TYPE),
            neighborhood: text(keys::NEIGHBORHOOD),
            address: text(keys::ADDRESS),
            opening_hours: text(keys::OPENING_HOURS),
            phone: text(keys::PHONE),
            services: fields
                .get(keys::SERVICES)
                .map(service_list)
                .unwrap_or_default(),
            id,
        }
    }

    /// Address, or its fallback when missing or blank.
    #[must_use]
    pub fn address_or_fallback(&self) -> &str {
        non_empty(self.address.as_deref()).unwrap_or(ADDRESS_FALLBACK)
    }

    /// Opening hours, or their fallback when missing or blank.
    #[must_use]
    pub fn opening_hours_or_fallback(&self) -> &str {
        non_empty(self.opening_hours.as_deref()).unwrap_or(HOURS_FALLBACK)
    }

    /// Phone, or its fallback when missing or blank.
    #[must_use]
    pub fn phone_or_fallback(&self) -> &str {
        non_empty(self.phone.as_deref()).unwrap_or(PHONE_FALLBACK)
    }

    /// Unit type, empty when absent.
    #[must_use]
    pub fn unit_type(&self) -> &str {
        self.unit_type.as_deref().unwrap_or_default()
    }

    /// Neighborhood, empty when absent.
    #[must_use]
    pub fn neighborhood(&self) -> &str {
        self.neighborhood.as_deref().unwrap_or_default()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Text form of a scalar JSON value. Containers and null count as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Services list. A non-array value means "no services".
fn service_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        _ => Vec::new(),
    }
}
