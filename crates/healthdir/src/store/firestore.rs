//! Cloud Firestore over the REST API.
//!
//! Uses `documents.list` on a collection, following `nextPageToken` until
//! the collection is exhausted. Firestore wraps every value in a type tag
//! (`{"stringValue": "..."}`); [`decode_value`] unwraps those into plain
//! JSON so documents look the same whichever store they came from.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tracing::{debug, trace};

use super::DocumentStore;
use crate::config::FirestoreConfig;
use crate::error::{Error, Result};
use crate::facility::Document;

/// Firestore REST client for one project database.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    base_url: String,
    project_id: String,
    database: String,
    api_key: Option<String>,
    page_size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<RawDocument>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl FirestoreStore {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the project id is missing or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &FirestoreConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::config_validation("firestore.project_id is not set"))?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            project_id,
            database: config.database.clone(),
            api_key: config.api_key.clone(),
            page_size: config.page_size,
        })
    }

    /// URL of a collection's document listing.
    #[must_use]
    pub fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, self.database, collection
        )
    }

    async fn fetch_page(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<ListDocumentsResponse> {
        let mut request = self
            .client
            .get(self.collection_url(collection))
            .query(&[("pageSize", self.page_size.to_string())]);
        if let Some(token) = page_token {
            request = request.query(&[("pageToken", token)]);
        }
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RemoteStatus { status, body });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &'static str {
        "firestore"
    }

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(collection, page_token.as_deref()).await?;
            trace!(count = page.documents.len(), "Fetched Firestore page");
            for raw in page.documents {
                documents.push(decode_document(raw.name, raw.fields)?);
            }
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(collection, count = documents.len(), "Fetched Firestore collection");
        Ok(documents)
    }
}

/// Last path segment of a Firestore resource name.
#[must_use]
pub fn document_id(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

fn decode_document(name: String, fields: Map<String, Value>) -> Result<Document> {
    let id = document_id(&name).to_string();
    let fields = decode_fields(fields).map_err(|e| match e {
        Error::MalformedDocument { id: None, message } => Error::MalformedDocument {
            id: Some(id.clone()),
            message,
        },
        other => other,
    })?;
    Ok(Document::new(id, fields))
}

fn decode_fields(fields: Map<String, Value>) -> Result<Map<String, Value>> {
    fields
        .into_iter()
        .map(|(key, value)| Ok((key, decode_value(value)?)))
        .collect()
}

/// Unwrap a typed Firestore value into plain JSON.
///
/// Integers arrive as strings and become numbers; non-finite doubles have
/// no JSON form and become their string spelling.
///
/// # Errors
///
/// Returns an error for values without a single known type tag.
pub fn decode_value(value: Value) -> Result<Value> {
    let Value::Object(tagged) = value else {
        return Err(Error::malformed(None, "value is not a typed object"));
    };
    let mut entries = tagged.into_iter();
    let (Some((tag, inner)), None) = (entries.next(), entries.next()) else {
        return Err(Error::malformed(None, "expected exactly one type tag"));
    };

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" | "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(inner)
        }
        "integerValue" => decode_integer(&inner),
        "doubleValue" => Ok(decode_double(inner)),
        "geoPointValue" => Ok(inner),
        "arrayValue" => {
            let values = match inner {
                Value::Object(mut array) => array.remove("values"),
                _ => None,
            };
            match values {
                None => Ok(Value::Array(Vec::new())),
                Some(Value::Array(items)) => Ok(Value::Array(
                    items.into_iter().map(decode_value).collect::<Result<_>>()?,
                )),
                Some(_) => Err(Error::malformed(None, "arrayValue.values is not a list")),
            }
        }
        "mapValue" => {
            let fields = match inner {
                Value::Object(mut map) => map.remove("fields"),
                _ => None,
            };
            match fields {
                None => Ok(Value::Object(Map::new())),
                Some(Value::Object(fields)) => Ok(Value::Object(decode_fields(fields)?)),
                Some(_) => Err(Error::malformed(None, "mapValue.fields is not an object")),
            }
        }
        other => Err(Error::malformed(None, format!("unknown value type {other:?}"))),
    }
}

fn decode_integer(inner: &Value) -> Result<Value> {
    let parsed = match inner {
        Value::String(s) => s.parse::<i64>().ok(),
        Value::Number(n) => n.as_i64(),
        _ => None,
    };
    parsed
        .map(|n| Value::Number(n.into()))
        .ok_or_else(|| Error::malformed(None, format!("invalid integerValue {inner}")))
}

fn decode_double(inner: Value) -> Value {
    match inner {
        Value::Number(n) => Value::Number(n),
        // "NaN", "Infinity" and "-Infinity" are sent as strings.
        Value::String(s) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map_or(Value::String(s), Value::Number),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store(config: FirestoreConfig) -> FirestoreStore {
        FirestoreStore::from_config(&config).unwrap()
    }

    fn config_with_project() -> FirestoreConfig {
        FirestoreConfig {
            project_id: Some("saude-app".to_string()),
            ..FirestoreConfig::default()
        }
    }

    #[test]
    fn test_from_config_requires_project() {
        let err = FirestoreStore::from_config(&FirestoreConfig::default()).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_from_config_with_timeout() {
        let mut config = config_with_project();
        config.timeout_secs = Some(5);
        assert!(FirestoreStore::from_config(&config).is_ok());
    }

    #[test]
    fn test_collection_url() {
        let mut config = config_with_project();
        config.base_url = "http://localhost:8080/v1/".to_string();
        let store = store(config);

        assert_eq!(
            store.collection_url("unidades_saude"),
            "http://localhost:8080/v1/projects/saude-app/databases/(default)/documents/unidades_saude"
        );
        assert_eq!(store.name(), "firestore");
    }

    #[test]
    fn test_document_id() {
        assert_eq!(
            document_id("projects/p/databases/(default)/documents/unidades_saude/abc123"),
            "abc123"
        );
        assert_eq!(document_id("plain"), "plain");
    }

    #[test]
    fn test_decode_scalars() {
        assert_eq!(decode_value(json!({"stringValue": "UBS"})).unwrap(), json!("UBS"));
        assert_eq!(decode_value(json!({"integerValue": "42"})).unwrap(), json!(42));
        assert_eq!(decode_value(json!({"doubleValue": 1.5})).unwrap(), json!(1.5));
        assert_eq!(decode_value(json!({"booleanValue": true})).unwrap(), json!(true));
        assert_eq!(decode_value(json!({"nullValue": null})).unwrap(), Value::Null);
        assert_eq!(
            decode_value(json!({"timestampValue": "2024-01-15T10:00:00Z"})).unwrap(),
            json!("2024-01-15T10:00:00Z")
        );
    }

    #[test]
    fn test_decode_non_finite_double() {
        assert_eq!(decode_value(json!({"doubleValue": "NaN"})).unwrap(), json!("NaN"));
    }

    #[test]
    fn test_decode_array_and_map() {
        let value = json!({
            "arrayValue": {"values": [
                {"stringValue": "Vacina"},
                {"mapValue": {"fields": {"n": {"integerValue": "1"}}}}
            ]}
        });
        assert_eq!(decode_value(value).unwrap(), json!(["Vacina", {"n": 1}]));

        assert_eq!(decode_value(json!({"arrayValue": {}})).unwrap(), json!([]));
        assert_eq!(decode_value(json!({"mapValue": {}})).unwrap(), json!({}));
    }

    #[test]
    fn test_decode_rejects_unknown_or_ambiguous() {
        assert!(decode_value(json!({"weirdValue": 1})).is_err());
        assert!(decode_value(json!({"stringValue": "a", "integerValue": "1"})).is_err());
        assert!(decode_value(json!("bare")).is_err());
        assert!(decode_value(json!({"integerValue": "x"})).is_err());
    }

    #[test]
    fn test_decode_list_response() {
        let body = json!({
            "documents": [{
                "name": "projects/p/databases/(default)/documents/unidades_saude/ubs-01",
                "fields": {
                    "nome": {"stringValue": "UBS Centro"},
                    "bairro": {"stringValue": "Centro"},
                    "servicos": {"arrayValue": {"values": [{"stringValue": "Vacina"}]}}
                },
                "createTime": "2024-01-01T00:00:00Z"
            }],
            "nextPageToken": "abc"
        });
        let page: ListDocumentsResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));

        let raw = page.documents.into_iter().next().unwrap();
        let doc = decode_document(raw.name, raw.fields).unwrap();
        assert_eq!(doc.id, "ubs-01");
        assert_eq!(doc.fields["nome"], "UBS Centro");
        assert_eq!(doc.fields["servicos"], json!(["Vacina"]));
    }

    #[test]
    fn test_empty_list_response() {
        let page: ListDocumentsResponse = serde_json::from_value(json!({})).unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }

    #[test]
    fn test_decode_document_error_names_document() {
        let fields = match json!({"nome": {"bogus": 1}}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        let err = decode_document("a/b/doc-9".to_string(), fields).unwrap_err();
        assert!(err.to_string().contains("doc-9"));
    }
}
