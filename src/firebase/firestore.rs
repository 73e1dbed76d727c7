use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use thiserror::Error;

use crate::AppConfig;

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("document store transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("document store returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Document store client (Firestore REST).
///
/// Reads go through [`run_query`](Firestore::run_query) and carry no user
/// credential; writes carry the caller's id token. The store assigns
/// creation timestamps itself via the `REQUEST_TIME` transform, so clients
/// never fabricate message times.
#[derive(Clone)]
pub struct Firestore {
    http: reqwest::Client,
    project_id: String,
    api_key: String,
}

impl Firestore {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Firestore {
        Firestore {
            http,
            project_id: config.project_id.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Resource name prefix, as it appears inside request and response
    /// bodies.
    fn resource_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    /// REST endpoint prefix for the same documents.
    fn doc_root(&self) -> String {
        format!(
            "https://firestore.googleapis.com/v1/{}",
            self.resource_root()
        )
    }

    /// Full-result-set read of one collection, optionally ordered ascending
    /// by a field. Returns the raw document values; callers decode.
    pub async fn run_query(
        &self,
        collection_id: &str,
        order_by: Option<&str>,
    ) -> Result<Vec<Value>, FirestoreError> {
        let mut query = json!({
            "from": [{ "collectionId": collection_id }],
        });
        if let Some(field) = order_by {
            query["orderBy"] = json!([{
                "field": { "fieldPath": field },
                "direction": "ASCENDING",
            }]);
        }

        let rows: Vec<Value> = self
            .post(
                &format!("{}:runQuery", self.doc_root()),
                &json!({ "structuredQuery": query }),
                None,
            )
            .await?;

        // Rows without a document (readTime-only trailers) are dropped here.
        Ok(rows
            .into_iter()
            .filter_map(|mut row| match row.get_mut("document") {
                Some(doc) => Some(doc.take()),
                None => None,
            })
            .collect())
    }

    /// Create `collection_id/{doc_id}` with a server-assigned timestamp in
    /// `time_field`. Fails if the document already exists.
    pub async fn insert_with_server_time(
        &self,
        id_token: &str,
        collection_id: &str,
        doc_id: &str,
        fields: Value,
        time_field: &str,
    ) -> Result<(), FirestoreError> {
        let body = json!({
            "writes": [{
                "update": {
                    "name": format!("{}/{collection_id}/{doc_id}", self.resource_root()),
                    "fields": fields,
                },
                "currentDocument": { "exists": false },
                "updateTransforms": [{
                    "fieldPath": time_field,
                    "setToServerValue": "REQUEST_TIME",
                }],
            }],
        });
        self.post::<Value>(&format!("{}:commit", self.doc_root()), &body, Some(id_token))
            .await?;
        Ok(())
    }

    /// Wholesale upsert of `collection_id/{doc_id}`.
    pub async fn upsert(
        &self,
        id_token: &str,
        collection_id: &str,
        doc_id: &str,
        fields: Value,
    ) -> Result<(), FirestoreError> {
        let url = format!("{}/{collection_id}/{doc_id}", self.doc_root());
        let response = self
            .http
            .patch(url)
            .query(&[("key", self.api_key.as_str())])
            .bearer_auth(id_token)
            .json(&json!({ "fields": fields }))
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &Value,
        id_token: Option<&str>,
    ) -> Result<T, FirestoreError> {
        let mut request = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body);
        if let Some(token) = id_token {
            request = request.bearer_auth(token);
        }
        let response = check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, FirestoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(FirestoreError::Status {
        status: status.as_u16(),
        body,
    })
}

/// Trailing segment of a document's full resource name.
pub fn doc_id(doc: &Value) -> Option<&str> {
    doc.get("name")?.as_str()?.rsplit('/').next()
}

pub fn str_field(doc: &Value, field: &str) -> Option<String> {
    doc.pointer(&format!("/fields/{field}/stringValue"))?
        .as_str()
        .map(str::to_owned)
}

pub fn time_field(doc: &Value, field: &str) -> Option<DateTime<Utc>> {
    let raw = doc.pointer(&format!("/fields/{field}/timestampValue"))?.as_str()?;
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

pub fn string_value(s: &str) -> Value {
    json!({ "stringValue": s })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_id_takes_the_trailing_name_segment() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/messages/0195f"
        });
        assert_eq!(doc_id(&doc), Some("0195f"));
    }

    #[test]
    fn field_helpers_read_typed_values() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/messages/m1",
            "fields": {
                "text": { "stringValue": "hello 🩺" },
                "createdAt": { "timestampValue": "2026-08-08T12:30:00.123456Z" },
            }
        });
        assert_eq!(str_field(&doc, "text").as_deref(), Some("hello 🩺"));
        assert!(time_field(&doc, "createdAt").is_some());
        assert_eq!(str_field(&doc, "uid"), None);
        assert_eq!(time_field(&doc, "text"), None);
    }
}
