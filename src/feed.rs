//! Message feed synchronizer.
//!
//! One poller mirrors the ordered `messages` collection; every change is
//! published as a complete ascending-`createdAt` snapshot. Websocket
//! connections forward those snapshots to the chat screen, which re-renders
//! the list wholesale and scrolls to the newest message.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::firebase::{self, Firestore};
use crate::sync::{self, Snapshot};

pub const COLLECTION: &str = "messages";

/// One chat message, exactly as mirrored from the document store. The
/// display name and photo are the sender's snapshot at send time; later
/// profile changes never rewrite them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

impl Message {
    /// Decode one stored document. Rows missing an id or text are dropped;
    /// missing sender fields fall back to the same defaults used at send
    /// time.
    pub(crate) fn from_document(doc: &Value) -> Option<Message> {
        let id = firebase::doc_id(doc)?.to_owned();
        let text = firebase::str_field(doc, "text")?;
        Some(Message {
            id,
            text,
            created_at: firebase::time_field(doc, "createdAt"),
            uid: firebase::str_field(doc, "uid").unwrap_or_default(),
            display_name: firebase::str_field(doc, "displayName")
                .unwrap_or_else(|| "Anonymous".to_owned()),
            photo_url: firebase::str_field(doc, "photoURL").unwrap_or_default(),
        })
    }
}

#[derive(Clone)]
pub struct Feed(pub watch::Receiver<Snapshot<Message>>);

pub fn spawn(firestore: Firestore, interval: Duration) -> Feed {
    Feed(sync::spawn_snapshots("message feed", interval, move || {
        let firestore = firestore.clone();
        async move { list(&firestore).await }
    }))
}

async fn list(firestore: &Firestore) -> anyhow::Result<Vec<Message>> {
    let docs = firestore.run_query(COLLECTION, Some("createdAt")).await?;
    Ok(docs.iter().filter_map(Message::from_document).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, text: &str, at: &str, name: &str) -> Value {
        json!({
            "name": format!("projects/p/databases/(default)/documents/messages/{id}"),
            "fields": {
                "text": { "stringValue": text },
                "createdAt": { "timestampValue": at },
                "uid": { "stringValue": "u1" },
                "displayName": { "stringValue": name },
                "photoURL": { "stringValue": "" },
            }
        })
    }

    #[test]
    fn documents_decode_in_store_order() {
        let docs = vec![
            doc("m1", "hello", "2026-08-08T10:00:00Z", "Nurse Alice"),
            doc("m2", "hi there 👋", "2026-08-08T10:00:05Z", "Nurse Bob"),
        ];
        let messages: Vec<Message> = docs.iter().filter_map(Message::from_document).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].id, "m1");
        assert_eq!(messages[1].text, "hi there 👋");
        assert!(messages[0].created_at < messages[1].created_at);
    }

    #[test]
    fn malformed_documents_are_skipped_not_fatal() {
        let docs = vec![
            json!({ "name": "projects/p/databases/(default)/documents/messages/bad" }),
            doc("m1", "still here", "2026-08-08T10:00:00Z", "Nurse Alice"),
        ];
        let messages: Vec<Message> = docs.iter().filter_map(Message::from_document).collect();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "still here");
    }

    #[test]
    fn missing_sender_fields_use_send_time_defaults() {
        let doc = json!({
            "name": "projects/p/databases/(default)/documents/messages/m9",
            "fields": { "text": { "stringValue": "who am i" } }
        });
        let message = Message::from_document(&doc).unwrap();
        assert_eq!(message.display_name, "Anonymous");
        assert_eq!(message.photo_url, "");
        assert_eq!(message.created_at, None);
    }
}
