//! Presence/roster synchronizer.
//!
//! Independent of the message feed: a second poller mirrors the `users`
//! collection and publishes it wholesale. Read-only on this side; the only
//! write path is the best-effort upsert when a sign-in completes.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::watch;

use crate::firebase::{self, Firestore};
use crate::session::CurrentUser;
use crate::sync::{self, Snapshot};

pub const COLLECTION: &str = "users";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: String,
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

impl RosterEntry {
    pub(crate) fn from_document(doc: &Value) -> Option<RosterEntry> {
        let id = firebase::doc_id(doc)?.to_owned();
        Some(RosterEntry {
            uid: firebase::str_field(doc, "uid").unwrap_or_else(|| id.clone()),
            id,
            display_name: firebase::str_field(doc, "displayName")
                .unwrap_or_else(|| "Anonymous".to_owned()),
            photo_url: firebase::str_field(doc, "photoURL").unwrap_or_default(),
        })
    }

    /// Roster record for a freshly signed-in identity. `None` when the
    /// identity is not populated enough to write a usable record; callers
    /// skip the upsert instead of writing a broken document.
    pub fn for_user(user: &CurrentUser) -> Option<RosterEntry> {
        if user.uid.is_empty() {
            return None;
        }
        Some(RosterEntry {
            id: user.uid.clone(),
            uid: user.uid.clone(),
            display_name: user.display_name_or_anon().to_owned(),
            photo_url: user.photo_url_or_empty().to_owned(),
        })
    }
}

#[derive(Clone)]
pub struct Roster(pub watch::Receiver<Snapshot<RosterEntry>>);

pub fn spawn(firestore: Firestore, interval: Duration) -> Roster {
    Roster(sync::spawn_snapshots("roster", interval, move || {
        let firestore = firestore.clone();
        async move { list(&firestore).await }
    }))
}

async fn list(firestore: &Firestore) -> anyhow::Result<Vec<RosterEntry>> {
    let docs = firestore.run_query(COLLECTION, None).await?;
    Ok(docs.iter().filter_map(RosterEntry::from_document).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(uid: &str, name: Option<&str>) -> CurrentUser {
        CurrentUser {
            uid: uid.to_owned(),
            email: "a@b.com".to_owned(),
            display_name: name.map(str::to_owned),
            photo_url: None,
            id_token: "tok".to_owned(),
        }
    }

    #[test]
    fn populated_identity_yields_a_roster_record() {
        let entry = RosterEntry::for_user(&user("u1", Some("Nurse Alice"))).unwrap();
        assert_eq!(entry.id, "u1");
        assert_eq!(entry.display_name, "Nurse Alice");
        assert_eq!(entry.photo_url, "");
    }

    #[test]
    fn unpopulated_identity_skips_the_upsert() {
        assert!(RosterEntry::for_user(&user("", Some("ghost"))).is_none());
    }

    #[test]
    fn missing_profile_fields_fall_back_to_defaults() {
        let entry = RosterEntry::for_user(&user("u2", None)).unwrap();
        assert_eq!(entry.display_name, "Anonymous");
    }
}
