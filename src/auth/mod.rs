mod logout;
mod page;
mod submit;

use axum::{
    Router,
    routing::{get, post},
};
use serde_json::json;

use crate::firebase::{Firestore, string_value};
use crate::roster::{self, RosterEntry};
use crate::session::CurrentUser;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(page::auth_page))
        .route("/login", post(submit::login))
        .route("/register", post(submit::register))
        .route("/logout", get(logout::logout))
}

/// Session-store side effect when an identity becomes authenticated: mirror
/// it into the roster collection. Best-effort, one shot: failures are
/// logged to the diagnostic channel, never surfaced, never retried.
///
/// The record is built from the identity the sign-in response delivered, so
/// a half-populated identity skips the write instead of dereferencing
/// missing fields.
pub(crate) async fn upsert_roster_entry(firestore: &Firestore, user: &CurrentUser) {
    let Some(entry) = RosterEntry::for_user(user) else {
        tracing::warn!("sign-in delivered an unpopulated identity, skipping roster upsert");
        return;
    };

    let fields = json!({
        "uid": string_value(&entry.uid),
        "displayName": string_value(&entry.display_name),
        "photoURL": string_value(&entry.photo_url),
    });
    if let Err(err) = firestore
        .upsert(&user.id_token, roster::COLLECTION, &entry.id, fields)
        .await
    {
        tracing::warn!("roster upsert for {} failed: {err}", entry.id);
    }
}
