use axum::{
    Form, debug_handler,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::firebase::{Firestore, Identity, IdentityError, SignedIn};
use crate::session::{self, CurrentUser};
use crate::{AppResult, AppState};

use super::page;

const GENERIC_ERROR: &str = "An unexpected error occurred. Please try again later.";

#[derive(Deserialize)]
pub(crate) struct Credentials {
    email: String,
    password: String,
}

#[debug_handler(state = AppState)]
pub(crate) async fn login(
    State(identity): State<Identity>,
    State(firestore): State<Firestore>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    let attempt = identity
        .sign_in(&credentials.email, &credentials.password)
        .await;
    finish(attempt, "sign-in", identity, firestore, session, credentials).await
}

#[debug_handler(state = AppState)]
pub(crate) async fn register(
    State(identity): State<Identity>,
    State(firestore): State<Firestore>,
    session: Session,
    Form(credentials): Form<Credentials>,
) -> AppResult<Response> {
    let attempt = identity
        .create_account(&credentials.email, &credentials.password)
        .await;
    finish(attempt, "registration", identity, firestore, session, credentials).await
}

/// Shared tail of both submit paths. One attempt per submit: a credential
/// failure re-renders the form with its mapped message, anything else gets
/// the generic fallback. Success stores the session, fires the roster
/// upsert, and navigates to the chat screen.
async fn finish(
    attempt: Result<SignedIn, IdentityError>,
    op: &'static str,
    identity: Identity,
    firestore: Firestore,
    session: Session,
    credentials: Credentials,
) -> AppResult<Response> {
    let signed_in = match attempt {
        Ok(signed_in) => signed_in,
        Err(IdentityError::Credential(err)) => {
            tracing::info!("{op} rejected: {err:?}");
            return Ok(page::render(Some(err.friendly_message())).into_response());
        }
        Err(err) => {
            tracing::error!("{op} failed: {err}");
            return Ok(page::render(Some(GENERIC_ERROR)).into_response());
        }
    };

    let user = resolve_user(&identity, signed_in, &credentials.email).await;
    session::store_user(&session, &user).await?;
    tracing::info!("welcome {}", user.uid);

    super::upsert_roster_entry(&firestore, &user).await;

    Ok(Redirect::to("/chat").into_response())
}

/// Build the session identity from what the sign-in response itself
/// delivered, enriched with the profile lookup when that succeeds. The
/// lookup is allowed to fail; the response fields are already enough.
async fn resolve_user(identity: &Identity, signed_in: SignedIn, email_hint: &str) -> CurrentUser {
    let mut user = CurrentUser {
        uid: signed_in.local_id,
        email: signed_in.email.unwrap_or_else(|| email_hint.to_owned()),
        display_name: signed_in.display_name,
        photo_url: None,
        id_token: signed_in.id_token,
    };

    match identity.lookup(&user.id_token).await {
        Ok(Some(profile)) => {
            user.display_name = profile.display_name.or(user.display_name);
            user.photo_url = profile.photo_url;
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("profile lookup for {} failed: {err}", user.uid),
    }

    user
}
