use axum::{Form, debug_handler, extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;

use crate::firebase::Identity;
use crate::session;
use crate::{AppResult, AppState};

#[derive(Deserialize)]
pub(crate) struct NameForm {
    name: String,
}

/// Display names in this room carry a fixed "Nurse" prefix. Input without
/// it gets the prefix prepended; input that already has it (any casing) is
/// left untouched, so the operation is idempotent.
pub(crate) fn normalize_display_name(name: &str) -> String {
    let name = name.trim();
    if name.to_lowercase().starts_with("nurse ") {
        name.to_owned()
    } else {
        format!("Nurse {name}")
    }
}

#[debug_handler(state = AppState)]
pub(crate) async fn set_display_name(
    State(identity): State<Identity>,
    session: Session,
    Form(NameForm { name }): Form<NameForm>,
) -> AppResult<Redirect> {
    let Some(mut user) = session::current_user(&session).await? else {
        return Ok(Redirect::to("/"));
    };

    if name.trim().is_empty() {
        return Ok(Redirect::to("/chat"));
    }

    let name = normalize_display_name(&name);
    match identity
        .update_profile(&user.id_token, Some(&name), None)
        .await
    {
        Ok(()) => {
            user.display_name = Some(name);
            session::store_user(&session, &user).await?;
        }
        Err(err) => tracing::error!("error setting display name: {err}"),
    }

    Ok(Redirect::to("/chat"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_names_get_the_prefix() {
        assert_eq!(normalize_display_name("alice"), "Nurse alice");
    }

    #[test]
    fn prefixed_names_pass_through_unchanged() {
        assert_eq!(normalize_display_name("Nurse Alice"), "Nurse Alice");
    }

    #[test]
    fn the_prefix_check_is_case_insensitive() {
        assert_eq!(normalize_display_name("nurse bob"), "nurse bob");
        assert_eq!(normalize_display_name("NURSE Carol"), "NURSE Carol");
    }

    #[test]
    fn surrounding_whitespace_is_trimmed_first() {
        assert_eq!(normalize_display_name("  alice  "), "Nurse alice");
        assert_eq!(normalize_display_name("  Nurse Alice"), "Nurse Alice");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_display_name("dana");
        assert_eq!(normalize_display_name(&once), once);
    }
}
