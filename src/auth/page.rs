use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::{AppResult, include_res, session};

/// Render the auth screen, optionally with a credential error banner. The
/// sign-in / registration mode toggle is client-side.
pub(crate) fn render(error: Option<&str>) -> Html<String> {
    Html(include_res!(str, "/pages/auth.html").replace("{error}", error.unwrap_or("")))
}

#[debug_handler]
pub(crate) async fn auth_page(session: Session) -> AppResult<Response> {
    if session::current_user(&session).await?.is_some() {
        return Ok(Redirect::to("/chat").into_response());
    }

    Ok(render(None).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_banner_is_substituted_into_the_page() {
        let Html(page) = render(Some("No user found with this email."));
        assert!(page.contains("No user found with this email."));
        assert!(!page.contains("{error}"));
    }

    #[test]
    fn clean_render_has_an_empty_banner() {
        let Html(page) = render(None);
        assert!(!page.contains("{error}"));
    }
}
