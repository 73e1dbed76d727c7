use axum::{
    debug_handler,
    response::{Html, IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::res::html_escape;
use crate::{AppResult, include_res, session};

#[debug_handler]
pub(crate) async fn chat_page(session: Session) -> AppResult<Response> {
    let Some(user) = session::current_user(&session).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let body = include_res!(str, "/pages/chat.html")
        .replace("{uid}", &html_escape(&user.uid))
        .replace(
            "{display_name}",
            &html_escape(user.display_name.as_deref().unwrap_or("")),
        )
        .replace("{email}", &html_escape(&user.email));

    Ok(Html(body).into_response())
}
