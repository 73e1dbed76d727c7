use axum::{
    debug_handler,
    extract::{Multipart, State},
    response::Redirect,
};
use tower_sessions::Session;

use crate::firebase::{Identity, Storage};
use crate::session;
use crate::{AppResult, AppState};

/// Upload a profile image, resolve its public URL, and point the identity's
/// photoURL at it. Two independent single-shot calls: if the profile update
/// fails after a successful upload the object stays behind, but the object
/// name is per-identity so the next successful attempt overwrites it.
#[debug_handler(state = AppState)]
pub(crate) async fn set_profile_image(
    State(identity): State<Identity>,
    State(storage): State<Storage>,
    session: Session,
    mut multipart: Multipart,
) -> AppResult<Redirect> {
    let Some(mut user) = session::current_user(&session).await? else {
        return Ok(Redirect::to("/"));
    };

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("image") {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await?;
            upload = Some((content_type, bytes.to_vec()));
            break;
        }
    }

    let Some((content_type, bytes)) = upload else {
        return Ok(Redirect::to("/chat"));
    };
    if bytes.is_empty() {
        return Ok(Redirect::to("/chat"));
    }

    let object = format!("profileImages/{}", user.uid);
    match storage.put(&user.id_token, &object, &content_type, bytes).await {
        Ok(photo_url) => {
            match identity
                .update_profile(&user.id_token, None, Some(&photo_url))
                .await
            {
                Ok(()) => {
                    user.photo_url = Some(photo_url);
                    session::store_user(&session, &user).await?;
                }
                Err(err) => tracing::error!("error updating profile photo: {err}"),
            }
        }
        Err(err) => tracing::error!("error uploading profile image: {err}"),
    }

    Ok(Redirect::to("/chat"))
}
