use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::AppResult;

pub const CURRENT_USER: &str = "current_user";

/// The authenticated identity held by the session store.
///
/// `id_token` is the bearer capability for writes against the backing
/// services; `display_name` and `photo_url` are the profile snapshot used
/// to denormalize outgoing messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub id_token: String,
}

impl CurrentUser {
    pub fn display_name_or_anon(&self) -> &str {
        self.display_name.as_deref().unwrap_or("Anonymous")
    }

    pub fn photo_url_or_empty(&self) -> &str {
        self.photo_url.as_deref().unwrap_or("")
    }
}

pub async fn current_user(session: &Session) -> AppResult<Option<CurrentUser>> {
    Ok(session.get::<CurrentUser>(CURRENT_USER).await?)
}

pub async fn store_user(session: &Session, user: &CurrentUser) -> AppResult<()> {
    session.insert(CURRENT_USER, user).await?;
    Ok(())
}
