use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::firebase::{Firestore, string_value};
use crate::session::CurrentUser;
use crate::{AppResult, feed};

/// Composer input as it arrives over the websocket.
#[derive(Debug, Deserialize)]
pub(crate) struct ComposerInput {
    pub text: String,
}

/// An outgoing message: raw text plus the sender's profile snapshot taken
/// at call time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Draft {
    pub text: String,
    pub uid: String,
    pub display_name: String,
    pub photo_url: String,
}

/// `None` when the text trims to nothing; sending is then a no-op and no
/// record is appended.
pub(crate) fn draft(user: &CurrentUser, text: &str) -> Option<Draft> {
    if text.trim().is_empty() {
        return None;
    }
    Some(Draft {
        text: text.to_owned(),
        uid: user.uid.clone(),
        display_name: user.display_name_or_anon().to_owned(),
        photo_url: user.photo_url_or_empty().to_owned(),
    })
}

fn fields(draft: &Draft) -> Value {
    json!({
        "text": string_value(&draft.text),
        "uid": string_value(&draft.uid),
        "displayName": string_value(&draft.display_name),
        "photoURL": string_value(&draft.photo_url),
    })
}

/// Append exactly one message record upstream. `createdAt` is assigned by
/// the store; the new message reaches this client again only through the
/// feed synchronizer's next snapshot.
pub(crate) async fn send_message(
    firestore: &Firestore,
    user: &CurrentUser,
    input: ComposerInput,
) -> AppResult<()> {
    let Some(draft) = draft(user, &input.text) else {
        return Ok(());
    };

    let id = Uuid::now_v7().to_string();
    firestore
        .insert_with_server_time(&user.id_token, feed::COLLECTION, &id, fields(&draft), "createdAt")
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> CurrentUser {
        CurrentUser {
            uid: "u1".to_owned(),
            email: "a@b.com".to_owned(),
            display_name: Some("Nurse Alice".to_owned()),
            photo_url: Some("https://example.com/alice.png".to_owned()),
            id_token: "tok".to_owned(),
        }
    }

    #[test]
    fn whitespace_only_input_is_a_no_op() {
        assert_eq!(draft(&user(), ""), None);
        assert_eq!(draft(&user(), "   \t\n"), None);
    }

    #[test]
    fn non_empty_input_snapshots_the_sender() {
        let draft = draft(&user(), "hello 💚").unwrap();
        assert_eq!(draft.text, "hello 💚");
        assert_eq!(draft.uid, "u1");
        assert_eq!(draft.display_name, "Nurse Alice");
        assert_eq!(draft.photo_url, "https://example.com/alice.png");
    }

    #[test]
    fn unset_profile_fields_denormalize_as_defaults() {
        let mut sender = user();
        sender.display_name = None;
        sender.photo_url = None;
        let draft = draft(&sender, "hi").unwrap();
        assert_eq!(draft.display_name, "Anonymous");
        assert_eq!(draft.photo_url, "");
    }

    #[test]
    fn drafts_keep_surrounding_whitespace_once_non_empty() {
        // Only the emptiness check trims; the stored text is what was typed.
        let draft = draft(&user(), "  hi  ").unwrap();
        assert_eq!(draft.text, "  hi  ");
    }
}
