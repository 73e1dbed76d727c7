use axum::{
    debug_handler,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message as WsMessage, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use serde::Serialize;
use tokio::sync::watch;

use tower_sessions::Session;

use crate::feed::{Feed, Message};
use crate::firebase::Firestore;
use crate::roster::{Roster, RosterEntry};
use crate::session::{self, CurrentUser};
use crate::sync::Snapshot;
use crate::{AppResult, AppState};

use super::send;

/// Downstream frames: always a complete state snapshot, never a delta.
#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
enum Push<'a> {
    Messages { messages: &'a [Message] },
    Roster { roster: &'a [RosterEntry] },
}

#[debug_handler(state = AppState)]
pub(crate) async fn chat_ws(
    State(firestore): State<Firestore>,
    State(Feed(feed)): State<Feed>,
    State(Roster(roster)): State<Roster>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let Some(user) = session::current_user(&session).await? else {
        return Ok(StatusCode::UNAUTHORIZED.into_response());
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, firestore, feed, roster, user)))
}

/// One connection per open chat screen. Snapshots flow down from the two
/// synchronizers, composer sends flow up; both subscriptions end when the
/// socket does.
async fn handle_socket(
    socket: WebSocket,
    firestore: Firestore,
    mut feed: watch::Receiver<Snapshot<Message>>,
    mut roster: watch::Receiver<Snapshot<RosterEntry>>,
    user: CurrentUser,
) {
    let (mut sender, mut receiver) = socket.split();

    let push_task = tokio::spawn(async move {
        // A fresh screen starts from the current state of both collections.
        let messages = feed.borrow_and_update().clone();
        if push(&mut sender, &Push::Messages { messages: &messages }).await.is_err() {
            return;
        }
        let entries = roster.borrow_and_update().clone();
        if push(&mut sender, &Push::Roster { roster: &entries }).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                changed = feed.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let messages = feed.borrow_and_update().clone();
                    if push(&mut sender, &Push::Messages { messages: &messages }).await.is_err() {
                        break;
                    }
                }
                changed = roster.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let entries = roster.borrow_and_update().clone();
                    if push(&mut sender, &Push::Roster { roster: &entries }).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Composer sends are fire-and-forget from the screen's point of view:
    // a failed insert is logged and the loop keeps accepting input.
    while let Some(Ok(frame)) = receiver.next().await {
        let WsMessage::Text(raw) = frame else {
            continue;
        };
        let Ok(input) = serde_json::from_str::<send::ComposerInput>(&raw) else {
            continue;
        };

        if let Err(err) = send::send_message(&firestore, &user, input).await {
            tracing::error!("error sending message: {:#}", err.0);
        }
    }

    push_task.abort();
}

async fn push(
    sender: &mut SplitSink<WebSocket, WsMessage>,
    update: &Push<'_>,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(update) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!("failed to encode snapshot frame: {err}");
            return Ok(());
        }
    };
    sender.send(WsMessage::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snapshot_frames_are_tagged_by_kind() {
        let messages = vec![Message {
            id: "m1".to_owned(),
            text: "hello".to_owned(),
            created_at: Some(chrono::Utc.with_ymd_and_hms(2026, 8, 8, 10, 0, 0).unwrap()),
            uid: "u1".to_owned(),
            display_name: "Nurse Alice".to_owned(),
            photo_url: "".to_owned(),
        }];
        let frame = serde_json::to_value(Push::Messages { messages: &messages }).unwrap();
        assert_eq!(frame["kind"], "messages");
        assert_eq!(frame["messages"][0]["displayName"], "Nurse Alice");
        assert_eq!(frame["messages"][0]["photoUrl"], "");

        let frame = serde_json::to_value(Push::Roster { roster: &[] }).unwrap();
        assert_eq!(frame["kind"], "roster");
        assert_eq!(frame["roster"].as_array().unwrap().len(), 0);
    }
}
