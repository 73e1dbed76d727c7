pub mod appresult;
pub mod auth;
pub mod chat;
pub mod config;
pub mod feed;
pub mod firebase;
pub mod profile;
pub mod res;
pub mod roster;
pub mod session;
pub mod sync;

use anyhow::anyhow;
use axum::extract::FromRef;
use serde_json::Value;

pub use appresult::{AppError, AppResult};
pub use config::AppConfig;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub identity: firebase::Identity,
    pub firestore: firebase::Firestore,
    pub storage: firebase::Storage,
    pub feed: feed::Feed,
    pub roster: roster::Roster,
}

pub trait GetField {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String>;
    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value>;
}

impl GetField for serde_json::Value {
    fn get_str_field(&self, field: &str) -> anyhow::Result<String> {
        Ok(
            self.get(field)
            .ok_or_else(|| anyhow!("expected {field} in response"))?
            .as_str()
            .ok_or_else(|| anyhow!("expected {field} in response to be a string"))?
            .to_owned()
        )
    }

    fn get_obj_field(&self, field: &str) -> anyhow::Result<&Value> {
        self.get(field)
        .ok_or_else(|| anyhow!("expected {field} in response"))
    }
}
