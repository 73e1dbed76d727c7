//! Clients for the backing services everything is delegated to: credential
//! identity, document store, and binary object storage. Each is constructed
//! once at startup from [`crate::AppConfig`] and a shared HTTP client, then
//! handed to handlers through axum state.

mod firestore;
mod identity;
mod storage;

pub use firestore::{Firestore, FirestoreError, doc_id, str_field, string_value, time_field};
pub use identity::{CredentialError, Identity, IdentityError, Profile, SignedIn};
pub use storage::{Storage, StorageError};
