use serde::Deserialize;
use thiserror::Error;

use crate::AppConfig;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object store transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("object store returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("upload for {object} came back without a download token")]
    NoDownloadToken { object: String },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Object store client (Firebase Storage REST).
#[derive(Clone)]
pub struct Storage {
    http: reqwest::Client,
    bucket: String,
}

impl Storage {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Storage {
        Storage {
            http,
            bucket: config.storage_bucket.clone(),
        }
    }

    /// Upload `bytes` under `object` (overwriting any previous version) and
    /// return the tokened public download URL.
    pub async fn put(
        &self,
        id_token: &str,
        object: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, StorageError> {
        let url = format!("https://firebasestorage.googleapis.com/v0/b/{}/o", self.bucket);
        let response = self
            .http
            .post(url)
            .query(&[("name", object)])
            .header("Authorization", format!("Firebase {id_token}"))
            .header("Content-Type", content_type)
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = response.json().await?;
        let token = uploaded
            .download_tokens
            .and_then(|tokens| tokens.split(',').next().map(str::to_owned))
            .ok_or_else(|| StorageError::NoDownloadToken {
                object: object.to_owned(),
            })?;

        Ok(self.download_url(object, &token))
    }

    fn download_url(&self, object: &str, token: &str) -> String {
        // Object names are our own (`profileImages/{uid}`), so escaping the
        // path separator is the only encoding needed.
        let encoded = object.replace('/', "%2F");
        format!(
            "https://firebasestorage.googleapis.com/v0/b/{}/o/{encoded}?alt=media&token={token}",
            self.bucket
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn download_url_escapes_the_object_path() {
        let storage = Storage {
            http: reqwest::Client::new(),
            bucket: "demo.firebasestorage.app".to_owned(),
        };
        assert_eq!(
            storage.download_url("profileImages/u123", "tok-1"),
            "https://firebasestorage.googleapis.com/v0/b/demo.firebasestorage.app/o/profileImages%2Fu123?alt=media&token=tok-1"
        );
    }
}
