use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{AppConfig, GetField};

/// Credential failures from the identity service's fixed code set.
///
/// Codes sometimes arrive with a trailing explanation
/// (`"WEAK_PASSWORD : Password should be at least 6 characters"`), so only
/// the leading token is matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    WrongPassword,
    UserNotFound,
    InvalidEmail,
    EmailInUse,
    WeakPassword,
    InvalidCredential,
    Unrecognized(String),
}

impl CredentialError {
    pub fn from_code(raw: &str) -> CredentialError {
        use CredentialError::*;
        let code = raw.split([' ', ':']).next().unwrap_or(raw);
        match code {
            "INVALID_PASSWORD" => WrongPassword,
            "EMAIL_NOT_FOUND" => UserNotFound,
            "INVALID_EMAIL" => InvalidEmail,
            "EMAIL_EXISTS" => EmailInUse,
            "WEAK_PASSWORD" => WeakPassword,
            "INVALID_LOGIN_CREDENTIALS" => InvalidCredential,
            other => Unrecognized(other.to_owned()),
        }
    }

    /// The message shown on the auth screen.
    pub fn friendly_message(&self) -> &'static str {
        use CredentialError::*;
        match self {
            WrongPassword => "Incorrect password. Please try again.",
            UserNotFound => "No user found with this email.",
            InvalidEmail => "Invalid email address.",
            EmailInUse => "This email is already registered.",
            WeakPassword => "Password should be at least 6 characters.",
            InvalidCredential => "Invalid Credentials. Please check your credentials.",
            Unrecognized(_) => "An unexpected error occurred. Please try again later.",
        }
    }
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("credential rejected: {0:?}")]
    Credential(CredentialError),
    #[error("identity transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed identity response: {0}")]
    Malformed(String),
}

/// Result of `accounts:signUp` / `accounts:signInWithPassword`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedIn {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    pub id_token: String,
}

/// One record from `accounts:lookup`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub local_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub photo_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupResponse {
    #[serde(default)]
    users: Vec<Profile>,
}

/// Identity service client (Firebase Auth REST).
#[derive(Clone)]
pub struct Identity {
    http: reqwest::Client,
    api_key: String,
}

impl Identity {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Identity {
        Identity {
            http,
            api_key: config.api_key.clone(),
        }
    }

    fn endpoint(&self, op: &str) -> String {
        format!(
            "https://identitytoolkit.googleapis.com/v1/accounts:{op}?key={}",
            self.api_key
        )
    }

    pub async fn create_account(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, IdentityError> {
        let body = self
            .call(
                "signUp",
                &CredentialRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        decode(body)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        let body = self
            .call(
                "signInWithPassword",
                &CredentialRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        decode(body)
    }

    /// Fetch the caller's profile record, when the service knows one.
    pub async fn lookup(&self, id_token: &str) -> Result<Option<Profile>, IdentityError> {
        let body = self.call("lookup", &LookupRequest { id_token }).await?;
        let response: LookupResponse = decode(body)?;
        Ok(response.users.into_iter().next())
    }

    /// Push a profile mutation. Unset fields are left untouched upstream.
    pub async fn update_profile(
        &self,
        id_token: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> Result<(), IdentityError> {
        self.call(
            "update",
            &UpdateRequest {
                id_token,
                display_name,
                photo_url,
                return_secure_token: false,
            },
        )
        .await?;
        Ok(())
    }

    async fn call(&self, op: &str, request: &impl Serialize) -> Result<Value, IdentityError> {
        let response = self
            .http
            .post(self.endpoint(op))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        match body
            .get_obj_field("error")
            .and_then(|err| err.get_str_field("message"))
        {
            Ok(code) => Err(IdentityError::Credential(CredentialError::from_code(&code))),
            Err(_) => Err(IdentityError::Malformed(format!(
                "{op} failed with status {status} and no error code"
            ))),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T, IdentityError> {
    serde_json::from_value(body).map_err(|err| IdentityError::Malformed(err.to_string()))
}
