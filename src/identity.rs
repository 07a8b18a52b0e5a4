//! Bootstrap sign-in against the identity service
//!
//! The only output is an opaque user id. It is logged and otherwise unused, so
//! every failure degrades to a random id instead of stopping startup.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Web API key; `None` means the identity service is not configured
    pub api_key: Option<String>,
    /// Custom sign-in token; anonymous sign-in when absent
    pub custom_token: Option<String>,
    pub base_url: String,
    /// Upper bound for each identity request
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("identity request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("identity service returned {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("identity response carried no user id")]
    MissingUserId,
}

/// Sign in and return the user id, or a random one on any failure
pub async fn bootstrap_identity(config: &IdentityConfig) -> String {
    let Some(api_key) = config.api_key.as_deref() else {
        tracing::error!("Identity config is missing. Running without persistence.");
        return random_user_id();
    };

    let client = match Client::builder().timeout(config.timeout).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "Failed to create identity HTTP client");
            return random_user_id();
        }
    };

    match sign_in(config, api_key, &client).await {
        Ok(user_id) => {
            tracing::info!(user_id = %user_id, anonymous = config.custom_token.is_none(), "Signed in");
            user_id
        }
        Err(e) => {
            tracing::error!(error = %e, "Error during sign-in, using a random user id");
            random_user_id()
        }
    }
}

fn random_user_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

async fn sign_in(
    config: &IdentityConfig,
    api_key: &str,
    client: &Client,
) -> Result<String, IdentityError> {
    match config.custom_token.as_deref() {
        Some(token) => {
            let signed_in: SignInResponse = post(
                client,
                config,
                api_key,
                "accounts:signInWithCustomToken",
                &json!({ "token": token, "returnSecureToken": true }),
            )
            .await?;
            if let Some(user_id) = signed_in.local_id {
                return Ok(user_id);
            }

            let id_token = signed_in.id_token.ok_or(IdentityError::MissingUserId)?;
            let lookup: LookupResponse = post(
                client,
                config,
                api_key,
                "accounts:lookup",
                &json!({ "idToken": id_token }),
            )
            .await?;
            lookup
                .users
                .into_iter()
                .find_map(|u| u.local_id)
                .ok_or(IdentityError::MissingUserId)
        }
        None => {
            let signed_up: SignInResponse = post(
                client,
                config,
                api_key,
                "accounts:signUp",
                &json!({ "returnSecureToken": true }),
            )
            .await?;
            signed_up.local_id.ok_or(IdentityError::MissingUserId)
        }
    }
}

async fn post<T: DeserializeOwned>(
    client: &Client,
    config: &IdentityConfig,
    api_key: &str,
    method: &str,
    body: &Value,
) -> Result<T, IdentityError> {
    let url = format!("{}/{method}", config.base_url.trim_end_matches('/'));
    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .json(body)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(IdentityError::Rejected {
            status: status.as_u16(),
            message,
        });
    }

    Ok(response.json().await?)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    #[serde(default)]
    local_id: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    local_id: Option<String>,
}
