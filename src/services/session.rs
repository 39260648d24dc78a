// Login, registration and logout against the auth endpoints
//
// Login and registration are the only calls made without a session; they
// carry no Authorization header and store the returned token pair on
// success.

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::auth::{AuthManager, CredentialsRequest, TokenResponse};
use crate::config::Endpoints;
use crate::error::ClientError;

/// User record returned by registration
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
}

/// Error payload shape used by the backend for auth failures
#[derive(Deserialize)]
struct ErrorDetail {
    detail: Option<String>,
}

/// Authenticate and persist the returned token pair.
pub async fn login(
    auth: &AuthManager,
    endpoints: &Endpoints,
    username: String,
    password: String,
) -> Result<(), ClientError> {
    let client = http_client()?;
    let request = CredentialsRequest { username, password };

    let response = client
        .post(endpoints.auth_login())
        .json(&request)
        .send()
        .await
        .map_err(|e| ClientError::Internal(anyhow!("Login request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status.as_u16(), response, "Login failed").await);
    }

    let data: TokenResponse = response
        .json()
        .await
        .map_err(|e| ClientError::Internal(anyhow!("Failed to parse login response: {}", e)))?;

    auth.set_tokens(&data.access_token, &data.refresh_token)?;
    Ok(())
}

/// Register a new user. The caller still needs to log in afterwards.
pub async fn register(
    endpoints: &Endpoints,
    username: String,
    password: String,
) -> Result<UserResponse, ClientError> {
    let client = http_client()?;
    let request = CredentialsRequest { username, password };

    let response = client
        .post(endpoints.auth_register())
        .json(&request)
        .send()
        .await
        .map_err(|e| ClientError::Internal(anyhow!("Register request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(api_error(status.as_u16(), response, "Error registering user").await);
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::Internal(anyhow!("Failed to parse register response: {}", e)))
}

/// Drop the local session. Idempotent; the backend is not contacted.
pub fn logout(auth: &AuthManager) -> Result<(), ClientError> {
    auth.clear_tokens()?;
    Ok(())
}

fn http_client() -> Result<reqwest::Client, ClientError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()
        .context("Failed to create HTTP client")
        .map_err(ClientError::Internal)
}

/// Map a failed auth response to an API error, preferring the backend's
/// `detail` message when present.
async fn api_error(status: u16, response: reqwest::Response, fallback: &str) -> ClientError {
    let message = match response.json::<ErrorDetail>().await {
        Ok(ErrorDetail { detail: Some(d) }) => d,
        _ => fallback.to_string(),
    };
    ClientError::Api { status, message }
}
