// Token refresh logic

use anyhow::Result;
use reqwest::Client;

use super::store::TokenStore;
use super::types::{RefreshRequest, TokenResponse};

/// Exchange the stored refresh token for a new token pair.
///
/// Issues exactly one HTTP call per invocation; concurrent-call discipline
/// lives in the manager. Outcomes:
/// - no refresh token stored: `Ok(None)`, no network call
/// - backend accepts: new pair persisted, `Ok(Some(access_token))`
/// - backend rejects (non-2xx): session is dead, tokens cleared, `Ok(None)`
/// - transport failure or unparseable body: logged, tokens cleared, `Ok(None)`
///
/// Only storage-medium failures surface as `Err`.
pub async fn refresh_access_token(
    client: &Client,
    store: &TokenStore,
    refresh_url: &str,
) -> Result<Option<String>> {
    let Some(refresh_token) = store.refresh_token()? else {
        return Ok(None);
    };

    tracing::debug!("Refreshing access token...");

    let request = RefreshRequest { refresh_token };
    let response = match client.post(refresh_url).json(&request).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!("Token refresh request failed: {}", e);
            store.clear()?;
            return Ok(None);
        }
    };

    let status = response.status();
    if !status.is_success() {
        // Refresh token rejected - the session is terminal
        tracing::warn!("Token refresh rejected: {}", status);
        store.clear()?;
        return Ok(None);
    }

    let data: TokenResponse = match response.json().await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to parse refresh response: {}", e);
            store.clear()?;
            return Ok(None);
        }
    };

    store.set_tokens(&data.access_token, &data.refresh_token)?;
    tracing::debug!("Access token refreshed");

    Ok(Some(data.access_token))
}
