use anyhow::{anyhow, Context};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthManager;
use crate::error::ClientError;

/// HTTP client for the bottles API with retry logic
///
/// Obtains a fresh access token from the auth manager before each attempt
/// and sets `Authorization: Bearer <token>` when one is available; the
/// header is omitted entirely when there is no session (the backend then
/// answers 401, which is surfaced to the caller as an API error).
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Token lifecycle manager
    auth: Arc<AuthManager>,

    /// Maximum number of retries for transient failures
    max_retries: u32,

    /// Base delay for exponential backoff (milliseconds)
    base_delay_ms: u64,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(
        auth: Arc<AuthManager>,
        request_timeout: u64,
        max_retries: u32,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            auth,
            max_retries,
            base_delay_ms: 1000,
        })
    }

    /// GET a JSON resource
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.execute(Method::GET, url, None).await?;
        parse_json(response).await
    }

    /// POST a JSON body, returning the parsed JSON response
    pub async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let body = serde_json::to_value(body)
            .context("Failed to serialize request body")?;
        let response = self.execute(Method::POST, url, Some(&body)).await?;
        parse_json(response).await
    }

    /// DELETE a resource, discarding the response body
    pub async fn delete(&self, url: &str) -> Result<(), ClientError> {
        self.execute(Method::DELETE, url, None).await?;
        Ok(())
    }

    /// Execute a request, retrying 429/5xx and transport failures with
    /// exponential backoff. Other non-success statuses are terminal.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<Response, ClientError> {
        let mut attempt = 0;

        loop {
            let mut request = self.client.request(method.clone(), url);

            if let Some(token) = self.auth.get_valid_access_token().await? {
                request = request.bearer_auth(token);
            }
            if let Some(body) = body {
                request = request.json(body);
            }

            tracing::debug!(
                method = %method,
                url = %url,
                attempt = attempt + 1,
                "Sending HTTP request"
            );

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    if matches!(status.as_u16(), 429 | 500..=599) && attempt < self.max_retries {
                        let delay = self.backoff_delay(attempt);
                        tracing::warn!(
                            "Received {}, retrying after {}ms (attempt {}/{})",
                            status,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    let message = response.text().await.unwrap_or_default();
                    tracing::error!(
                        status = status.as_u16(),
                        url = %url,
                        response_body = %message,
                        "HTTP request failed with error response"
                    );
                    return Err(ClientError::Api {
                        status: status.as_u16(),
                        message,
                    });
                }

                Err(e) => {
                    if attempt < self.max_retries {
                        let delay = self.backoff_delay(attempt);
                        tracing::warn!(
                            "Request failed: {}, retrying after {}ms (attempt {}/{})",
                            e,
                            delay,
                            attempt + 1,
                            self.max_retries
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        attempt += 1;
                        continue;
                    }

                    tracing::error!(
                        error = %e,
                        url = %url,
                        total_attempts = attempt + 1,
                        "HTTP request failed after all retries"
                    );
                    return Err(ClientError::Internal(anyhow!("HTTP request failed: {}", e)));
                }
            }
        }
    }

    /// Exponential backoff with jitter to avoid thundering herd
    fn backoff_delay(&self, attempt: u32) -> u64 {
        let delay = self.base_delay_ms * 2_u64.pow(attempt);
        let jitter = (delay as f64 * 0.1 * rand::random()) as u64;
        delay + jitter
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    response
        .json()
        .await
        .map_err(|e| ClientError::Internal(anyhow!("Failed to parse response body: {}", e)))
}

// Simple random number generation for jitter
mod rand {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash, Hasher};

    pub fn random() -> f64 {
        let state = RandomState::new();
        let mut hasher = state.build_hasher();
        std::time::SystemTime::now().hash(&mut hasher);
        (hasher.finish() % 1000) as f64 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::TokenStore;

    #[test]
    fn test_backoff_calculation() {
        let store = Arc::new(TokenStore::open_in_memory().unwrap());
        let auth = Arc::new(
            AuthManager::new(store, "http://127.0.0.1:1/auth/refresh".to_string(), 300).unwrap(),
        );
        let client = ApiClient::new(auth, 30, 3).unwrap();

        let delay0 = client.backoff_delay(0);
        let delay1 = client.backoff_delay(1);
        let delay2 = client.backoff_delay(2);

        // Each delay should be roughly double the previous (with jitter)
        assert!((1000..=1200).contains(&delay0));
        assert!((2000..=2400).contains(&delay1));
        assert!((4000..=4800).contains(&delay2));
    }
}
