use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

use super::expiry;
use super::refresh;
use super::store::TokenStore;

/// Authentication manager
///
/// Owns the token lifecycle: storage of the access/refresh pair, expiry
/// detection, and renewal against the auth endpoint. The manager is an
/// injectable service rather than process-global state, so independent
/// instances can coexist (one per test, one per application).
///
/// Concurrency contract: for any number of concurrent callers observing an
/// expiring token, exactly one refresh request is issued; every caller
/// resolves exactly once, with the outcome of that single call.
pub struct AuthManager {
    /// Durable token storage
    store: Arc<TokenStore>,

    /// HTTP client for refresh requests
    client: Client,

    /// Auth refresh endpoint URL
    refresh_url: String,

    /// Token refresh threshold in seconds (default: 300 = 5 minutes)
    refresh_threshold: i64,

    /// In-flight refresh, if any. The leader installs a one-shot broadcast
    /// sender here; late arrivals subscribe to it instead of starting a
    /// second refresh.
    inflight: Mutex<Option<broadcast::Sender<Option<String>>>>,
}

impl AuthManager {
    /// Create a new AuthManager over the given store.
    pub fn new(store: Arc<TokenStore>, refresh_url: String, refresh_threshold: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            store,
            client,
            refresh_url,
            refresh_threshold: refresh_threshold as i64,
            inflight: Mutex::new(None),
        })
    }

    /// Store a new token pair (after login or registration).
    pub fn set_tokens(&self, access_token: &str, refresh_token: &str) -> Result<()> {
        self.store.set_tokens(access_token, refresh_token)
    }

    /// Clear the session.
    pub fn clear_tokens(&self) -> Result<()> {
        self.store.clear()
    }

    /// Get the stored access token without any freshness check.
    pub fn access_token(&self) -> Result<Option<String>> {
        self.store.access_token()
    }

    /// Get the stored refresh token.
    pub fn refresh_token(&self) -> Result<Option<String>> {
        self.store.refresh_token()
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// Returns `Ok(None)` for every expected no-session condition: nothing
    /// stored, refresh rejected, transport failure. Only storage-medium
    /// failures surface as `Err`.
    pub async fn get_valid_access_token(&self) -> Result<Option<String>> {
        let Some(access_token) = self.store.access_token()? else {
            return Ok(None);
        };

        // Fast path: token is fresh, no network call, no state change
        if !expiry::is_expiring_soon(&access_token, self.refresh_threshold) {
            return Ok(Some(access_token));
        }

        // The token must be renewed. Either become the leader or subscribe
        // to the refresh already in flight.
        let waiter = {
            let mut inflight = self.inflight.lock().await;
            match inflight.as_ref() {
                Some(tx) => Some(tx.subscribe()),
                None => {
                    // A refresh may have finished while this task was
                    // parked on the lock. Re-check the store before
                    // starting another one: a rotated pair is reused, a
                    // cleared session stays cleared.
                    match self.store.access_token()? {
                        Some(current)
                            if !expiry::is_expiring_soon(&current, self.refresh_threshold) =>
                        {
                            return Ok(Some(current));
                        }
                        None => return Ok(None),
                        _ => {}
                    }
                    let (tx, _) = broadcast::channel(1);
                    *inflight = Some(tx);
                    None
                }
            }
        };

        if let Some(mut rx) = waiter {
            // A refresh is in flight; resume with whatever it produces.
            return match rx.recv().await {
                Ok(token) => Ok(token),
                // Sender dropped without a result; treat as failed refresh
                Err(_) => Ok(None),
            };
        }

        let result = refresh::refresh_access_token(&self.client, &self.store, &self.refresh_url).await;

        // Reset the in-flight state and fan out to every waiter regardless
        // of outcome, so no caller is left suspended. On failure, waiters
        // resolve with None, matching the leader's own return.
        let tx = self.inflight.lock().await.take();
        if let Some(tx) = tx {
            let outcome = match &result {
                Ok(token) => token.clone(),
                Err(_) => None,
            };
            let _ = tx.send(outcome);
        }

        result
    }
}
