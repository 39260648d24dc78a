// Authentication wire types

use serde::{Deserialize, Serialize};

/// Refresh request body for POST /auth/refresh
#[derive(Serialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Token pair returned by the auth endpoints (login, register, refresh)
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    #[allow(dead_code)]
    pub token_type: String,
}

/// Login/register request body
#[derive(Serialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}
