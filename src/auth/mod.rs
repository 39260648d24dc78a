// Authentication module
// Manages the access/refresh token lifecycle

mod expiry;
mod manager;
mod refresh;
mod store;
mod types;

pub use manager::AuthManager;
pub use store::TokenStore;
pub use types::{CredentialsRequest, TokenResponse};

pub use expiry::{decode_expiry, is_expiring_soon};
