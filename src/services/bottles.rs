// Bottle CRUD

use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::http_client::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bottle {
    pub id: u64,
    pub name: String,
    pub brand: Option<String>,
    pub flavor_profile: Option<String>,
    pub material: Option<String>,
    pub capacity_ml: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct BottleCreate {
    pub name: String,
    pub brand: Option<String>,
    pub flavor_profile: Option<String>,
    pub material: Option<String>,
    pub capacity_ml: Option<u32>,
}

/// Fetch a single bottle by id.
pub async fn fetch_bottle(
    client: &ApiClient,
    endpoints: &Endpoints,
    id: u64,
) -> Result<Bottle, ClientError> {
    client.get_json(&endpoints.bottle(id)).await
}

/// Fetch all bottles. The backend pages by skip/limit; a single large page
/// covers a home bar.
pub async fn fetch_all_bottles(
    client: &ApiClient,
    endpoints: &Endpoints,
) -> Result<Vec<Bottle>, ClientError> {
    let url = format!("{}?skip=0&limit=1000", endpoints.bottles());
    client.get_json(&url).await
}

/// Search bottles by (partial) name.
pub async fn fetch_bottles_by_name(
    client: &ApiClient,
    endpoints: &Endpoints,
    name: &str,
) -> Result<Vec<Bottle>, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput("bottle name is empty".to_string()));
    }
    let url = format!("{}?name={}", endpoints.bottles(), urlencode(name));
    client.get_json(&url).await
}

/// Register a new bottle.
pub async fn add_bottle(
    client: &ApiClient,
    endpoints: &Endpoints,
    bottle: &BottleCreate,
) -> Result<Bottle, ClientError> {
    client.post_json(&endpoints.bottles(), bottle).await
}

/// Delete a bottle by id.
pub async fn delete_bottle(
    client: &ApiClient,
    endpoints: &Endpoints,
    id: u64,
) -> Result<(), ClientError> {
    client.delete(&endpoints.bottle(id)).await
}

fn urlencode(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, percent_encoding::NON_ALPHANUMERIC).to_string()
}
