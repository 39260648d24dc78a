// Spirit type listing and creation

use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::http_client::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpiritType {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SpiritTypeCreate {
    pub name: String,
}

pub async fn fetch_all_spirit_types(
    client: &ApiClient,
    endpoints: &Endpoints,
) -> Result<Vec<SpiritType>, ClientError> {
    client.get_json(&endpoints.spirit_types()).await
}

pub async fn add_spirit_type(
    client: &ApiClient,
    endpoints: &Endpoints,
    name: &str,
) -> Result<SpiritType, ClientError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClientError::InvalidInput("spirit type name is empty".to_string()));
    }
    client
        .post_json(
            &endpoints.spirit_types(),
            &SpiritTypeCreate {
                name: name.to_string(),
            },
        )
        .await
}
