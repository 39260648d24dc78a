// Recipe CRUD
//
// Recipes keep their ingredients as one free-form string (one ingredient
// per line, as entered) and reference the bottles they use by id.

use serde::{Deserialize, Serialize};

use crate::config::Endpoints;
use crate::error::ClientError;
use crate::http_client::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: u64,
    pub name: String,
    pub instructions: String,
    pub ingredients: Option<String>,
    #[serde(default)]
    pub spirit_types: Vec<NamedRef>,
    #[serde(default)]
    pub bottles: Vec<NamedRef>,
}

/// Reference to a related entity (spirit type or bottle)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedRef {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeCreate {
    pub name: String,
    pub instructions: String,
    pub ingredients: String,
    pub bottle_ids: Vec<u64>,
}

pub async fn fetch_all_recipes(
    client: &ApiClient,
    endpoints: &Endpoints,
) -> Result<Vec<Recipe>, ClientError> {
    client.get_json(&endpoints.recipes()).await
}

pub async fn fetch_recipe(
    client: &ApiClient,
    endpoints: &Endpoints,
    id: u64,
) -> Result<Recipe, ClientError> {
    client.get_json(&endpoints.recipe(id)).await
}

pub async fn add_recipe(
    client: &ApiClient,
    endpoints: &Endpoints,
    recipe: &RecipeCreate,
) -> Result<Recipe, ClientError> {
    client.post_json(&endpoints.recipes(), recipe).await
}

pub async fn delete_recipe(
    client: &ApiClient,
    endpoints: &Endpoints,
    id: u64,
) -> Result<(), ClientError> {
    client.delete(&endpoints.recipe(id)).await
}

/// Parse a comma-separated id list ("1, 2, 5"); non-numeric entries are
/// dropped rather than rejected.
pub fn parse_id_list(input: &str) -> Vec<u64> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}
