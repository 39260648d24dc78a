// Integration tests for the API service wrappers
//
// Verifies the Authorization header contract (present exactly when a
// session exists), payload shapes, and error mapping.

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use mockito::Matcher;
use serde_json::json;
use std::sync::Arc;

use bottles_cli::auth::{AuthManager, TokenStore};
use bottles_cli::config::Endpoints;
use bottles_cli::error::ClientError;
use bottles_cli::http_client::ApiClient;
use bottles_cli::services::{barcode, bottles, recipes, session, spirit_types};

// ==================================================================================================
// Test Helpers
// ==================================================================================================

fn make_jwt(exp: i64) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = general_purpose::URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{}}}"#, exp));
    format!("{}.{}.signature", header, payload)
}

fn fresh_jwt() -> String {
    make_jwt((Utc::now() + Duration::hours(1)).timestamp())
}

struct TestClient {
    auth: Arc<AuthManager>,
    client: ApiClient,
    endpoints: Endpoints,
}

fn setup(server_url: &str) -> TestClient {
    let store = Arc::new(TokenStore::open_in_memory().expect("Failed to open token store"));
    let auth = Arc::new(
        AuthManager::new(store, format!("{}/auth/refresh", server_url), 300)
            .expect("Failed to create auth manager"),
    );
    // No retries so error-path tests stay fast
    let client = ApiClient::new(auth.clone(), 30, 0).expect("Failed to create API client");

    TestClient {
        auth,
        client,
        endpoints: Endpoints::new(server_url),
    }
}

// ==================================================================================================
// Authorization Header Contract
// ==================================================================================================

#[tokio::test]
async fn test_bearer_header_sent_when_session_exists() {
    let mut server = mockito::Server::new_async().await;
    let token = fresh_jwt();
    let mock = server
        .mock("GET", "/spirit_types")
        .match_header("authorization", format!("Bearer {}", token).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"[{"id": 1, "name": "Gin"}]"#)
        .expect(1)
        .create_async()
        .await;

    let t = setup(&server.url());
    t.auth.set_tokens(&token, "refresh-token").unwrap();

    let types = spirit_types::fetch_all_spirit_types(&t.client, &t.endpoints)
        .await
        .unwrap();
    assert_eq!(types.len(), 1);
    assert_eq!(types[0].name, "Gin");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_header_omitted_without_session() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/spirit_types")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .expect(1)
        .create_async()
        .await;

    let t = setup(&server.url());

    let types = spirit_types::fetch_all_spirit_types(&t.client, &t.endpoints)
        .await
        .unwrap();
    assert!(types.is_empty());

    mock.assert_async().await;
}

// ==================================================================================================
// Bottles
// ==================================================================================================

#[tokio::test]
async fn test_fetch_all_bottles() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/bottles")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("skip".into(), "0".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                {"id": 1, "name": "Tanqueray", "brand": "Diageo", "flavor_profile": "juniper",
                 "material": "glass", "capacity_ml": 750},
                {"id": 2, "name": "Campari", "brand": null, "flavor_profile": null,
                 "material": null, "capacity_ml": null}
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let t = setup(&server.url());
    let result = bottles::fetch_all_bottles(&t.client, &t.endpoints)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result[0].name, "Tanqueray");
    assert_eq!(result[0].capacity_ml, Some(750));
    assert_eq!(result[1].brand, None);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_bottles_by_name_encodes_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/bottles")
        .match_query(Matcher::UrlEncoded("name".into(), "Monkey 47".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create_async()
        .await;

    let t = setup(&server.url());
    let result = bottles::fetch_bottles_by_name(&t.client, &t.endpoints, "  Monkey 47 ")
        .await
        .unwrap();
    assert!(result.is_empty());

    mock.assert_async().await;
}

#[tokio::test]
async fn test_fetch_bottles_by_empty_name_is_rejected_locally() {
    let t = setup("http://127.0.0.1:1");
    let result = bottles::fetch_bottles_by_name(&t.client, &t.endpoints, "   ").await;
    assert!(matches!(result, Err(ClientError::InvalidInput(_))));
}

#[tokio::test]
async fn test_add_and_delete_bottle() {
    let mut server = mockito::Server::new_async().await;
    let add_mock = server
        .mock("POST", "/bottles")
        .match_body(Matcher::PartialJson(json!({
            "name": "Rittenhouse Rye",
            "capacity_ml": 750
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({"id": 9, "name": "Rittenhouse Rye", "brand": null,
                   "flavor_profile": "spicy", "material": null, "capacity_ml": 750})
            .to_string(),
        )
        .create_async()
        .await;
    let delete_mock = server
        .mock("DELETE", "/bottles/9")
        .with_status(204)
        .create_async()
        .await;

    let t = setup(&server.url());

    let bottle = bottles::add_bottle(
        &t.client,
        &t.endpoints,
        &bottles::BottleCreate {
            name: "Rittenhouse Rye".to_string(),
            brand: None,
            flavor_profile: Some("spicy".to_string()),
            material: None,
            capacity_ml: Some(750),
        },
    )
    .await
    .unwrap();
    assert_eq!(bottle.id, 9);

    bottles::delete_bottle(&t.client, &t.endpoints, 9)
        .await
        .unwrap();

    add_mock.assert_async().await;
    delete_mock.assert_async().await;
}

#[tokio::test]
async fn test_not_found_maps_to_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/bottles/99")
        .with_status(404)
        .with_body(r#"{"detail": "Bottle not found"}"#)
        .create_async()
        .await;

    let t = setup(&server.url());
    let result = bottles::fetch_bottle(&t.client, &t.endpoints, 99).await;

    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("Bottle not found"));
        }
        other => panic!("Expected API error, got {:?}", other.map(|b| b.id)),
    }
}

// ==================================================================================================
// Recipes
// ==================================================================================================

#[tokio::test]
async fn test_add_recipe_payload_shape() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/recipes")
        .match_body(Matcher::Json(json!({
            "name": "Negroni",
            "instructions": "Stir over ice, strain over a large cube.",
            "ingredients": "1 oz gin, 1 oz Campari, 1 oz sweet vermouth",
            "bottle_ids": [1, 3]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 4,
                "name": "Negroni",
                "instructions": "Stir over ice, strain over a large cube.",
                "ingredients": "1 oz gin, 1 oz Campari, 1 oz sweet vermouth",
                "spirit_types": [{"id": 1, "name": "Gin"}, {"id": 3, "name": "Amaro"}],
                "bottles": [{"id": 1, "name": "Tanqueray"}]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let t = setup(&server.url());
    let recipe = recipes::add_recipe(
        &t.client,
        &t.endpoints,
        &recipes::RecipeCreate {
            name: "Negroni".to_string(),
            instructions: "Stir over ice, strain over a large cube.".to_string(),
            ingredients: "1 oz gin, 1 oz Campari, 1 oz sweet vermouth".to_string(),
            bottle_ids: recipes::parse_id_list("1, 3"),
        },
    )
    .await
    .unwrap();

    assert_eq!(recipe.id, 4);
    assert_eq!(recipe.spirit_types.len(), 2);
    assert_eq!(recipe.bottles[0].name, "Tanqueray");

    mock.assert_async().await;
}

// ==================================================================================================
// Barcode Registry
// ==================================================================================================

#[tokio::test]
async fn test_barcode_lookup_found() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/barcode/lookup/0123456789012")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "found": true,
                "data": {
                    "id": 11,
                    "barcode": "0123456789012",
                    "name": "Espolon Blanco",
                    "brand": "Espolon",
                    "flavor_profile": null,
                    "capacity_ml": 750,
                    "spirit_type_name": "Tequila",
                    "created_at": "2025-06-01T12:00:00Z"
                },
                "message": null
            })
            .to_string(),
        )
        .create_async()
        .await;

    let t = setup(&server.url());
    let result = barcode::lookup_barcode(&t.client, &t.endpoints, "0123456789012")
        .await
        .unwrap();

    assert!(result.found);
    let data = result.data.unwrap();
    assert_eq!(data.name, "Espolon Blanco");
    assert_eq!(data.spirit_type_name.as_deref(), Some("Tequila"));

    mock.assert_async().await;
}

#[tokio::test]
async fn test_barcode_lookup_rejects_non_numeric_input() {
    let t = setup("http://127.0.0.1:1");
    let result = barcode::lookup_barcode(&t.client, &t.endpoints, "not-a-barcode").await;
    assert!(matches!(result, Err(ClientError::InvalidInput(_))));
}

// ==================================================================================================
// Session
// ==================================================================================================

#[tokio::test]
async fn test_login_stores_token_pair() {
    let mut server = mockito::Server::new_async().await;
    let access = fresh_jwt();
    let mock = server
        .mock("POST", "/auth/login")
        .match_body(Matcher::Json(json!({
            "username": "danny",
            "password": "hunter2"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": access,
                "refresh_token": "refresh-abc",
                "token_type": "bearer"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let t = setup(&server.url());
    session::login(
        &t.auth,
        &t.endpoints,
        "danny".to_string(),
        "hunter2".to_string(),
    )
    .await
    .unwrap();

    assert_eq!(t.auth.access_token().unwrap(), Some(access));
    assert_eq!(
        t.auth.refresh_token().unwrap(),
        Some("refresh-abc".to_string())
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn test_login_failure_surfaces_backend_detail() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/auth/login")
        .with_status(401)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail": "Invalid username or password"}"#)
        .create_async()
        .await;

    let t = setup(&server.url());
    let result = session::login(
        &t.auth,
        &t.endpoints,
        "danny".to_string(),
        "wrong".to_string(),
    )
    .await;

    match result {
        Err(ClientError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid username or password");
        }
        other => panic!("Expected API error, got {:?}", other),
    }

    // No tokens were stored
    assert_eq!(t.auth.access_token().unwrap(), None);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let t = setup("http://127.0.0.1:1");
    t.auth.set_tokens(&fresh_jwt(), "refresh-token").unwrap();

    session::logout(&t.auth).unwrap();
    assert_eq!(t.auth.access_token().unwrap(), None);
    assert_eq!(t.auth.refresh_token().unwrap(), None);

    // Idempotent
    session::logout(&t.auth).unwrap();
}
