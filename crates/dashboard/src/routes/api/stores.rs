//! Connected-store management API.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Serialize;
use storefleet_core::{CredentialSet, StoreCredential, StoreUrl};
use tracing::instrument;

use crate::{error::AppError, state::AppState};

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(list_stores).post(connect_stores))
        .route("/api/stores/{store}", delete(disconnect_store))
}

/// Connected store URLs. Access tokens are never returned.
#[derive(Debug, Serialize)]
pub struct StoreListResponse {
    pub stores: Vec<StoreUrl>,
}

impl StoreListResponse {
    fn of(credentials: &[StoreCredential]) -> Self {
        Self {
            stores: credentials.iter().map(|c| c.url().clone()).collect(),
        }
    }
}

/// List connected stores.
///
/// # Errors
///
/// Returns an error if the credential store cannot be read.
#[instrument(skip(state))]
pub async fn list_stores(
    State(state): State<AppState>,
) -> Result<Json<StoreListResponse>, AppError> {
    let credentials = state.credentials().load().await?;
    Ok(Json(StoreListResponse::of(&credentials)))
}

/// Connect one store (`{url, accessToken}`) or several (an array of them).
///
/// # Errors
///
/// Returns 400 if a URL is already connected, 500 if the credential store
/// cannot be written.
#[instrument(skip_all)]
pub async fn connect_stores(
    State(state): State<AppState>,
    Json(body): Json<CredentialSet>,
) -> Result<(StatusCode, Json<StoreListResponse>), AppError> {
    tracing::info!(stores = body.len(), "Connecting stores");
    let credentials = state.credentials().connect(body).await?;
    Ok((StatusCode::CREATED, Json(StoreListResponse::of(&credentials))))
}

/// Disconnect a store.
///
/// # Errors
///
/// Returns 404 if the store is not connected.
#[instrument(skip(state))]
pub async fn disconnect_store(
    State(state): State<AppState>,
    Path(store): Path<String>,
) -> Result<StatusCode, AppError> {
    let url = StoreUrl::parse(&store)?;
    if state.credentials().remove(&url).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::json;

    use super::*;
    use crate::services::fanout::tests::{FakeFetcher, cred};
    use crate::state::tests::{json_body, send, test_state};

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_stores_hides_tokens() {
        let state = test_state(vec![cred("a.myshopify.com")], FakeFetcher::default());
        let response = send(
            state,
            Request::get("/api/stores").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body, json!({"stores": ["a.myshopify.com"]}));
    }

    #[tokio::test]
    async fn test_connect_single_and_array() {
        let state = test_state(vec![], FakeFetcher::default());

        let response = send(
            state.clone(),
            post_json(
                "/api/stores",
                &json!({"url": "a.myshopify.com", "accessToken": "shpat_a"}),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = send(
            state.clone(),
            post_json(
                "/api/stores",
                &json!([
                    {"url": "b.myshopify.com", "accessToken": "shpat_b"},
                    {"url": "c.myshopify.com/", "accessToken": "shpat_c"}
                ]),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            json_body(response).await,
            json!({"stores": ["a.myshopify.com", "b.myshopify.com", "c.myshopify.com"]})
        );
    }

    #[tokio::test]
    async fn test_connect_duplicate_is_rejected() {
        let state = test_state(vec![cred("a.myshopify.com")], FakeFetcher::default());
        let response = send(
            state,
            post_json(
                "/api/stores",
                &json!({"url": "a.myshopify.com", "accessToken": "shpat_a"}),
            ),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Store already connected: a.myshopify.com"})
        );
    }

    #[tokio::test]
    async fn test_connect_blank_token_is_rejected() {
        let state = test_state(vec![], FakeFetcher::default());
        let response = send(
            state,
            post_json(
                "/api/stores",
                &json!({"url": "a.myshopify.com", "accessToken": "  "}),
            ),
        )
        .await;

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_disconnect() {
        let state = test_state(
            vec![cred("a.myshopify.com"), cred("b.myshopify.com")],
            FakeFetcher::default(),
        );

        let response = send(
            state.clone(),
            Request::delete("/api/stores/a.myshopify.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let remaining = state.credentials().load().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].url().as_str(), "b.myshopify.com");
    }

    #[tokio::test]
    async fn test_disconnect_unknown_store() {
        let state = test_state(vec![], FakeFetcher::default());
        let response = send(
            state,
            Request::delete("/api/stores/missing.myshopify.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Not found: missing.myshopify.com"})
        );
    }
}
