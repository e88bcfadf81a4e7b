//! HTTP access to the key/value store.
//!
//! Exposes `GET /config?key=<k>`, answering `"<k>: <v>"` in plain text.

use crate::config::ConfigStore;
use crate::error::{CliError, CliResult};
use axum::{
    extract::{Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use tokio::net::TcpListener;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
pub struct ConfigQuery {
    #[serde(default)]
    pub key: String,
}

/// Build the router serving `store`.
pub fn router(store: ConfigStore) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .with_state(store)
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: &str, store: ConfigStore) -> CliResult<()> {
    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    info!(addr = %local, "Starting HTTP server on {}", local);

    axum::serve(listener, router(store))
        .await
        .map_err(|e| CliError::Server(e.to_string()))
}

async fn get_config(State(store): State<ConfigStore>, Query(query): Query<ConfigQuery>) -> String {
    let value = store.get(&query.key).unwrap_or_default();
    debug!(key = %query.key, "config lookup");
    format!("{}: {}", query.key, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use tower::ServiceExt;

    async fn call(store: ConfigStore, method: Method, uri: &str) -> (StatusCode, String) {
        let response = router(store)
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_get_existing_key() {
        let store = ConfigStore::new();
        store.set("target", "192.168.1.1");

        let (status, body) = call(store, Method::GET, "/config?key=target").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "target: 192.168.1.1");
    }

    #[tokio::test]
    async fn test_get_unknown_key_is_empty() {
        let (status, body) = call(ConfigStore::new(), Method::GET, "/config?key=missing").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "missing: ");
    }

    #[tokio::test]
    async fn test_missing_key_param() {
        let (status, body) = call(ConfigStore::new(), Method::GET, "/config").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, ": ");
    }

    #[tokio::test]
    async fn test_post_not_allowed() {
        let (status, _) = call(ConfigStore::new(), Method::POST, "/config?key=a").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_sees_updates_through_shared_handle() {
        let store = ConfigStore::new();
        let app = router(store.clone());
        store.set("mode", "quiet");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/config?key=mode")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"mode: quiet");
    }
}
