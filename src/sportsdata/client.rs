use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::error::ApiError;
use crate::session::Session;

/// Thin client for the SportsDataIO REST API.
///
/// Every request gets the session's API key appended as the `key` query
/// parameter. No request timeout is set; requests take as long as the
/// underlying HTTP client allows.
#[derive(Clone)]
pub struct SportsDataClient {
    http: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl SportsDataClient {
    pub fn new(base_url: &str, session: Arc<Session>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid base URL {}", base_url))?;
        Ok(SportsDataClient {
            http,
            base_url,
            session,
        })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base_url.join(path)?;
        if let Some(key) = self.session.api_key() {
            url.query_pairs_mut().append_pair("key", &key);
        }
        Ok(url)
    }

    async fn send(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path)?;
        debug!("GET {}", path);
        self.http
            .get(url)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                path: path.to_string(),
                source,
            })
    }

    /// GET `path` and decode the JSON body.
    ///
    /// 401 becomes [`ApiError::Unauthorized`], any other non-2xx status
    /// [`ApiError::Status`].
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let resp = self.send(path).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), path));
        }

        let body = resp.bytes().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }

    /// Like [`get_json`](Self::get_json) for list endpoints, treating a
    /// `null` body as an empty list.
    pub async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let list: Option<Vec<T>> = self.get_json(path).await?;
        Ok(list.unwrap_or_default())
    }

    /// GET `path` with the status code alongside the raw JSON payload.
    pub async fn get_value(&self, path: &str) -> Result<(serde_json::Value, u16), ApiError> {
        let resp = self.send(path).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16(), path));
        }
        let body = resp.bytes().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;
        let value = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).map_err(|source| ApiError::Decode {
                path: path.to_string(),
                source,
            })?
        };
        Ok((value, status.as_u16()))
    }

    /// Entitlement check: `false` only for 401. Every other answer,
    /// including server errors, counts as accessible.
    pub async fn probe(&self, path: &str) -> Result<bool, ApiError> {
        let resp = self.send(path).await?;
        Ok(resp.status() != StatusCode::UNAUTHORIZED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SettingsStore;
    use crate::sportsdata::test_support::{serve, session_with_key};
    use axum::{extract::Query, http::StatusCode as AxumStatus, routing::get, Json, Router};
    use std::collections::HashMap;

    async fn client() -> SportsDataClient {
        let router = Router::new()
            .route(
                "/echo",
                get(|Query(q): Query<HashMap<String, String>>| async move { Json(q) }),
            )
            .route("/denied", get(|| async { AxumStatus::UNAUTHORIZED }))
            .route("/down", get(|| async { AxumStatus::SERVICE_UNAVAILABLE }))
            .route("/null", get(|| async { "null" }))
            .route("/garbage", get(|| async { "{not json" }));
        let base = serve(router).await;
        SportsDataClient::new(&base, session_with_key(Some("secret"))).unwrap()
    }

    #[tokio::test]
    async fn test_key_appended_to_every_request() {
        let c = client().await;
        let q: HashMap<String, String> = c.get_json("/echo").await.unwrap();
        assert_eq!(q.get("key").map(String::as_str), Some("secret"));
    }

    #[tokio::test]
    async fn test_no_key_param_without_session_key() {
        let router = Router::new().route(
            "/echo",
            get(|Query(q): Query<HashMap<String, String>>| async move { Json(q) }),
        );
        let base = serve(router).await;
        let session = Session::load(SettingsStore::open_in_memory().unwrap(), "G1001").unwrap();
        let c = SportsDataClient::new(&base, Arc::new(session)).unwrap();
        let q: HashMap<String, String> = c.get_json("/echo").await.unwrap();
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn test_status_errors_are_typed() {
        let c = client().await;
        let err = c.get_json::<serde_json::Value>("/denied").await.unwrap_err();
        assert!(err.is_unauthorized());

        let err = c.get_json::<serde_json::Value>("/down").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert!(!err.is_unauthorized());

        let err = c.get_json::<serde_json::Value>("/garbage").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_null_list_is_empty() {
        let c = client().await;
        let list: Vec<serde_json::Value> = c.get_list("/null").await.unwrap();
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_probe_only_401_is_inaccessible() {
        let c = client().await;
        assert!(!c.probe("/denied").await.unwrap());
        // Upstream outages still count as accessible.
        assert!(c.probe("/down").await.unwrap());
        assert!(c.probe("/echo").await.unwrap());
    }

    #[tokio::test]
    async fn test_probe_transport_failure_is_error() {
        let session = session_with_key(Some("k"));
        // Port 9 (discard) on localhost is not listening.
        let c = SportsDataClient::new("http://127.0.0.1:9", session).unwrap();
        assert!(c.probe("/anything").await.is_err());
    }
}
