//! Request/response types and the authenticated transport.
//!
//! [`Connection`] is the raw wire: a token fetch and a single send.
//! [`AuthenticatedTransport`] layers the token cache on top and retries a
//! request exactly once after refreshing the token when the server answers 401.

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::token::TokenCache;

/// HTTP status the API uses for an expired or missing token.
pub const UNAUTHORIZED: u16 = 401;

/// One API request: method, path segments, query pairs and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, segments: &[&str]) -> Self {
        Self {
            method,
            segments: segments.iter().map(|s| s.to_string()).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(segments: &[&str]) -> Self {
        Self::new(Method::GET, segments)
    }

    pub fn post(segments: &[&str], body: Value) -> Self {
        Self::new(Method::POST, segments).body(body)
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl Into<String>) -> Self {
        self.query.push((key.to_string(), value.into()));
        self
    }

    /// `/seg/seg/...`, unencoded. Used for logging and routing.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// Status plus body of an API response.
///
/// 2xx bodies are parsed as JSON (falling back to a JSON string); other
/// bodies are kept as the opaque `error` string.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Option<Value>,
    pub error: Option<String>,
}

impl ApiResponse {
    pub fn from_body(status: u16, body: String) -> Self {
        if (200..300).contains(&status) {
            let data = serde_json::from_str(&body).unwrap_or(Value::String(body));
            Self {
                status,
                data: Some(data),
                error: None,
            }
        } else {
            Self {
                status,
                data: None,
                error: Some(body),
            }
        }
    }

    pub fn ok(data: Value) -> Self {
        Self {
            status: 200,
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(status: u16, error: impl Into<String>) -> Self {
        Self {
            status,
            data: None,
            error: Some(error.into()),
        }
    }

    /// True when the API acknowledged with 200, the only status it uses for success.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Decode the body, or `None` if absent or of a different shape.
    pub fn data_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.data
            .as_ref()
            .and_then(|data| serde_json::from_value(data.clone()).ok())
    }

    /// Error body, or an empty string.
    pub fn error_text(&self) -> &str {
        self.error.as_deref().unwrap_or_default()
    }
}

/// Raw access to the API: fetch a token and send one request with it.
#[async_trait]
pub trait Connection: Send + Sync {
    async fn fetch_token(&self) -> ApiResult<String>;

    async fn send(&self, request: &ApiRequest, token: &str) -> ApiResult<ApiResponse>;
}

/// Authenticated request execution.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, request: &ApiRequest) -> ApiResult<ApiResponse>;
}

/// [`Transport`] over a [`Connection`] with a token cache.
pub struct AuthenticatedTransport<C> {
    connection: C,
    tokens: TokenCache,
}

impl<C: Connection> AuthenticatedTransport<C> {
    pub fn new(connection: C) -> Self {
        Self {
            connection,
            tokens: TokenCache::new(),
        }
    }

    /// Fetch a fresh token and cache it.
    pub async fn authenticate(&self) -> ApiResult<()> {
        info!("Fetching auth token...");
        let token = self.connection.fetch_token().await?;
        self.tokens.set(token).await;
        info!("Auth token obtained successfully");
        Ok(())
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    async fn current_token(&self) -> ApiResult<String> {
        if let Some(token) = self.tokens.get().await {
            return Ok(token);
        }
        self.authenticate().await?;
        Ok(self.tokens.get().await.unwrap_or_default())
    }
}

#[async_trait]
impl<C: Connection> Transport for AuthenticatedTransport<C> {
    async fn request(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let token = self.current_token().await?;
        let response = self.connection.send(request, &token).await?;

        if response.status != UNAUTHORIZED {
            return Ok(response);
        }

        info!(path = %request.path(), "Token expired, refreshing...");
        self.tokens.invalidate().await;
        let token = self.current_token().await?;

        let retried = self.connection.send(request, &token).await?;
        debug!(path = %request.path(), status = retried.status, "Retried after token refresh");
        Ok(retried)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Connection that answers from a queue of statuses and records tokens used.
    struct ScriptedConnection {
        statuses: Mutex<Vec<u16>>,
        tokens_issued: Mutex<u32>,
        tokens_seen: Mutex<Vec<String>>,
    }

    impl ScriptedConnection {
        fn new(statuses: &[u16]) -> Self {
            Self {
                statuses: Mutex::new(statuses.iter().rev().copied().collect()),
                tokens_issued: Mutex::new(0),
                tokens_seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Connection for ScriptedConnection {
        async fn fetch_token(&self) -> ApiResult<String> {
            let mut issued = self.tokens_issued.lock().unwrap();
            *issued += 1;
            Ok(format!("token-{}", issued))
        }

        async fn send(&self, _request: &ApiRequest, token: &str) -> ApiResult<ApiResponse> {
            self.tokens_seen.lock().unwrap().push(token.to_string());
            let status = self.statuses.lock().unwrap().pop().unwrap_or(200);
            Ok(ApiResponse::from_body(status, "{}".to_string()))
        }
    }

    fn status_request() -> ApiRequest {
        ApiRequest::get(&["cart", "v1", "admin", "status"])
    }

    #[tokio::test]
    async fn test_request_without_401_uses_cached_token() {
        let transport = AuthenticatedTransport::new(ScriptedConnection::new(&[200, 200]));
        transport.authenticate().await.unwrap();

        transport.request(&status_request()).await.unwrap();
        transport.request(&status_request()).await.unwrap();

        assert_eq!(*transport.connection.tokens_issued.lock().unwrap(), 1);
        assert_eq!(*transport.connection.tokens_seen.lock().unwrap(), vec!["token-1", "token-1"]);
    }

    #[tokio::test]
    async fn test_401_refreshes_and_retries_once() {
        let transport = AuthenticatedTransport::new(ScriptedConnection::new(&[401, 200]));
        transport.authenticate().await.unwrap();

        let response = transport.request(&status_request()).await.unwrap();
        assert!(response.is_ok());
        assert_eq!(*transport.connection.tokens_seen.lock().unwrap(), vec!["token-1", "token-2"]);
    }

    #[tokio::test]
    async fn test_second_401_is_returned_not_retried() {
        let transport = AuthenticatedTransport::new(ScriptedConnection::new(&[401, 401, 200]));
        transport.authenticate().await.unwrap();

        let response = transport.request(&status_request()).await.unwrap();
        assert_eq!(response.status, 401);
        assert_eq!(transport.connection.tokens_seen.lock().unwrap().len(), 2);
        assert_eq!(*transport.connection.tokens_issued.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_is_fetched_lazily() {
        let transport = AuthenticatedTransport::new(ScriptedConnection::new(&[200]));
        transport.request(&status_request()).await.unwrap();
        assert_eq!(*transport.connection.tokens_issued.lock().unwrap(), 1);
    }

    #[test]
    fn test_response_body_handling() {
        let json = ApiResponse::from_body(200, r#"{"ok":true}"#.to_string());
        assert_eq!(json.data, Some(serde_json::json!({"ok": true})));

        let text = ApiResponse::from_body(200, "pong".to_string());
        assert_eq!(text.data, Some(Value::String("pong".into())));

        let failed = ApiResponse::from_body(500, r#"{"message":"boom"}"#.to_string());
        assert!(failed.data.is_none());
        assert_eq!(failed.error_text(), r#"{"message":"boom"}"#);
        assert!(!failed.is_ok());
    }

    #[test]
    fn test_request_path_and_query() {
        let request = ApiRequest::get(&["cart", "v1", "admin", "adoption", "2026SP"])
            .query("dept", "SW")
            .query("course", "685");
        assert_eq!(request.path(), "/cart/v1/admin/adoption/2026SP");
        assert_eq!(request.query.len(), 2);
    }
}
