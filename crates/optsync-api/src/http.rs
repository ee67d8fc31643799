//! reqwest-backed [`Connection`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Url;
use tracing::{debug, error};

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::transport::{ApiRequest, ApiResponse, Connection};

/// Request timeout for every API call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("optsync/", env!("CARGO_PKG_VERSION"));

/// HTTP connection to the admin API.
#[derive(Clone)]
pub struct HttpConnection {
    config: ApiConfig,
    client: reqwest::Client,
}

impl HttpConnection {
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Base URL joined with percent-encoded path segments and query pairs.
    fn url(&self, segments: &[String], query: &[(String, String)]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| ApiError::config(format!("invalid base URL '{}': {}", self.config.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| ApiError::config(format!("base URL '{}' cannot have a path", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }

        Ok(url)
    }
}

#[async_trait]
impl Connection for HttpConnection {
    async fn fetch_token(&self) -> ApiResult<String> {
        let segments = ["cart", "v1", "admin", self.config.api_key.as_str(), "token"]
            .map(String::from);
        let url = self.url(&segments, &[("secret".to_string(), self.config.api_secret.clone())])?;

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "text/plain")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!(status = status.as_u16(), body = %body, "Token fetch failed");
            return Err(ApiError::TokenFetch {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body.trim().to_string())
    }

    async fn send(&self, request: &ApiRequest, token: &str) -> ApiResult<ApiResponse> {
        let url = self.url(&request.segments, &request.query)?;
        debug!(method = %request.method, url = %url, "Sending request");

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, token)
            .header("api-key", &self.config.api_key);

        if let Some(body) = &request.body {
            debug!(body = %body, "Request body");
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(status, body = %body, "Response");
        Ok(ApiResponse::from_body(status, body))
    }
}
