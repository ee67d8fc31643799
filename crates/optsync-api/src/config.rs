//! Connection settings read from the environment.

use crate::error::{ApiError, ApiResult};

pub const ENV_BASE_URL: &str = "WATCHMAN_API_BASE_URL";
pub const ENV_API_KEY: &str = "WATCHMAN_API_KEY";
pub const ENV_API_SECRET: &str = "WATCHMAN_API_SECRET";

/// Admin API connection settings.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub api_secret: String,
}

impl ApiConfig {
    pub fn new(base_url: &str, api_key: &str, api_secret: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            api_secret: api_secret.to_string(),
        }
    }

    /// Read `WATCHMAN_API_BASE_URL`, `WATCHMAN_API_KEY` and `WATCHMAN_API_SECRET`.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from an arbitrary variable lookup.
    ///
    /// Missing and empty values are both rejected.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ApiError::config(format!("{} environment variable is required", name)))
        };

        let base_url = require(ENV_BASE_URL)?;
        let api_key = require(ENV_API_KEY)?;
        let api_secret = require(ENV_API_SECRET)?;

        Ok(Self::new(&base_url, &api_key, &api_secret))
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .field("api_secret", &"***")
            .finish()
    }
}
