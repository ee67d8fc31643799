//! # OptSync API
//!
//! Client for the bookstore admin API: configuration, bearer token handling,
//! the [`Transport`] seam with its single refresh-and-retry on 401, and the
//! typed endpoint wrapper [`AdminApi`].

pub mod admin;
pub mod config;
pub mod error;
pub mod http;
pub mod token;
pub mod transport;

pub use admin::{AdminApi, AdoptionFilter};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use http::HttpConnection;
pub use token::TokenCache;
pub use transport::{ApiRequest, ApiResponse, AuthenticatedTransport, Connection, Transport};

pub use reqwest::Method;
