//! HTTP client for the remote FitFusion coaching API.
//!
//! One `ApiClient` wraps a cookie-carrying `reqwest::Client` plus the API
//! base URL. The session is entirely cookie-based: a successful login makes
//! the server set `access_token`/`refresh_token` cookies, which the shared
//! cookie jar replays on every subsequent request. The client itself holds
//! no tokens.
//!
//! Endpoint wrappers live in per-surface modules (`auth`, `profile`,
//! `content`, `search`, `chat`, `recommend`), each implemented as an
//! `impl ApiClient` block.

pub mod auth;
pub mod chat;
pub mod content;
pub mod error;
pub mod profile;
pub mod recommend;
pub mod search;

pub use auth::{RegisterRequest, RegisterResponse};
pub use chat::ChatStream;
pub use content::FitnessContent;
pub use error::ApiError;
pub use profile::{
    DietaryProfile, FitnessProfile, PhysicalProfile, ProfileBundle, UserProfile,
};
pub use recommend::{Recommendation, RecommendationSet};
pub use search::{SearchHit, SearchMetadata};

use fitfusion_config::Config;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client against the given base URL. A trailing slash on the
    /// base URL is tolerated and stripped.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .build()?;
        debug!(%base_url, "api client created");
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(config.api.base_url.clone())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Join an absolute API path (e.g. `/api/profile/`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
