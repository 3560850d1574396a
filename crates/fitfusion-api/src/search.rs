//! Vector search over the fitness-content index.
//!
//! The one call in the system with an explicit timeout: search is
//! interactive and a hung query is worse than a failed one.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{expect_success, ApiError};
use crate::ApiClient;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One vector-search match: the index id, similarity score, and the indexed
/// metadata snapshot.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
    #[serde(default)]
    pub metadata: SearchMetadata,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchMetadata {
    pub title: String,
    pub description: String,
    pub content_type: Option<String>,
    pub difficulty_level: Option<i64>,
    pub url: Option<String>,
    pub youtube_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

impl ApiClient {
    /// Semantic search over the content index. Empty filter values are
    /// omitted from the query string entirely, matching what the server
    /// expects.
    pub async fn search(
        &self,
        query: &str,
        content_type: Option<&str>,
        difficulty_level: Option<&str>,
    ) -> Result<Vec<SearchHit>, ApiError> {
        let mut params = vec![("query", query)];
        if let Some(content_type) = content_type.filter(|s| !s.is_empty()) {
            params.push(("content_type", content_type));
        }
        if let Some(level) = difficulty_level.filter(|s| !s.is_empty()) {
            params.push(("difficulty_level", level));
        }

        debug!(query, "searching fitness content");
        let response = self
            .http()
            .get(self.url("/api/fitness-content/search/"))
            .query(&params)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await?;
        let response = expect_success(response, "An error occurred while searching").await?;
        let body: SearchResponse = response.json().await?;
        debug!(query, hits = body.results.len(), "search completed");
        Ok(body.results)
    }
}
