//! Personalized recommendations built server-side from the user's profiles.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::error::{expect_success, ApiError};
use crate::ApiClient;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationSet {
    pub workout_recommendations: Vec<Recommendation>,
    pub nutrition_recommendations: Vec<Recommendation>,
    pub lifestyle_recommendations: Vec<Recommendation>,
}

/// One recommendation entry. The server varies the fields per category
/// (workout entries carry frequency/duration, nutrition and lifestyle
/// entries carry recommendation/reasoning), so everything beyond the
/// category is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Recommendation {
    pub category: String,
    pub frequency: Option<String>,
    pub duration: Option<String>,
    pub description: Option<String>,
    pub focus: Option<String>,
    pub intensity: Option<String>,
    pub recommendation: Option<String>,
    pub reasoning: Option<String>,
}

impl ApiClient {
    /// Request a fresh recommendation set. The server reads the profiles
    /// from the session, so the request body is empty.
    pub async fn recommendations(&self) -> Result<RecommendationSet, ApiError> {
        debug!("fetching recommendations");
        let response = self
            .http()
            .post(self.url("/api/recommendations/"))
            .json(&json!({}))
            .send()
            .await?;
        let response = expect_success(response, "Failed to fetch recommendations").await?;
        Ok(response.json().await?)
    }
}
