//! Fitness-content CRUD against `/api/fitness-content/[:id]/`.
//!
//! These endpoints require an admin session; a non-admin cookie gets a 403
//! which surfaces through the normal server-error path.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{expect_success, ApiError};
use crate::ApiClient;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    pub description: String,
    /// One of the server's content-type choices (workout, exercise, diet,
    /// tip, article).
    pub content_type: String,
    /// 1 = beginner through 5 = expert.
    pub difficulty_level: i32,
    pub url: Option<String>,
    pub youtube_url: Option<String>,
    pub equipment_required: String,
    pub duration_minutes: Option<u32>,
    pub calories_burned: Option<u32>,
    pub target_muscles: String,
    /// Set by the server once the content is indexed for vector search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embedding_id: Option<String>,
}

impl ApiClient {
    /// List content, optionally filtered by type and difficulty.
    pub async fn list_content(
        &self,
        content_type: Option<&str>,
        difficulty_level: Option<i32>,
    ) -> Result<Vec<FitnessContent>, ApiError> {
        let mut request = self.http().get(self.url("/api/fitness-content/"));
        if let Some(content_type) = content_type {
            request = request.query(&[("content_type", content_type)]);
        }
        if let Some(level) = difficulty_level {
            request = request.query(&[("difficulty_level", level.to_string())]);
        }
        let response = request.send().await?;
        let response = expect_success(response, "Failed to fetch fitness content").await?;
        Ok(response.json().await?)
    }

    pub async fn get_content(&self, id: u64) -> Result<FitnessContent, ApiError> {
        let response = self
            .http()
            .get(self.url(&format!("/api/fitness-content/{}/", id)))
            .send()
            .await?;
        let response = expect_success(response, "Fitness content not found").await?;
        Ok(response.json().await?)
    }

    pub async fn create_content(&self, content: &FitnessContent) -> Result<FitnessContent, ApiError> {
        let response = self
            .http()
            .post(self.url("/api/fitness-content/"))
            .json(content)
            .send()
            .await?;
        let response = expect_success(response, "Failed to create fitness content").await?;
        let created: FitnessContent = response.json().await?;
        debug!(id = ?created.id, title = %created.title, "fitness content created");
        Ok(created)
    }

    pub async fn update_content(
        &self,
        id: u64,
        content: &FitnessContent,
    ) -> Result<FitnessContent, ApiError> {
        let response = self
            .http()
            .put(self.url(&format!("/api/fitness-content/{}/", id)))
            .json(content)
            .send()
            .await?;
        let response = expect_success(response, "Failed to update fitness content").await?;
        Ok(response.json().await?)
    }

    pub async fn delete_content(&self, id: u64) -> Result<(), ApiError> {
        let response = self
            .http()
            .delete(self.url(&format!("/api/fitness-content/{}/", id)))
            .send()
            .await?;
        expect_success(response, "Failed to delete fitness content").await?;
        debug!(id, "fitness content deleted");
        Ok(())
    }
}
