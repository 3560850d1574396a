//! Profile endpoints: the basic user profile plus the physical, fitness and
//! dietary sub-profiles, and the combined setup round-trip.
//!
//! The models mirror the server serializers. Everything defaults so that a
//! user who has not completed setup still deserializes cleanly.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{expect_success, ApiError};
use crate::ApiClient;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: Option<u32>,
    pub occupation: String,
    pub about_me: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PhysicalProfile {
    /// Height in cm.
    pub height: u32,
    /// Weight in kg.
    pub weight: u32,
    pub gender: String,
    pub body_fat: Option<u32>,
    pub body_mass: Option<u32>,
    pub health_condition: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitnessProfile {
    /// 1 = beginner through 5 = professional.
    pub fitness_level: i32,
    /// Workouts per week.
    pub workout_frequency: u32,
    /// Minutes per session.
    pub workout_duration: u32,
    /// Scale of 1-10.
    pub workout_intensity: u32,
    pub workout_type: String,
    pub workout_equipment: String,
    pub workout_style: String,
    pub workout_goal: String,
    pub health_goal: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DietaryProfile {
    pub diet_preference: String,
    pub diet_allergies: String,
    pub diet_restrictions: String,
    pub diet_preferences: String,
    pub diet_goal: String,
}

/// The combined payload exchanged with `/api/profile/setup/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileBundle {
    pub user_profile: UserProfile,
    pub physical_profile: PhysicalProfile,
    pub fitness_profile: FitnessProfile,
    pub dietary_profile: DietaryProfile,
}

impl ApiClient {
    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.fetch_json("/api/profile/", "Failed to fetch profile").await
    }

    pub async fn physical_profile(&self) -> Result<PhysicalProfile, ApiError> {
        self.fetch_json("/api/profile/physical/", "Failed to fetch physical profile")
            .await
    }

    pub async fn fitness_profile(&self) -> Result<FitnessProfile, ApiError> {
        self.fetch_json("/api/profile/fitness/", "Failed to fetch fitness profile")
            .await
    }

    pub async fn dietary_profile(&self) -> Result<DietaryProfile, ApiError> {
        self.fetch_json("/api/profile/dietary/", "Failed to fetch dietary profile")
            .await
    }

    /// Full user details from the protected detail endpoint (also the
    /// endpoint `is_authenticated` probes).
    pub async fn user_details(&self) -> Result<UserProfile, ApiError> {
        self.fetch_json("/api/profile/detail/", "Failed to fetch user details")
            .await
    }

    /// Current state of all four profile sections, with server-side defaults
    /// filled in for sections the user has not created yet.
    pub async fn profile_setup(&self) -> Result<ProfileBundle, ApiError> {
        self.fetch_json("/api/profile/setup/", "Failed to fetch profile setup data")
            .await
    }

    /// Create or update all profile sections in one call. The response body
    /// is a per-section status summary whose shape varies, so it is returned
    /// as raw JSON.
    pub async fn submit_profile_setup(&self, bundle: &ProfileBundle) -> Result<Value, ApiError> {
        let response = self
            .http()
            .post(self.url("/api/profile/setup/"))
            .json(bundle)
            .send()
            .await?;
        let response = expect_success(response, "Failed to save profile setup").await?;
        Ok(response.json().await?)
    }

    /// Shared GET-and-decode path for the read-only profile wrappers.
    pub(crate) async fn fetch_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let response = self.http().get(self.url(path)).send().await?;
        let response = expect_success(response, fallback).await?;
        Ok(response.json().await?)
    }
}
