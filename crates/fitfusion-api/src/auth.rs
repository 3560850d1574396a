//! Authentication endpoints: login, logout, register, session probe.
//!
//! The server issues httponly session cookies on login; the client's cookie
//! jar carries them from then on, so none of these calls return tokens.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use crate::error::{expect_success, flatten_field_errors, ApiError};
use crate::ApiClient;

/// Registration payload. Only username/email/password are required by the
/// server; the optional fields seed the physical/fitness/dietary profiles in
/// the same call.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occupation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about_me: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fitness_level: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_intensity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_goal: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_preference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diet_goal: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: u64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub profiles_created: ProfilesCreated,
    #[serde(default)]
    pub next_steps: Option<String>,
    #[serde(default)]
    pub setup_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct ProfilesCreated {
    #[serde(default)]
    pub basic_profile: bool,
    #[serde(default)]
    pub physical_profile: bool,
    #[serde(default)]
    pub fitness_profile: bool,
    #[serde(default)]
    pub dietary_profile: bool,
}

impl ApiClient {
    /// Exchange credentials for a cookie session. Nothing is returned on
    /// success; the cookie jar holds the session from here on.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), ApiError> {
        debug!(username, "logging in");
        let response = self
            .http()
            .post(self.url("/api/token/"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        expect_success(response, "Authentication failed").await?;
        debug!(username, "login succeeded");
        Ok(())
    }

    /// Ask the server to clear the session cookies. Best effort: a failure
    /// is logged and reported as `false` rather than raised, since the
    /// caller has nothing useful to do with a failed logout.
    pub async fn logout(&self) -> bool {
        let result = async {
            let response = self.http().post(self.url("/api/logout/")).send().await?;
            expect_success(response, "Logout failed").await?;
            Ok::<_, ApiError>(())
        }
        .await;

        match result {
            Ok(()) => true,
            Err(err) => {
                error!("logout failed: {err}");
                false
            }
        }
    }

    /// Create an account. Validation failures (HTTP 400) come back as a
    /// field-keyed error map which is flattened into a multi-line message.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let response = self
            .http()
            .post(self.url("/api/register/"))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<Value>(&body)
                .ok()
                .as_ref()
                .and_then(flatten_field_errors)
                .unwrap_or_else(|| "Registration failed".to_string());
            return Err(ApiError::Server { status, message });
        }

        Ok(response.json().await?)
    }

    /// Probe whether the cookie session is still valid by hitting a
    /// protected endpoint. Any failure, transport or server, reads as
    /// "not authenticated".
    pub async fn is_authenticated(&self) -> bool {
        match self.http().get(self.url("/api/profile/detail/")).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}
