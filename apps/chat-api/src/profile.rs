//! HTTP client for the auth service's user-profile endpoint.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ApiError;

/// How long to wait on a profile lookup before giving up. Connection setup
/// degrades to a placeholder profile on failure, so this stays short.
const FETCH_TIMEOUT: Duration = Duration::from_secs(3);

/// Profile payload served by `GET /api/auth/user/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub profile_image_url: Option<String>,
}

#[derive(Clone)]
pub struct ProfileClient {
    base_url: String,
    http: reqwest::Client,
}

impl ProfileClient {
    pub fn new(auth_service_url: &str) -> Self {
        Self {
            base_url: auth_service_url.trim_end_matches('/').to_string(),
            http: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .expect("failed to build http client"),
        }
    }

    /// Fetch the profile for a user ID. Callers decide how to degrade on
    /// failure — the presence registry substitutes a placeholder.
    pub async fn fetch(&self, user_id: i64) -> Result<UserProfile, ApiError> {
        let url = format!("{}/api/auth/user/{}", self.base_url, user_id);
        let resp = self.http.get(&url).send().await?.error_for_status()?;
        let profile = resp.json::<UserProfile>().await?;
        Ok(profile)
    }
}
