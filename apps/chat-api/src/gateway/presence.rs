//! In-memory registry of connected users and their cached profile data.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::profile::ProfileClient;

/// A connected user as shown in presence lists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnlineUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_image_url: Option<String>,
    pub last_seen: NaiveDateTime,
}

/// Thread-safe, DashMap-backed presence registry.
///
/// Entries are inserted on connect and removed on disconnect. Profile data
/// comes from the auth service; a lookup failure degrades to a placeholder
/// profile so a flaky collaborator never blocks a connection.
pub struct PresenceRegistry {
    users: DashMap<i64, OnlineUser>,
    profiles: Arc<ProfileClient>,
}

impl PresenceRegistry {
    pub fn new(profiles: Arc<ProfileClient>) -> Self {
        Self {
            users: DashMap::new(),
            profiles,
        }
    }

    /// Register a user as online, fetching their profile from the auth
    /// service. Returns the registered entry.
    pub async fn mark_online(&self, user_id: i64) -> OnlineUser {
        let user = match self.profiles.fetch(user_id).await {
            Ok(profile) => OnlineUser {
                id: user_id,
                name: profile.name,
                email: profile.email,
                profile_image_url: profile.profile_image_url,
                last_seen: Utc::now().naive_utc(),
            },
            Err(err) => {
                tracing::warn!(user_id, ?err, "profile lookup failed, using placeholder");
                placeholder_user(user_id)
            }
        };

        self.users.insert(user_id, user.clone());
        user
    }

    pub fn mark_offline(&self, user_id: i64) {
        self.users.remove(&user_id);
    }

    /// Snapshot of everyone currently online. No ordering guarantee.
    pub fn snapshot(&self) -> Vec<OnlineUser> {
        self.users.iter().map(|e| e.value().clone()).collect()
    }

    pub fn get(&self, user_id: i64) -> Option<OnlineUser> {
        self.users.get(&user_id).map(|e| e.value().clone())
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.users.contains_key(&user_id)
    }
}

fn placeholder_user(user_id: i64) -> OnlineUser {
    OnlineUser {
        id: user_id,
        name: format!("User {user_id}"),
        email: format!("user{user_id}@example.com"),
        profile_image_url: Some("/assets/default-avatar.png".to_string()),
        last_seen: Utc::now().naive_utc(),
    }
}
