//! Farmer profiles — optional per-user defaults applied before routing

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::types::Language;

/// Stored preferences for a known farmer. Fields fill in whatever the
/// incoming request left blank; they never override explicit values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_language: Option<Language>,
}

/// Source of farmer profiles, keyed by user ID
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Look up a profile. `Ok(None)` means the user is unknown.
    async fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>>;
}

/// In-memory profile store
pub struct InMemoryProfileStore {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert or replace a profile
    pub async fn insert(&self, user_id: &str, profile: Profile) {
        let mut profiles = self.profiles.write().await;
        profiles.insert(user_id.to_string(), profile);
        debug!("Stored profile for '{}'", user_id);
    }

    /// Number of stored profiles
    pub async fn count(&self) -> usize {
        self.profiles.read().await.len()
    }
}

impl Default for InMemoryProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> anyhow::Result<Option<Profile>> {
        let profiles = self.profiles.read().await;
        Ok(profiles.get(user_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let store = InMemoryProfileStore::new();
        store
            .insert(
                "+221771234567",
                Profile {
                    city: Some("kaolack".to_string()),
                    preferred_language: Some(Language::Wo),
                },
            )
            .await;

        let profile = store.get_profile("+221771234567").await.unwrap();
        assert!(profile.is_some());
        let profile = profile.unwrap();
        assert_eq!(profile.city.as_deref(), Some("kaolack"));
        assert_eq!(profile.preferred_language, Some(Language::Wo));
    }

    #[tokio::test]
    async fn test_unknown_user_is_none() {
        let store = InMemoryProfileStore::new();
        let profile = store.get_profile("nobody").await.unwrap();
        assert!(profile.is_none());
        assert_eq!(store.count().await, 0);
    }

    #[tokio::test]
    async fn test_insert_replaces() {
        let store = InMemoryProfileStore::new();
        store
            .insert(
                "u1",
                Profile {
                    city: Some("dakar".to_string()),
                    preferred_language: None,
                },
            )
            .await;
        store
            .insert(
                "u1",
                Profile {
                    city: Some("thies".to_string()),
                    preferred_language: None,
                },
            )
            .await;

        assert_eq!(store.count().await, 1);
        let profile = store.get_profile("u1").await.unwrap().unwrap();
        assert_eq!(profile.city.as_deref(), Some("thies"));
    }
}
