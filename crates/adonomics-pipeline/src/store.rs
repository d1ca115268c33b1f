//! Persistence boundary for advertisements and the preference records the
//! profile step reads.
//!
//! Every `update` is conditional on the record's `version`; a stale copy is
//! rejected with [`StoreError::VersionConflict`] and the stored version is
//! bumped on success.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use adonomics_core::{Advertisement, UserPreferences};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait AdvertisementStore: Send + Sync {
    async fn insert(&self, ad: &Advertisement) -> Result<Advertisement, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Advertisement, StoreError>;

    /// Newest first, at most `limit` records.
    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Advertisement>, StoreError>;

    /// Writes `ad` if its `version` still matches, returning the stored copy.
    async fn update(&self, ad: &Advertisement) -> Result<Advertisement, StoreError>;

    async fn preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError>;

    async fn save_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;
}

/// Postgres-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdvertisementStore for PgStore {
    async fn insert(&self, ad: &Advertisement) -> Result<Advertisement, StoreError> {
        Ok(adonomics_db::insert_advertisement(&self.pool, ad).await?)
    }

    async fn get(&self, id: Uuid) -> Result<Advertisement, StoreError> {
        Ok(adonomics_db::get_advertisement(&self.pool, id).await?)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Advertisement>, StoreError> {
        Ok(adonomics_db::list_advertisements_for_user(&self.pool, user_id, limit).await?)
    }

    async fn update(&self, ad: &Advertisement) -> Result<Advertisement, StoreError> {
        Ok(adonomics_db::update_advertisement(&self.pool, ad).await?)
    }

    async fn preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        Ok(adonomics_db::get_user_preferences(&self.pool, user_id).await?)
    }

    async fn save_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, StoreError> {
        Ok(adonomics_db::upsert_user_preferences(&self.pool, prefs).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(adonomics_db::health_check(&self.pool).await?)
    }
}

/// In-process store with the same version semantics as [`PgStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    ads: Mutex<HashMap<Uuid, Advertisement>>,
    preferences: Mutex<HashMap<String, UserPreferences>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ads(&self) -> MutexGuard<'_, HashMap<Uuid, Advertisement>> {
        self.ads.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn prefs(&self) -> MutexGuard<'_, HashMap<String, UserPreferences>> {
        self.preferences
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AdvertisementStore for MemoryStore {
    async fn insert(&self, ad: &Advertisement) -> Result<Advertisement, StoreError> {
        let mut ads = self.ads();
        if ads.contains_key(&ad.id) {
            return Err(StoreError::Backend(format!(
                "advertisement {} already exists",
                ad.id
            )));
        }
        ads.insert(ad.id, ad.clone());
        Ok(ad.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Advertisement, StoreError> {
        self.ads().get(&id).cloned().ok_or(StoreError::NotFound)
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        limit: i64,
    ) -> Result<Vec<Advertisement>, StoreError> {
        let mut ads: Vec<Advertisement> = self
            .ads()
            .values()
            .filter(|ad| ad.user_id == user_id)
            .cloned()
            .collect();
        ads.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        ads.truncate(usize::try_from(limit.max(0)).unwrap_or(usize::MAX));
        Ok(ads)
    }

    async fn update(&self, ad: &Advertisement) -> Result<Advertisement, StoreError> {
        let mut ads = self.ads();
        let conflict = StoreError::VersionConflict {
            id: ad.id,
            expected_version: ad.version,
        };
        let Some(stored) = ads.get_mut(&ad.id) else {
            return Err(conflict);
        };
        if stored.version != ad.version {
            return Err(conflict);
        }

        let mut next = ad.clone();
        next.version = ad.version + 1;
        next.updated_at = Utc::now();
        *stored = next.clone();
        Ok(next)
    }

    async fn preferences(&self, user_id: &str) -> Result<Option<UserPreferences>, StoreError> {
        Ok(self.prefs().get(user_id).cloned())
    }

    async fn save_preferences(
        &self,
        prefs: &UserPreferences,
    ) -> Result<UserPreferences, StoreError> {
        let mut saved = prefs.clone();
        saved.updated_at = Some(Utc::now());
        self.prefs().insert(saved.user_id.clone(), saved.clone());
        Ok(saved)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adonomics_core::{AdStatus, IndexedVideo, VideoSource};

    fn ad(user_id: &str) -> Advertisement {
        Advertisement::new_indexed(
            user_id,
            VideoSource::Url {
                url: "https://cdn.example/ad.mp4".to_string(),
            },
            IndexedVideo {
                index_id: "idx".to_string(),
                task_id: "t1".to_string(),
                video_id: "v1".to_string(),
            },
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn update_bumps_version_and_rejects_stale_copies() {
        let store = MemoryStore::new();
        let original = store.insert(&ad("u1")).await.expect("insert");

        let mut first = original.clone();
        first
            .transition(AdStatus::Analyzing, None, Utc::now())
            .expect("transition");
        let stored = store.update(&first).await.expect("first update");
        assert_eq!(stored.version, original.version + 1);

        let err = store.update(&first).await.expect_err("stale copy");
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn update_of_unknown_record_is_a_conflict() {
        let store = MemoryStore::new();
        let err = store.update(&ad("u1")).await.expect_err("missing row");
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store.get(Uuid::new_v4()).await.expect_err("missing");
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn list_filters_by_user_and_honours_limit() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.insert(&ad("u1")).await.expect("insert");
        }
        store.insert(&ad("u2")).await.expect("insert");

        let listed = store.list_for_user("u1", 2).await.expect("list");
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|a| a.user_id == "u1"));
    }

    #[tokio::test]
    async fn preferences_round_trip() {
        let store = MemoryStore::new();
        assert!(store.preferences("u1").await.expect("read").is_none());

        let mut prefs = UserPreferences::empty("u1");
        prefs.role = Some("marketer".to_string());
        store.save_preferences(&prefs).await.expect("save");

        let loaded = store.preferences("u1").await.expect("read").expect("present");
        assert_eq!(loaded.role.as_deref(), Some("marketer"));
        assert!(loaded.updated_at.is_some());
    }
}
