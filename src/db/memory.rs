use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::{CatalogStore, CounterStore, UserStore},
    error::{AppError, AppResult},
    models::{Destination, DestinationTag, NewDestination, NewUser, Tag, User},
};

/// `(name, label)` rows inserted by `migrations/20250101000001_seed_tags.sql`
pub const REFERENCE_TAGS: &[(&str, &str)] = &[
    ("sightseeing", "Sightseeing"),
    ("relaxation", "Relaxation"),
    ("beach", "Beach"),
    ("mountain", "Mountain"),
    ("solo", "Solo"),
    ("friends", "Friends"),
    ("family", "Family"),
    ("couple", "Couple"),
    ("warm", "Warm"),
    ("comfortable", "Comfortable"),
    ("cool", "Cool"),
    ("cold", "Cold"),
    ("traditional", "Traditional food"),
    ("fusion", "Fusion food"),
    ("street", "Street food"),
    ("vegan", "Vegan"),
    ("car", "Car"),
    ("public", "Public transport"),
    ("walk", "Walking"),
    ("bus", "Bus"),
    ("leisure", "Leisurely pace"),
    ("normal", "Normal pace"),
    ("tight", "Tight schedule"),
    ("spontaneous", "Spontaneous"),
];

/// In-process store used by tests and database-less runs
///
/// Cloning shares the underlying data. Every trait method takes the lock once,
/// so the survey counter increments atomically.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    tags: BTreeMap<i32, Tag>,
    destinations: BTreeMap<i32, Destination>,
    destination_tags: Vec<DestinationTag>,
    users: Vec<User>,
    survey_calls: i64,
    next_id: i32,
}

impl MemoryStoreInner {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose tag table holds the given `(name, label)` pairs
    pub async fn with_tags<'a>(
        tags: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> AppResult<Self> {
        let store = Self::new();
        for (name, label) in tags {
            store.insert_tag(name, label).await?;
        }
        Ok(store)
    }

    /// Store seeded with the same tag vocabulary as the seed migration
    pub async fn with_reference_tags() -> AppResult<Self> {
        Self::with_tags(REFERENCE_TAGS.iter().copied()).await
    }

    /// Adds a tag. Names are unique, as in the `tag` table.
    pub async fn insert_tag(&self, name: &str, label: &str) -> AppResult<i32> {
        let mut inner = self.inner.write().await;
        if inner.tags.values().any(|tag| tag.name == name) {
            return Err(AppError::InvalidInput(format!(
                "Tag {} already exists",
                name
            )));
        }

        let id = inner.next_id();
        inner.tags.insert(
            id,
            Tag {
                id,
                name: name.to_string(),
                label: label.to_string(),
            },
        );
        Ok(id)
    }

    pub async fn insert_destination(&self, new_destination: NewDestination) -> i32 {
        let mut inner = self.inner.write().await;
        let id = inner.next_id();
        let now = Utc::now();
        inner.destinations.insert(
            id,
            Destination {
                id,
                name: new_destination.name,
                country: new_destination.country,
                description: new_destination.description,
                latitude: new_destination.latitude,
                longitude: new_destination.longitude,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            },
        );
        id
    }

    /// Records the relevance `score` of a tag for a destination
    ///
    /// A destination holds at most one link per tag.
    pub async fn link(&self, destination_id: i32, tag_id: i32, score: i32) -> AppResult<i32> {
        let mut inner = self.inner.write().await;
        if inner
            .destination_tags
            .iter()
            .any(|row| row.destination_id == destination_id && row.tag_id == tag_id)
        {
            return Err(AppError::InvalidInput(format!(
                "Destination {} is already linked to tag {}",
                destination_id, tag_id
            )));
        }

        let id = inner.next_id();
        inner.destination_tags.push(DestinationTag {
            id,
            destination_id,
            tag_id,
            score,
            weight_score: 0,
        });
        Ok(id)
    }

    pub async fn soft_delete_destination(&self, id: i32) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let destination = inner
            .destinations
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("Destination {}", id)))?;
        let now = Utc::now();
        destination.deleted_at = Some(now);
        destination.updated_at = now;
        Ok(())
    }

    /// Drops the destination row but keeps its tag links, leaving them dangling
    pub async fn remove_destination(&self, id: i32) -> Option<Destination> {
        self.inner.write().await.destinations.remove(&id)
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryStore {
    async fn tags_by_names(&self, names: &[String]) -> AppResult<Vec<Tag>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tags
            .values()
            .filter(|tag| names.contains(&tag.name))
            .cloned()
            .collect())
    }

    async fn destination_tags_by_tag_ids(
        &self,
        tag_ids: &[i32],
    ) -> AppResult<Vec<DestinationTag>> {
        let inner = self.inner.read().await;
        Ok(inner
            .destination_tags
            .iter()
            .filter(|row| tag_ids.contains(&row.tag_id))
            .cloned()
            .collect())
    }

    async fn destination_by_id(&self, id: i32) -> AppResult<Option<Destination>> {
        let inner = self.inner.read().await;
        Ok(inner
            .destinations
            .get(&id)
            .filter(|destination| destination.is_live())
            .cloned())
    }

    async fn list_tags(&self) -> AppResult<Vec<Tag>> {
        Ok(self.inner.read().await.tags.values().cloned().collect())
    }

    async fn list_destinations(&self) -> AppResult<Vec<Destination>> {
        let inner = self.inner.read().await;
        Ok(inner
            .destinations
            .values()
            .filter(|destination| destination.is_live())
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .iter()
            .find(|user| user.email == email && user.deleted_at.is_none())
            .cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .iter()
            .any(|user| user.email == new_user.email && user.deleted_at.is_none())
        {
            return Err(AppError::InvalidInput(
                "Email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: inner.users.len() as i64 + 1,
            public_id: Uuid::new_v4(),
            email: new_user.email,
            password: new_user.password_hash,
            nickname: new_user.nickname,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        inner.users.push(user.clone());
        Ok(user)
    }
}

#[async_trait::async_trait]
impl CounterStore for MemoryStore {
    async fn increment_survey_calls(&self) -> AppResult<i64> {
        let mut inner = self.inner.write().await;
        inner.survey_calls += 1;
        Ok(inner.survey_calls)
    }

    async fn survey_calls(&self) -> AppResult<i64> {
        Ok(self.inner.read().await.survey_calls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ProfileBuilder;

    fn new_destination(name: &str) -> NewDestination {
        NewDestination {
            name: name.to_string(),
            country: "Japan".to_string(),
            description: format!("{} description", name),
            latitude: 35.0,
            longitude: 135.0,
        }
    }

    #[tokio::test]
    async fn test_tags_by_names_skips_unknown() {
        let store = MemoryStore::with_tags([("beach", "Beach"), ("solo", "Solo")])
            .await
            .unwrap();

        let tags = store
            .tags_by_names(&["beach".to_string(), "volcano".to_string()])
            .await
            .unwrap();

        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "beach");
    }

    #[tokio::test]
    async fn test_soft_deleted_destination_hidden() {
        let store = MemoryStore::new();
        let kyoto = store.insert_destination(new_destination("Kyoto")).await;
        let osaka = store.insert_destination(new_destination("Osaka")).await;

        store.soft_delete_destination(kyoto).await.unwrap();

        assert_eq!(store.destination_by_id(kyoto).await.unwrap(), None);
        let live = store.list_destinations().await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id, osaka);
    }

    #[tokio::test]
    async fn test_soft_delete_unknown_destination_fails() {
        let store = MemoryStore::new();
        let result = store.soft_delete_destination(42).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let store = MemoryStore::new();
        let new_user = NewUser {
            email: "lee@example.com".to_string(),
            password_hash: "hash".to_string(),
            nickname: "lee".to_string(),
        };

        let created = store.create_user(new_user.clone()).await.unwrap();
        assert_eq!(created.id, 1);

        let result = store.create_user(new_user).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_survey_counter_increments() {
        let store = MemoryStore::new();
        assert_eq!(store.survey_calls().await.unwrap(), 0);
        assert_eq!(store.increment_survey_calls().await.unwrap(), 1);
        assert_eq!(store.increment_survey_calls().await.unwrap(), 2);
        assert_eq!(store.survey_calls().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let store = MemoryStore::new();
        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.increment_survey_calls().await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(store.survey_calls().await.unwrap(), 50);
    }

    #[tokio::test]
    async fn test_duplicate_tag_name_rejected() {
        let store = MemoryStore::new();
        store.insert_tag("beach", "Beach").await.unwrap();

        let result = store.insert_tag("beach", "Seaside").await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let result = MemoryStore::with_tags([("beach", "Beach"), ("beach", "Beach")]).await;
        assert!(result.is_err());
        assert_eq!(store.list_tags().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_link_rejected() {
        let store = MemoryStore::new();
        let beach = store.insert_tag("beach", "Beach").await.unwrap();
        let busan = store.insert_destination(new_destination("Busan")).await;
        store.link(busan, beach, 10).await.unwrap();

        let result = store.link(busan, beach, 10).await;
        assert!(matches!(result, Err(AppError::InvalidInput(_))));

        let rows = store.destination_tags_by_tag_ids(&[beach]).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_reference_tags_cover_the_survey() {
        let store = MemoryStore::with_reference_tags().await.unwrap();
        let names: Vec<String> = store
            .list_tags()
            .await
            .unwrap()
            .into_iter()
            .map(|tag| tag.name)
            .collect();

        let builder = ProfileBuilder::reference();
        let survey: Vec<String> = builder
            .tag_names()
            .into_iter()
            .map(|tag| tag.as_str().to_string())
            .collect();

        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(sorted, survey);
    }

    #[test]
    fn test_reference_tags_match_seed_migration() {
        let seed = include_str!("../../migrations/20250101000001_seed_tags.sql");
        for (name, label) in REFERENCE_TAGS {
            assert!(
                seed.contains(&format!("('{}', '{}')", name, label)),
                "{name} / {label} missing from seed migration"
            );
        }
        assert_eq!(seed.matches("('").count(), REFERENCE_TAGS.len());
    }
}
