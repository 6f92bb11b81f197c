use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{ApplicationReceipt, NewApplication, Post, PostInput, PostSummary, Profile};
use super::stores::{ApplicationStore, ContentStore, HealthCheck, PostStore, ProfileStore};

/// In-process implementation of every store, for local runs and tests
#[derive(Default)]
pub struct MemoryBackend {
    content: RwLock<HashMap<String, Value>>,
    profiles: RwLock<Vec<Profile>>,
    posts: RwLock<BTreeMap<i64, Post>>,
    applications: RwLock<Vec<(ApplicationReceipt, NewApplication)>>,
    next_post_id: AtomicI64,
    next_application_id: AtomicI64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile row (e.g. the first admin)
    pub async fn add_profile(&self, id: Uuid, role: &str, email: Option<&str>) {
        self.profiles.write().await.push(Profile {
            id,
            role: role.to_string(),
            email: email.map(str::to_string),
            created_at: Some(Utc::now()),
        });
    }

    pub async fn applications(&self) -> Vec<(ApplicationReceipt, NewApplication)> {
        self.applications.read().await.clone()
    }
}

#[async_trait]
impl ContentStore for MemoryBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        Ok(self.content.read().await.get(key).cloned())
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), DatabaseError> {
        self.content
            .write()
            .await
            .insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryBackend {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        Ok(self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.id == user_id)
            .map(|p| p.role.clone()))
    }

    async fn list(&self) -> Result<Vec<Profile>, DatabaseError> {
        let mut rows = self.profiles.read().await.clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}

#[async_trait]
impl PostStore for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<PostSummary>, DatabaseError> {
        // Ids grow with creation time, so reverse id order is newest first.
        Ok(self.posts.read().await.values().rev().map(PostSummary::from).collect())
    }

    async fn list_published(&self) -> Result<Vec<Post>, DatabaseError> {
        Ok(self
            .posts
            .read()
            .await
            .values()
            .rev()
            .filter(|p| p.is_published)
            .cloned()
            .collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn create(&self, input: &PostInput) -> Result<Post, DatabaseError> {
        let id = self.next_post_id.fetch_add(1, Ordering::SeqCst) + 1;
        let post = Post {
            id,
            title: input.title.clone(),
            content: input.content.clone(),
            is_published: input.is_published,
            created_at: Utc::now(),
        };
        self.posts.write().await.insert(id, post.clone());
        Ok(post)
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<Option<Post>, DatabaseError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.title = input.title.clone();
            post.content = input.content.clone();
            post.is_published = input.is_published;
            post.clone()
        }))
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<Option<Post>, DatabaseError> {
        let mut posts = self.posts.write().await;
        Ok(posts.get_mut(&id).map(|post| {
            post.is_published = published;
            post.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.posts.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl ApplicationStore for MemoryBackend {
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationReceipt, DatabaseError> {
        let receipt = ApplicationReceipt {
            id: self.next_application_id.fetch_add(1, Ordering::SeqCst) + 1,
            created_at: Utc::now(),
        };
        self.applications
            .write()
            .await
            .push((receipt.clone(), application.clone()));
        Ok(receipt)
    }
}

#[async_trait]
impl HealthCheck for MemoryBackend {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}
