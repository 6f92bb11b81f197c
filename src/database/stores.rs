//! Collaborator contracts for the hosted tables.
//!
//! Each trait is one table's worth of operations. `PgBackend` implements them
//! against Postgres, `MemoryBackend` keeps everything in process.

use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use super::manager::DatabaseError;
use super::models::{ApplicationReceipt, NewApplication, Post, PostInput, PostSummary, Profile};

/// `site_content`: one opaque JSON document per content key
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<Value>, DatabaseError>;

    /// Insert or replace the document for `key`.
    async fn upsert(&self, key: &str, value: &Value) -> Result<(), DatabaseError>;
}

/// `profiles`: role lookup and the admin user list
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Raw role column for the user, `None` when there is no profile row.
    async fn find_role(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError>;

    /// All profiles, newest first.
    async fn list(&self) -> Result<Vec<Profile>, DatabaseError>;
}

/// `posts`
#[async_trait]
pub trait PostStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<PostSummary>, DatabaseError>;
    async fn list_published(&self) -> Result<Vec<Post>, DatabaseError>;
    async fn find(&self, id: i64) -> Result<Option<Post>, DatabaseError>;
    async fn create(&self, input: &PostInput) -> Result<Post, DatabaseError>;
    async fn update(&self, id: i64, input: &PostInput) -> Result<Option<Post>, DatabaseError>;
    async fn set_published(&self, id: i64, published: bool) -> Result<Option<Post>, DatabaseError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}

/// `applications`: contact form submissions
#[async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationReceipt, DatabaseError>;
}

/// Liveness check used by `/health`
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> Result<(), DatabaseError>;
}
