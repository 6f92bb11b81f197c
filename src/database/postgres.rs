use async_trait::async_trait;
use serde_json::Value;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use super::manager::{DatabaseError, DatabaseManager};
use super::models::{ApplicationReceipt, NewApplication, Post, PostInput, PostSummary, Profile};
use super::stores::{ApplicationStore, ContentStore, HealthCheck, PostStore, ProfileStore};

const POST_COLUMNS: &str = "id, title, content, is_published, created_at";

/// All stores backed by one Postgres pool
#[derive(Clone)]
pub struct PgBackend {
    pool: PgPool,
}

impl PgBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentStore for PgBackend {
    async fn fetch(&self, key: &str) -> Result<Option<Value>, DatabaseError> {
        let value = sqlx::query_scalar::<_, Value>("SELECT value FROM site_content WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn upsert(&self, key: &str, value: &Value) -> Result<(), DatabaseError> {
        let query = r#"
            INSERT INTO site_content (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = now()
        "#;

        sqlx::query(query)
            .bind(key)
            .bind(Json(value))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for PgBackend {
    async fn find_role(&self, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
        let role = sqlx::query_scalar::<_, Option<String>>("SELECT role FROM profiles WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(role.flatten())
    }

    async fn list(&self) -> Result<Vec<Profile>, DatabaseError> {
        let rows = sqlx::query_as::<_, Profile>(
            "SELECT id, role, email, created_at FROM profiles ORDER BY created_at DESC NULLS LAST",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}

#[async_trait]
impl PostStore for PgBackend {
    async fn list_all(&self) -> Result<Vec<PostSummary>, DatabaseError> {
        let rows = sqlx::query_as::<_, PostSummary>(
            "SELECT id, title, is_published, created_at FROM posts ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_published(&self) -> Result<Vec<Post>, DatabaseError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE is_published = true ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, Post>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find(&self, id: i64) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create(&self, input: &PostInput) -> Result<Post, DatabaseError> {
        let sql = format!(
            "INSERT INTO posts (title, content, is_published) VALUES ($1, $2, $3) RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_published)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i64, input: &PostInput) -> Result<Option<Post>, DatabaseError> {
        let sql = format!(
            "UPDATE posts SET title = $2, content = $3, is_published = $4 WHERE id = $1 RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(input.is_published)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_published(&self, id: i64, published: bool) -> Result<Option<Post>, DatabaseError> {
        let sql = format!("UPDATE posts SET is_published = $2 WHERE id = $1 RETURNING {POST_COLUMNS}");
        let row = sqlx::query_as::<_, Post>(&sql)
            .bind(id)
            .bind(published)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicationStore for PgBackend {
    async fn insert(&self, application: &NewApplication) -> Result<ApplicationReceipt, DatabaseError> {
        let receipt = sqlx::query_as::<_, ApplicationReceipt>(
            "INSERT INTO applications (name, email, message) VALUES ($1, $2, $3) RETURNING id, created_at",
        )
        .bind(&application.name)
        .bind(&application.email)
        .bind(&application.message)
        .fetch_one(&self.pool)
        .await?;
        Ok(receipt)
    }
}

#[async_trait]
impl HealthCheck for PgBackend {
    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}
