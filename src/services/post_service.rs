use std::collections::HashMap;

use serde::Deserialize;

use crate::database::models::{Post, PostInput};
use crate::database::{DatabaseError, PostStore};

/// Create/update body. Missing `is_published` means published on create and unchanged on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostPayload {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub is_published: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum PostError {
    #[error("Invalid post")]
    Invalid(HashMap<String, String>),

    #[error("Invalid post id: {0}")]
    InvalidId(String),

    #[error("Post {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Ids are positive integers
pub fn parse_id(raw: &str) -> Result<i64, PostError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(PostError::InvalidId(raw.to_string())),
    }
}

impl PostPayload {
    fn validate(&self, default_published: bool) -> Result<PostInput, PostError> {
        let mut errors = HashMap::new();
        let title = self.title.as_deref().map(str::trim).unwrap_or("");
        let content = self.content.as_deref().map(str::trim).unwrap_or("");

        if title.is_empty() {
            errors.insert("title".to_string(), "Title is required".to_string());
        }
        if content.is_empty() {
            errors.insert("content".to_string(), "Content is required".to_string());
        }
        if !errors.is_empty() {
            return Err(PostError::Invalid(errors));
        }

        Ok(PostInput {
            title: title.to_string(),
            content: content.to_string(),
            is_published: self.is_published.unwrap_or(default_published),
        })
    }
}

pub async fn find(store: &dyn PostStore, id: i64) -> Result<Post, PostError> {
    store.find(id).await?.ok_or(PostError::NotFound(id))
}

/// Published post for the public site; drafts look missing
pub async fn find_published(store: &dyn PostStore, id: i64) -> Result<Post, PostError> {
    match store.find(id).await? {
        Some(post) if post.is_published => Ok(post),
        _ => Err(PostError::NotFound(id)),
    }
}

pub async fn create(store: &dyn PostStore, payload: &PostPayload) -> Result<Post, PostError> {
    let input = payload.validate(true)?;
    let post = store.create(&input).await?;
    tracing::info!(id = post.id, published = post.is_published, "Post created");
    Ok(post)
}

pub async fn update(store: &dyn PostStore, id: i64, payload: &PostPayload) -> Result<Post, PostError> {
    let current = find(store, id).await?;
    let input = payload.validate(current.is_published)?;
    let post = store.update(id, &input).await?.ok_or(PostError::NotFound(id))?;
    tracing::info!(id, "Post updated");
    Ok(post)
}

pub async fn set_published(store: &dyn PostStore, id: i64, published: bool) -> Result<Post, PostError> {
    let post = store
        .set_published(id, published)
        .await?
        .ok_or(PostError::NotFound(id))?;
    tracing::info!(id, published, "Post publish state changed");
    Ok(post)
}

pub async fn delete(store: &dyn PostStore, id: i64) -> Result<(), PostError> {
    if !store.delete(id).await? {
        return Err(PostError::NotFound(id));
    }
    tracing::info!(id, "Post deleted");
    Ok(())
}
