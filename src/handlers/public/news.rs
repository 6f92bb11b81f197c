use axum::extract::{Path, State};

use crate::database::models::Post;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::post_service;
use crate::state::AppState;

/// GET /api/news - published posts, newest first
pub async fn news_list(State(state): State<AppState>) -> ApiResult<Vec<Post>> {
    let posts = state.posts.list_published().await?;
    Ok(ApiResponse::success(posts))
}

/// GET /api/news/:id
pub async fn news_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    let id = post_service::parse_id(&id)?;
    let post = post_service::find_published(state.posts.as_ref(), id).await?;
    Ok(ApiResponse::success(post))
}
