use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::database::models::{Post, PostSummary};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::post_service::{self, PostPayload};
use crate::state::AppState;

/// GET /api/admin/posts - every post, drafts included
pub async fn post_list(State(state): State<AppState>) -> ApiResult<Vec<PostSummary>> {
    Ok(ApiResponse::success(state.posts.list_all().await?))
}

/// POST /api/admin/posts
pub async fn post_create(
    State(state): State<AppState>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<Post> {
    let Json(payload) = payload?;
    let post = post_service::create(state.posts.as_ref(), &payload).await?;
    Ok(ApiResponse::created(post))
}

/// GET /api/admin/posts/:id
pub async fn post_get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Post> {
    let id = post_service::parse_id(&id)?;
    Ok(ApiResponse::success(post_service::find(state.posts.as_ref(), id).await?))
}

/// PUT /api/admin/posts/:id
pub async fn post_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PostPayload>, JsonRejection>,
) -> ApiResult<Post> {
    let id = post_service::parse_id(&id)?;
    let Json(payload) = payload?;
    let post = post_service::update(state.posts.as_ref(), id, &payload).await?;
    Ok(ApiResponse::success(post))
}

#[derive(Debug, Deserialize)]
pub struct PublishBody {
    pub is_published: bool,
}

/// PATCH /api/admin/posts/:id/publish
pub async fn post_publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PublishBody>, JsonRejection>,
) -> ApiResult<Post> {
    let id = post_service::parse_id(&id)?;
    let Json(body) = payload?;
    let post = post_service::set_published(state.posts.as_ref(), id, body.is_published).await?;
    Ok(ApiResponse::success(post))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: i64,
    pub deleted: bool,
}

/// DELETE /api/admin/posts/:id
pub async fn post_delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Deleted> {
    let id = post_service::parse_id(&id)?;
    post_service::delete(state.posts.as_ref(), id).await?;
    Ok(ApiResponse::success(Deleted { id, deleted: true }))
}
