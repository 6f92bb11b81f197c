use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::state::AppState;

/// GET <public base path>/:bucket/*path - objects held by the in-process store
pub async fn storage_get(
    State(state): State<AppState>,
    Path((bucket, path)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let path = path.trim_start_matches('/');
    let object = state
        .local_objects
        .as_ref()
        .and_then(|objects| objects.get(&bucket, path))
        .ok_or_else(|| ApiError::not_found(format!("No object at {}/{}", bucket, path)))?;

    let content_type = object
        .content_type
        .unwrap_or_else(|| "application/octet-stream".to_string());
    Ok(([(header::CONTENT_TYPE, content_type)], object.body).into_response())
}
