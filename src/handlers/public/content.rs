use axum::extract::{Path, State};
use serde_json::Value;

use crate::content::store;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/content/:key - published page document
///
/// Read failures are logged and served as `{}` so the page renders with defaults.
pub async fn content_get(State(state): State<AppState>, Path(key): Path<String>) -> ApiResult<Value> {
    let schema = state.registry.get_schema(&key)?;
    let loaded = store::load(state.content.as_ref(), &schema).await;
    Ok(ApiResponse::success(loaded.document.to_value()))
}
