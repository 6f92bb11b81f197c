use axum::extract::State;

use crate::database::models::Profile;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/admin/users - registered profiles, newest first
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<Profile>> {
    Ok(ApiResponse::success(state.profiles.list().await?))
}
