use axum::extract::{Extension, State};
use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Role;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Whoami {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Role,
}

/// GET /api/auth/whoami - caller identity and resolved role
pub async fn whoami_get(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Whoami> {
    let role = state.profiles.find_role(user.user_id).await?;
    Ok(ApiResponse::success(Whoami {
        id: user.user_id,
        email: user.email,
        role: Role::from_db(role.as_deref()),
    }))
}
