use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::database::models::Role;
use crate::error::ApiError;
use crate::state::AppState;

/// Caller that passed the admin check
#[derive(Clone, Debug)]
pub struct AdminUser {
    pub user_id: Uuid,
    pub email: Option<String>,
}

impl AdminUser {
    /// Key for per-admin state such as in-flight uploads
    pub fn owner_key(&self) -> String {
        self.user_id.to_string()
    }
}

/// Middleware that lets a request through only when the caller's profile role is `admin`.
///
/// Must run after `jwt_auth_middleware`. A missing profile row counts as a plain user.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .cloned()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before admin check"))?;

    let role = state
        .profiles
        .find_role(auth_user.user_id)
        .await
        .map_err(|e| {
            tracing::error!("Role lookup failed for {}: {}", auth_user.user_id, e);
            ApiError::internal_server_error("Failed to verify user role")
        })?;

    if !Role::from_db(role.as_deref()).is_admin() {
        tracing::warn!("Admin check failed for user {}", auth_user.user_id);
        return Err(ApiError::forbidden("Admin access required"));
    }

    tracing::debug!("Admin check passed for user {}", auth_user.user_id);
    request.extensions_mut().insert(AdminUser {
        user_id: auth_user.user_id,
        email: auth_user.email,
    });

    Ok(next.run(request).await)
}
