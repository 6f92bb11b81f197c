use axum::extract::{rejection::JsonRejection, State};
use axum::Json;

use crate::database::models::ApplicationReceipt;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::contact_service::{self, ContactForm};
use crate::state::AppState;

/// POST /api/apply - contact / apply form
pub async fn apply_post(
    State(state): State<AppState>,
    payload: Result<Json<ContactForm>, JsonRejection>,
) -> ApiResult<ApplicationReceipt> {
    let Json(form) = payload?;
    let receipt = contact_service::submit(
        state.applications.as_ref(),
        state.mailer.as_ref(),
        &state.config.mail.admin_address,
        &form,
    )
    .await?;
    Ok(ApiResponse::created(receipt))
}
