use axum::extract::{multipart::Multipart, multipart::MultipartRejection, Extension, Query, State};
use serde::{Deserialize, Serialize};

use super::read_file_part;
use crate::content::FieldSlot;
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Uploaded {
    pub folder: String,
    pub url: Option<String>,
}

/// POST /api/admin/uploads?folder=<ns> - image upload outside any page field
pub async fn upload_post(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Query(query): Query<UploadQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Uploaded> {
    let folder = match query.folder.as_deref().map(str::trim) {
        Some(folder) if !folder.is_empty() => normalize_folder(folder)?,
        _ => state.config.storage.default_folder.clone(),
    };

    let file = read_file_part(multipart).await?;
    let slot = FieldSlot::new(admin.owner_key(), folder.clone(), "upload");
    let url = state.uploader.upload(&slot, &folder, file).await?;

    Ok(ApiResponse::success(Uploaded { folder, url }))
}

/// Folder names are `/`-separated segments of letters, digits, `_` and `-`.
fn normalize_folder(raw: &str) -> Result<String, ApiError> {
    let segments: Vec<&str> = raw.split('/').filter(|s| !s.is_empty()).collect();
    let legal = |s: &&str| {
        s.chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    };

    if segments.is_empty() || !segments.iter().all(legal) {
        return Err(ApiError::field_error("folder", format!("Invalid folder '{}'", raw)));
    }
    Ok(segments.join("/"))
}
