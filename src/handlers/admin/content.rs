use axum::{
    extract::{multipart::Multipart, multipart::MultipartRejection, rejection::JsonRejection, Extension, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

use super::read_file_part;
use crate::content::{render, ContentDocument, ContentSchema, EditorError, EditorSession, EditorView};
use crate::error::ApiError;
use crate::middleware::{AdminUser, ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/admin/content - editable pages, in tab order
pub async fn content_list(State(state): State<AppState>) -> ApiResult<Vec<ContentSchema>> {
    let schemas = state.registry.iter().map(|s| s.as_ref().clone()).collect();
    Ok(ApiResponse::success(schemas))
}

/// GET /api/admin/content/:key - editor view with the stored document
pub async fn content_get(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(key): Path<String>,
) -> ApiResult<EditorView> {
    let session = EditorSession::open_loaded(state.editor_context(), admin.owner_key(), &key).await?;
    Ok(ApiResponse::success(session.view()))
}

/// GET /api/admin/content/:key/form - the editor as an HTML form
pub async fn content_form(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(key): Path<String>,
) -> Response {
    match EditorSession::open_loaded(state.editor_context(), admin.owner_key(), &key).await {
        Ok(session) => Html(render::render_form(&session.view())).into_response(),
        Err(EditorError::UnknownSchema(key)) => {
            (StatusCode::NOT_FOUND, Html(render::render_unknown_key(&key))).into_response()
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// PUT /api/admin/content/:key - apply field edits and save
///
/// Keys not in the body keep their stored values.
pub async fn content_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(key): Path<String>,
    payload: Result<Json<Map<String, Value>>, JsonRejection>,
) -> ApiResult<EditorView> {
    let Json(edits) = payload?;
    let mut session = EditorSession::open_loaded(state.editor_context(), admin.owner_key(), &key).await?;

    // Merging into an empty draft would drop every stored key not in `edits`.
    if let Some(cause) = session.error() {
        tracing::warn!(content_key = %key, error = %cause, "Refusing to merge edits after failed load");
        return Err(ApiError::bad_gateway(format!("Failed to load '{}'", key)));
    }

    for (field, value) in edits {
        let Value::String(value) = value else {
            return Err(ApiError::field_error(field, "Field values must be strings"));
        };
        session.set_field(&field, value)?;
    }

    session.save().await?;
    tracing::info!(content_key = %key, admin = %admin.user_id, "Content edited");
    Ok(ApiResponse::success(session.view()))
}

/// PUT /api/admin/content/:key/raw - replace the document wholesale
pub async fn content_raw_put(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(key): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<EditorView> {
    let Json(value) = payload?;
    let Value::Object(document) = value else {
        return Err(ApiError::invalid_json("Content must be a JSON object"));
    };

    let mut session = EditorSession::open_loaded(state.editor_context(), admin.owner_key(), &key).await?;
    session.replace_document(document)?;
    session.save().await?;
    tracing::info!(content_key = %key, admin = %admin.user_id, "Content replaced from raw JSON");
    Ok(ApiResponse::success(session.view()))
}

#[derive(Debug, Serialize)]
pub struct ImageUploaded {
    pub field: String,
    pub url: Option<String>,
    pub document: ContentDocument,
}

/// POST /api/admin/content/:key/images/:field - upload an image for one field
///
/// The returned document is the draft with the new URL; it is not saved.
pub async fn content_image_post(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path((key, field)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ImageUploaded> {
    let mut session = EditorSession::open_loaded(state.editor_context(), admin.owner_key(), &key).await?;
    let file = read_file_part(multipart).await?;

    let url = session.upload_image(&field, file).await?;
    Ok(ApiResponse::success(ImageUploaded {
        field,
        url,
        document: session.draft().clone(),
    }))
}
