// Admin handlers: every route here sits behind `require_admin`.
pub mod content;
pub mod posts;
pub mod uploads;
pub mod users;

pub use content::{
    content_form, content_get, content_image_post, content_list, content_put, content_raw_put,
};
pub use posts::{post_create, post_delete, post_get, post_list, post_publish, post_update};
pub use uploads::upload_post;
pub use users::user_list;

use axum::extract::multipart::{Multipart, MultipartRejection};

use crate::content::LocalFile;
use crate::error::ApiError;

/// Pull the `file` part out of a multipart body.
///
/// An absent part or an empty unnamed part means nothing was picked.
pub(crate) async fn read_file_part(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<LocalFile>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        if file_name.is_empty() && bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(LocalFile {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        }));
    }

    Ok(None)
}
