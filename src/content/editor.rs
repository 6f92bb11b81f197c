//! Editor session: binds one schema to one stored document.
//!
//! A session moves `Loading -> Ready -> (Saving -> Ready)*`. The error
//! indicator is independent of the state: a failed load still lands in
//! `Ready` with an empty draft, and a failed save returns to `Ready` with the
//! draft intact. Methods take `&mut self`, so load, save and upload never
//! overlap within one session.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use super::document::ContentDocument;
use super::schema::{ContentSchema, FieldKind, SchemaRegistry};
use super::store::{self, SaveFailure};
use super::upload::{FieldSlot, ImageFieldUploader, LocalFile, UploadError};
use crate::database::ContentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditorState {
    Loading,
    Ready,
    Saving,
}

impl fmt::Display for EditorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EditorState::Loading => "loading",
            EditorState::Ready => "ready",
            EditorState::Saving => "saving",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("Unknown key: {0}")]
    UnknownSchema(String),

    #[error("Field '{field}' is not declared for '{content_key}'")]
    UnknownField { content_key: String, field: String },

    #[error("Editor is {0}, not ready")]
    NotReady(EditorState),

    #[error("Field '{0}' is not an image field")]
    NotAnImageField(String),

    #[error("Field '{field}' must be empty or an absolute URL")]
    InvalidImageUrl { field: String, value: String },

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error(transparent)]
    Save(#[from] SaveFailure),
}

/// Shared collaborators every session needs
#[derive(Clone)]
pub struct EditorContext {
    pub registry: Arc<SchemaRegistry>,
    pub store: Arc<dyn ContentStore>,
    pub uploader: Arc<ImageFieldUploader>,
}

pub struct EditorSession {
    ctx: EditorContext,
    owner: String,
    schema: Arc<ContentSchema>,
    state: EditorState,
    draft: ContentDocument,
    status: Option<String>,
    error: Option<String>,
}

impl EditorSession {
    /// Start a session for `content_key` on behalf of `owner`. Nothing is read yet.
    pub fn open(
        ctx: EditorContext,
        owner: impl Into<String>,
        content_key: &str,
    ) -> Result<Self, EditorError> {
        let schema = ctx
            .registry
            .get_schema(content_key)
            .map_err(|_| EditorError::UnknownSchema(content_key.to_string()))?;

        Ok(Self {
            ctx,
            owner: owner.into(),
            schema,
            state: EditorState::Loading,
            draft: ContentDocument::empty(),
            status: None,
            error: None,
        })
    }

    /// `open` followed by `load`
    pub async fn open_loaded(
        ctx: EditorContext,
        owner: impl Into<String>,
        content_key: &str,
    ) -> Result<Self, EditorError> {
        let mut session = Self::open(ctx, owner, content_key)?;
        session.load().await;
        Ok(session)
    }

    pub async fn load(&mut self) {
        self.state = EditorState::Loading;
        let loaded = store::load(self.ctx.store.as_ref(), &self.schema).await;
        self.draft = loaded.document;
        self.error = loaded.error;
        self.status = None;
        self.state = EditorState::Ready;
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn content_key(&self) -> &str {
        &self.schema.content_key
    }

    pub fn schema(&self) -> &ContentSchema {
        &self.schema
    }

    pub fn draft(&self) -> &ContentDocument {
        &self.draft
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replace one declared field in the draft. Other keys are untouched.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), EditorError> {
        self.ensure_ready()?;

        let field = self.schema.field(key).ok_or_else(|| EditorError::UnknownField {
            content_key: self.schema.content_key.clone(),
            field: key.to_string(),
        })?;

        let value = value.into();
        if field.kind == FieldKind::ImageReference && !is_image_reference(&value) {
            return Err(EditorError::InvalidImageUrl {
                field: key.to_string(),
                value,
            });
        }

        self.draft.set(key, value);
        Ok(())
    }

    /// Swap the whole draft for an arbitrary JSON object.
    ///
    /// Declared string fields land in the draft, everything else in the extra bag,
    /// so the next save writes the object back exactly.
    pub fn replace_document(&mut self, value: Map<String, Value>) -> Result<(), EditorError> {
        self.ensure_ready()?;
        self.draft = ContentDocument::from_stored(value, &self.schema);
        Ok(())
    }

    /// Write the whole draft. The session is back in `Ready` whatever happens.
    pub async fn save(&mut self) -> Result<(), EditorError> {
        self.ensure_ready()?;

        self.state = EditorState::Saving;
        let result = store::save(self.ctx.store.as_ref(), &self.schema.content_key, &self.draft).await;
        self.state = EditorState::Ready;

        match result {
            Ok(()) => {
                self.status = Some(format!("Saved '{}'", self.schema.content_key));
                self.error = None;
                Ok(())
            }
            Err(failure) => {
                self.status = None;
                self.error = Some(failure.to_string());
                Err(failure.into())
            }
        }
    }

    /// Move to another page. Unsaved edits are dropped.
    ///
    /// An unknown key leaves the current session as it was.
    pub async fn switch_to(&mut self, content_key: &str) -> Result<(), EditorError> {
        let schema = self
            .ctx
            .registry
            .get_schema(content_key)
            .map_err(|_| EditorError::UnknownSchema(content_key.to_string()))?;

        tracing::debug!(
            from = %self.schema.content_key,
            to = content_key,
            "Switching editor, discarding draft"
        );

        self.schema = schema;
        self.draft = ContentDocument::empty();
        self.load().await;
        Ok(())
    }

    /// Upload a picked file for an image field and put its URL in the draft.
    ///
    /// The draft is not saved. On failure the field keeps its old value and the
    /// message is surfaced through `error()`.
    pub async fn upload_image(
        &mut self,
        field: &str,
        file: Option<LocalFile>,
    ) -> Result<Option<String>, EditorError> {
        self.ensure_ready()?;
        self.image_field(field)?;

        let slot = self.slot(field);
        let folder = self.schema.content_key.clone();

        match self.ctx.uploader.upload(&slot, &folder, file).await {
            Ok(Some(url)) => {
                self.draft.set(field, url.clone());
                self.error = None;
                Ok(Some(url))
            }
            Ok(None) => Ok(None),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn is_uploading(&self, field: &str) -> bool {
        self.ctx.uploader.is_uploading(&self.slot(field))
    }

    /// One control per declared field, in schema order
    pub fn controls(&self) -> Vec<FieldControl> {
        self.schema
            .fields
            .iter()
            .map(|field| FieldControl {
                key: field.key.clone(),
                label: field.label.clone(),
                kind: field.kind,
                placeholder: field.placeholder.clone(),
                value: self.draft.get(&field.key).to_string(),
                uploading: field.kind == FieldKind::ImageReference && self.is_uploading(&field.key),
            })
            .collect()
    }

    pub fn view(&self) -> EditorView {
        EditorView {
            content_key: self.schema.content_key.clone(),
            title: self.schema.title.clone(),
            state: self.state,
            controls: self.controls(),
            document: self.draft.to_value(),
            status: self.status.clone(),
            error: self.error.clone(),
            can_save: self.state == EditorState::Ready,
        }
    }

    fn ensure_ready(&self) -> Result<(), EditorError> {
        if self.state != EditorState::Ready {
            return Err(EditorError::NotReady(self.state));
        }
        Ok(())
    }

    fn image_field(&self, key: &str) -> Result<(), EditorError> {
        match self.schema.field(key) {
            Some(field) if field.kind == FieldKind::ImageReference => Ok(()),
            Some(_) => Err(EditorError::NotAnImageField(key.to_string())),
            None => Err(EditorError::UnknownField {
                content_key: self.schema.content_key.clone(),
                field: key.to_string(),
            }),
        }
    }

    fn slot(&self, field: &str) -> FieldSlot {
        FieldSlot::new(self.owner.clone(), self.schema.content_key.clone(), field)
    }
}

/// Renderable control for one field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldControl {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    pub value: String,
    pub uploading: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EditorView {
    pub content_key: String,
    pub title: String,
    pub state: EditorState,
    pub controls: Vec<FieldControl>,
    pub document: Value,
    pub status: Option<String>,
    pub error: Option<String>,
    pub can_save: bool,
}

/// Empty, or an absolute URL with a host
pub fn is_image_reference(value: &str) -> bool {
    if value.is_empty() {
        return true;
    }
    match url::Url::parse(value) {
        Ok(url) => url.has_host(),
        Err(_) => false,
    }
}
