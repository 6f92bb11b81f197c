//! Schema-driven content editing.
//!
//! The registry gives each page its shape, `store` reads and writes the
//! document, `editor` binds the two into an editable draft and `upload`
//! feeds image URLs into it.

pub mod document;
pub mod editor;
pub mod render;
pub mod schema;
pub mod store;
pub mod upload;

pub use document::ContentDocument;
pub use editor::{EditorContext, EditorError, EditorSession, EditorState, EditorView, FieldControl};
pub use schema::{ContentSchema, FieldDef, FieldKind, SchemaError, SchemaRegistry};
pub use store::{Loaded, SaveFailure};
pub use upload::{FieldSlot, ImageFieldUploader, LocalFile, UploadError};
