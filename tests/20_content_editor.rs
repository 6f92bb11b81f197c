mod common;
use std::sync::Arc;

use common::{FailingObjectStore, ReadOnlyContent, UnreachableContent, PUBLIC_BASE};
use serde_json::json;

use skyriders_site::content::{
    EditorContext, EditorError, EditorSession, EditorState, ImageFieldUploader, LocalFile,
    SchemaRegistry, UploadError,
};
use skyriders_site::database::{ContentStore, MemoryBackend};
use skyriders_site::storage::{MemoryObjectStore, ObjectStore};

fn memory_objects() -> Arc<MemoryObjectStore> {
    Arc::new(MemoryObjectStore::new(url::Url::parse(PUBLIC_BASE).unwrap()))
}

fn context(
    registry: SchemaRegistry,
    store: Arc<dyn ContentStore>,
    objects: Arc<dyn ObjectStore>,
) -> EditorContext {
    EditorContext {
        registry: Arc::new(registry),
        store,
        uploader: Arc::new(ImageFieldUploader::new(objects, "site-assets", "jpg")),
    }
}

fn png(name: &str) -> LocalFile {
    LocalFile {
        file_name: name.to_string(),
        content_type: Some("image/png".to_string()),
        bytes: vec![0x89, b'P', b'N', b'G'],
    }
}

#[tokio::test]
async fn editing_brand_on_empty_home_saves_one_key() {
    let backend = Arc::new(MemoryBackend::new());
    let ctx = context(SchemaRegistry::builtin(), backend.clone(), memory_objects());

    let mut session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    assert_eq!(session.state(), EditorState::Ready);
    assert!(session.draft().is_empty());

    session.set_field("brand", "SKYRIDERS").unwrap();
    session.save().await.unwrap();

    assert_eq!(session.status(), Some("Saved 'home'"));
    assert_eq!(session.error(), None);
    assert_eq!(
        backend.fetch("home").await.unwrap(),
        Some(json!({ "brand": "SKYRIDERS" }))
    );
}

#[tokio::test]
async fn save_keeps_keys_outside_the_schema() {
    let registry = SchemaRegistry::from_yaml_str(
        r#"
- content_key: sample
  title: Sample
  fields:
    - key: b
      label: B
      type: text
"#,
    )
    .unwrap();
    let backend = Arc::new(MemoryBackend::new());
    backend.upsert("sample", &json!({ "a": 1, "b": 2 })).await.unwrap();

    let ctx = context(registry, backend.clone(), memory_objects());
    let mut session = EditorSession::open_loaded(ctx, "admin", "sample").await.unwrap();
    session.set_field("b", "3").unwrap();
    session.save().await.unwrap();

    assert_eq!(
        backend.fetch("sample").await.unwrap(),
        Some(json!({ "a": 1, "b": "3" }))
    );
}

#[tokio::test]
async fn saving_twice_writes_the_same_document() {
    let backend = Arc::new(MemoryBackend::new());
    let ctx = context(SchemaRegistry::builtin(), backend.clone(), memory_objects());

    let mut session = EditorSession::open_loaded(ctx, "admin", "programs").await.unwrap();
    session.set_field("title", "Programs").unwrap();
    session.save().await.unwrap();
    let first = backend.fetch("programs").await.unwrap();
    session.save().await.unwrap();

    assert_eq!(backend.fetch("programs").await.unwrap(), first);
    assert_eq!(session.state(), EditorState::Ready);
}

#[tokio::test]
async fn missing_row_loads_empty_without_error() {
    let backend = Arc::new(MemoryBackend::new());
    let ctx = context(SchemaRegistry::builtin(), backend, memory_objects());

    let session = EditorSession::open_loaded(ctx, "admin", "pilot_resources").await.unwrap();
    assert!(session.draft().is_empty());
    assert_eq!(session.error(), None);
    assert!(session.view().can_save);
}

#[tokio::test]
async fn unknown_key_is_reported_by_name() {
    let ctx = context(
        SchemaRegistry::builtin(),
        Arc::new(MemoryBackend::new()),
        memory_objects(),
    );

    let err = EditorSession::open(ctx, "admin", "nonexistent_key").err().unwrap();
    assert!(matches!(err, EditorError::UnknownSchema(_)));
    assert_eq!(err.to_string(), "Unknown key: nonexistent_key");
}

#[tokio::test]
async fn read_failure_starts_empty_with_error() {
    let ctx = context(
        SchemaRegistry::builtin(),
        Arc::new(UnreachableContent),
        memory_objects(),
    );

    let session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    assert_eq!(session.state(), EditorState::Ready);
    assert!(session.draft().is_empty());
    assert!(session.error().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn failed_save_keeps_the_draft() {
    let ctx = context(
        SchemaRegistry::builtin(),
        Arc::new(ReadOnlyContent(json!({ "title": "Our Story" }))),
        memory_objects(),
    );

    let mut session = EditorSession::open_loaded(ctx, "admin", "our_story").await.unwrap();
    session.set_field("title", "Our Story, revised").unwrap();

    let err = session.save().await.unwrap_err();
    assert!(matches!(err, EditorError::Save(_)));
    assert_eq!(session.state(), EditorState::Ready);
    assert_eq!(session.draft().get("title"), "Our Story, revised");
    assert_eq!(session.status(), None);
    assert!(session.error().unwrap().starts_with("Failed to save 'our_story'"));
}

#[tokio::test]
async fn upload_puts_public_url_in_draft_only() {
    let backend = Arc::new(MemoryBackend::new());
    let objects = memory_objects();
    let ctx = context(SchemaRegistry::builtin(), backend.clone(), objects.clone());

    let mut session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    let url = session
        .upload_image("heroImage", Some(png("Hero.PNG")))
        .await
        .unwrap()
        .unwrap();

    let prefix = format!("{}site-assets/home/", PUBLIC_BASE);
    assert!(url.starts_with(&prefix), "unexpected url {}", url);
    assert!(url.ends_with(".png"));
    assert_eq!(session.draft().get("heroImage"), url);
    assert!(!session.is_uploading("heroImage"));

    let paths = objects.paths("site-assets");
    assert_eq!(paths.len(), 1);
    assert!(paths[0].starts_with("home/"));

    // Nothing is persisted until save
    assert_eq!(backend.fetch("home").await.unwrap(), None);
}

#[tokio::test]
async fn failed_upload_leaves_field_unchanged() {
    let backend = Arc::new(MemoryBackend::new());
    backend
        .upsert("contact", &json!({ "heroImage": "https://cdn.example.com/old.jpg" }))
        .await
        .unwrap();
    let ctx = context(
        SchemaRegistry::builtin(),
        backend,
        Arc::new(FailingObjectStore),
    );

    let mut session = EditorSession::open_loaded(ctx, "admin", "contact").await.unwrap();
    let err = session
        .upload_image("heroImage", Some(png("photo.png")))
        .await
        .unwrap_err();

    assert!(matches!(err, EditorError::Upload(UploadError::Storage(_))));
    assert_eq!(session.draft().get("heroImage"), "https://cdn.example.com/old.jpg");
    assert!(!session.is_uploading("heroImage"));
    assert!(session.error().is_some());
}

#[tokio::test]
async fn no_file_picked_is_a_no_op() {
    let objects = memory_objects();
    let ctx = context(
        SchemaRegistry::builtin(),
        Arc::new(MemoryBackend::new()),
        objects.clone(),
    );

    let mut session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    assert_eq!(session.upload_image("heroImage", None).await.unwrap(), None);
    assert_eq!(session.draft().get("heroImage"), "");
    assert!(objects.paths("site-assets").is_empty());
}

#[tokio::test]
async fn upload_rejects_text_fields() {
    let ctx = context(
        SchemaRegistry::builtin(),
        Arc::new(MemoryBackend::new()),
        memory_objects(),
    );

    let mut session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    let err = session
        .upload_image("brand", Some(png("x.png")))
        .await
        .unwrap_err();
    assert!(matches!(err, EditorError::NotAnImageField(_)));
}

#[tokio::test]
async fn switching_pages_discards_unsaved_edits() {
    let backend = Arc::new(MemoryBackend::new());
    backend.upsert("news", &json!({ "title": "News" })).await.unwrap();
    let ctx = context(SchemaRegistry::builtin(), backend.clone(), memory_objects());

    let mut session = EditorSession::open_loaded(ctx, "admin", "home").await.unwrap();
    session.set_field("brand", "unsaved").unwrap();
    session.switch_to("news").await.unwrap();

    assert_eq!(session.content_key(), "news");
    assert_eq!(session.draft().get("title"), "News");
    assert_eq!(session.draft().get("brand"), "");
    assert_eq!(backend.fetch("home").await.unwrap(), None);

    // Unknown target leaves the session where it was
    assert!(session.switch_to("nowhere").await.is_err());
    assert_eq!(session.content_key(), "news");
}
