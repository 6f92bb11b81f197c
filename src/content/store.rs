use serde_json::Value;

use super::document::ContentDocument;
use super::schema::ContentSchema;
use crate::database::{ContentStore, DatabaseError};

/// Result of reading a page document. Never fails: a missing row is an empty
/// document, a read error is an empty document plus the error text.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded {
    pub document: ContentDocument,
    pub error: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to save '{content_key}': {source}")]
pub struct SaveFailure {
    pub content_key: String,
    #[source]
    pub source: DatabaseError,
}

pub async fn load(store: &dyn ContentStore, schema: &ContentSchema) -> Loaded {
    let key = schema.content_key.as_str();
    match store.fetch(key).await {
        Ok(Some(Value::Object(map))) => Loaded {
            document: ContentDocument::from_stored(map, schema),
            error: None,
        },
        Ok(Some(Value::Null)) | Ok(None) => {
            tracing::debug!(content_key = key, "No stored content, starting empty");
            Loaded {
                document: ContentDocument::empty(),
                error: None,
            }
        }
        Ok(Some(other)) => {
            tracing::warn!(content_key = key, "Stored content is not a JSON object");
            Loaded {
                document: ContentDocument::empty(),
                error: Some(format!(
                    "Stored content for '{}' is not an object (found {})",
                    key,
                    json_type_name(&other)
                )),
            }
        }
        Err(e) => {
            tracing::warn!(content_key = key, error = %e, "Content load failed, starting empty");
            Loaded {
                document: ContentDocument::empty(),
                error: Some(e.to_string()),
            }
        }
    }
}

/// Upsert the whole document under `content_key`. Not retried.
pub async fn save(
    store: &dyn ContentStore,
    content_key: &str,
    document: &ContentDocument,
) -> Result<(), SaveFailure> {
    store
        .upsert(content_key, &document.to_value())
        .await
        .map_err(|source| {
            tracing::error!(content_key, error = %source, "Content save failed");
            SaveFailure {
                content_key: content_key.to_string(),
                source,
            }
        })?;
    tracing::info!(content_key, "Content saved");
    Ok(())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
