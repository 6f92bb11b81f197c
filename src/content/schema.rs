use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// How a field is edited and what shape its value takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Single-line text input
    #[serde(rename = "text")]
    PlainText,
    /// Multi-line textarea
    #[serde(rename = "textarea")]
    MultilineText,
    /// Public URL of an uploaded image (or empty)
    #[serde(rename = "image")]
    ImageReference,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::PlainText => "text",
            FieldKind::MultilineText => "textarea",
            FieldKind::ImageReference => "image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl FieldDef {
    pub fn new(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }
}

/// Declared shape of one editable page document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSchema {
    pub content_key: String,
    pub title: String,
    pub fields: Vec<FieldDef>,
}

impl ContentSchema {
    pub fn field(&self, key: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.key.as_str())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Unknown key: {0}")]
    UnknownKey(String),
    #[error("Duplicate content key: {0}")]
    DuplicateContentKey(String),
    #[error("Duplicate field '{field}' in schema '{content_key}'")]
    DuplicateField { content_key: String, field: String },
    #[error("Illegal field key '{field}' in schema '{content_key}'")]
    IllegalFieldKey { content_key: String, field: String },
    #[error("Failed to read schema file: {0}")]
    Io(String),
    #[error("Invalid schema file: {0}")]
    Parse(String),
}

/// Field keys become property names in the stored JSON document.
pub fn is_legal_field_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Immutable content-key -> schema lookup, built once at startup.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: Vec<Arc<ContentSchema>>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Validate and index the given schemas, preserving their order.
    pub fn new(schemas: Vec<ContentSchema>) -> Result<Self, SchemaError> {
        let mut ordered: Vec<Arc<ContentSchema>> = Vec::with_capacity(schemas.len());
        let mut index = HashMap::new();

        for schema in schemas {
            let mut seen = HashSet::new();
            for field in &schema.fields {
                if !is_legal_field_key(&field.key) {
                    return Err(SchemaError::IllegalFieldKey {
                        content_key: schema.content_key.clone(),
                        field: field.key.clone(),
                    });
                }
                if !seen.insert(field.key.as_str()) {
                    return Err(SchemaError::DuplicateField {
                        content_key: schema.content_key.clone(),
                        field: field.key.clone(),
                    });
                }
            }
            if index.contains_key(&schema.content_key) {
                return Err(SchemaError::DuplicateContentKey(schema.content_key));
            }
            index.insert(schema.content_key.clone(), ordered.len());
            ordered.push(Arc::new(schema));
        }

        Ok(Self {
            schemas: ordered,
            index,
        })
    }

    /// Load schemas from a YAML file (a list of `ContentSchema`).
    pub fn from_yaml_file(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, SchemaError> {
        let schemas: Vec<ContentSchema> =
            serde_yaml::from_str(text).map_err(|e| SchemaError::Parse(e.to_string()))?;
        Self::new(schemas)
    }

    pub fn get_schema(&self, content_key: &str) -> Result<Arc<ContentSchema>, SchemaError> {
        self.index
            .get(content_key)
            .map(|&i| self.schemas[i].clone())
            .ok_or_else(|| SchemaError::UnknownKey(content_key.to_string()))
    }

    pub fn contains(&self, content_key: &str) -> bool {
        self.index.contains_key(content_key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ContentSchema>> {
        self.schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// The site's page schemas.
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }
}

static BUILTIN: Lazy<SchemaRegistry> = Lazy::new(|| {
    use FieldKind::*;

    let schema = |key: &str, title: &str, fields: Vec<FieldDef>| ContentSchema {
        content_key: key.to_string(),
        title: title.to_string(),
        fields,
    };

    SchemaRegistry::new(vec![
        schema(
            "home",
            "Home",
            vec![
                FieldDef::new("brand", "Brand", PlainText),
                FieldDef::new("title", "Hero Title", PlainText),
                FieldDef::new("subtitle", "Hero Subtitle", MultilineText),
                FieldDef::new("tagline", "Tagline", PlainText),
                FieldDef::new("heroImage", "Hero Image", ImageReference),
                FieldDef::new("ctaPrimary", "CTA Primary Text", PlainText),
                FieldDef::new("ctaSecondary", "CTA Secondary Text", PlainText),
            ],
        ),
        schema(
            "our_story",
            "Our Story",
            vec![
                FieldDef::new("title", "Page Title", PlainText),
                FieldDef::new("date", "Date", PlainText).with_placeholder("YYYY-MM-DD"),
                FieldDef::new("heroImage", "Top Image", ImageReference),
                FieldDef::new("body", "Main Text", MultilineText),
                FieldDef::new("pioneerImage", "Pioneer Image", ImageReference),
                FieldDef::new("archiveImage", "Archive Image", ImageReference),
            ],
        ),
        schema(
            "programs",
            "Programs",
            vec![
                FieldDef::new("title", "Page Title", PlainText),
                FieldDef::new("intro", "Intro", MultilineText),
                FieldDef::new("heroImage", "Top Image", ImageReference),
            ],
        ),
        schema(
            "news",
            "News",
            vec![
                FieldDef::new("title", "Page Title", PlainText),
                FieldDef::new("intro", "Intro", MultilineText),
            ],
        ),
        schema(
            "pilot_resources",
            "Pilot Resources",
            vec![
                FieldDef::new("title", "Page Title", PlainText),
                FieldDef::new("intro", "Intro", MultilineText),
            ],
        ),
        schema(
            "contact",
            "Contact",
            vec![
                FieldDef::new("title", "Page Title", PlainText),
                FieldDef::new("intro", "Intro", MultilineText),
                FieldDef::new("heroImage", "Top Image", ImageReference),
            ],
        ),
    ])
    .unwrap_or_else(|e| panic!("built-in content schemas are invalid: {}", e))
});
