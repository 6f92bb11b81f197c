use std::sync::Arc;

use anyhow::Context;

use crate::config::{AppConfig, Backend, Environment};
use crate::content::{EditorContext, ImageFieldUploader, SchemaRegistry};
use crate::database::{
    ApplicationStore, ContentStore, DatabaseManager, HealthCheck, MemoryBackend, PgBackend,
    PostStore, ProfileStore,
};
use crate::mail::{LogMailer, Mailer, SmtpMailer};
use crate::storage::{MemoryObjectStore, ObjectStore, S3ObjectStore};

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<SchemaRegistry>,
    pub content: Arc<dyn ContentStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub posts: Arc<dyn PostStore>,
    pub applications: Arc<dyn ApplicationStore>,
    pub health: Arc<dyn HealthCheck>,
    pub uploader: Arc<ImageFieldUploader>,
    pub mailer: Arc<dyn Mailer>,
    /// Set when uploads are kept in process; `app` then serves them itself.
    pub local_objects: Option<Arc<MemoryObjectStore>>,
}

impl AppState {
    /// Wire every store to one backend that implements them all.
    pub fn with_backend<B>(
        config: Arc<AppConfig>,
        registry: Arc<SchemaRegistry>,
        backend: Arc<B>,
        objects: Arc<dyn ObjectStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Self
    where
        B: ContentStore + ProfileStore + PostStore + ApplicationStore + HealthCheck + 'static,
    {
        let uploader = Arc::new(ImageFieldUploader::new(
            objects,
            config.storage.bucket.clone(),
            config.storage.fallback_extension.clone(),
        ));

        Self {
            config,
            registry,
            content: backend.clone(),
            profiles: backend.clone(),
            posts: backend.clone(),
            applications: backend.clone(),
            health: backend,
            uploader,
            mailer,
            local_objects: None,
        }
    }

    /// Serve uploads from `objects`, which must be the store the uploader writes to.
    pub fn with_local_objects(mut self, objects: Arc<MemoryObjectStore>) -> Self {
        self.local_objects = Some(objects);
        self
    }

    /// Build collaborators from configuration.
    pub async fn from_config(config: Arc<AppConfig>) -> anyhow::Result<Self> {
        let registry = Arc::new(load_registry(&config)?);

        let mailer: Arc<dyn Mailer> = match SmtpMailer::from_config(&config.mail)
            .context("invalid mail configuration")?
        {
            Some(smtp) => Arc::new(smtp),
            None => {
                tracing::warn!("SMTP_HOST not set, contact notifications will only be logged");
                Arc::new(LogMailer)
            }
        };

        let (objects, local_objects) = object_stores(&config).await?;

        let state = match config.backend {
            Backend::Postgres => {
                let pool = DatabaseManager::connect(&config.database).await?;
                let backend = Arc::new(PgBackend::new(pool));
                Self::with_backend(config, registry, backend, objects, mailer)
            }
            Backend::Memory => {
                tracing::warn!("Using the in-memory backend, data is lost on restart");
                let backend = Arc::new(MemoryBackend::new());
                Self::with_backend(config, registry, backend, objects, mailer)
            }
        };

        Ok(match local_objects {
            Some(local) => state.with_local_objects(local),
            None => state,
        })
    }

    pub fn editor_context(&self) -> EditorContext {
        EditorContext {
            registry: self.registry.clone(),
            store: self.content.clone(),
            uploader: self.uploader.clone(),
        }
    }
}

/// The S3 client when an endpoint is configured. Without one, development
/// keeps uploads in process and every other environment refuses to start.
async fn object_stores(
    config: &AppConfig,
) -> anyhow::Result<(Arc<dyn ObjectStore>, Option<Arc<MemoryObjectStore>>)> {
    if config.storage.endpoint.is_some() {
        let s3 = S3ObjectStore::from_config(&config.storage)
            .await
            .context("invalid storage configuration")?;
        let s3: Arc<dyn ObjectStore> = Arc::new(s3);
        return Ok((s3, None));
    }

    if !matches!(config.environment, Environment::Development) {
        anyhow::bail!(
            "STORAGE_ENDPOINT is required in {:?}; in-process image storage is for development only",
            config.environment
        );
    }

    tracing::warn!("STORAGE_ENDPOINT not set, uploaded images are kept in memory");
    let base = crate::storage::s3::parse_public_base(&config.storage)
        .context("STORAGE_PUBLIC_BASE_URL is required")?;
    let memory = Arc::new(MemoryObjectStore::new(base));
    let objects: Arc<dyn ObjectStore> = memory.clone();
    Ok((objects, Some(memory)))
}

/// Built-in schemas unless a YAML file is configured
pub fn load_registry(config: &AppConfig) -> anyhow::Result<SchemaRegistry> {
    match &config.content.schemas_path {
        Some(path) => {
            let registry = SchemaRegistry::from_yaml_file(path)
                .with_context(|| format!("loading content schemas from {}", path.display()))?;
            tracing::info!(path = %path.display(), schemas = registry.len(), "Loaded content schemas");
            Ok(registry)
        }
        None => Ok(SchemaRegistry::builtin()),
    }
}
