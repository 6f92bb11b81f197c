#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use skyriders_site::auth::{generate_jwt, Claims};
use skyriders_site::config::AppConfig;
use skyriders_site::content::SchemaRegistry;
use skyriders_site::database::{ContentStore, DatabaseError, MemoryBackend};
use skyriders_site::mail::{MailError, Mailer, OutgoingEmail};
use skyriders_site::storage::{MemoryObjectStore, ObjectStore, StorageError};
use skyriders_site::AppState;

pub const SECRET: &str = "integration-test-secret";
pub const PUBLIC_BASE: &str = "https://cdn.example.com/storage/v1/object/public/";

// ---------------------------------------------------------------------------
// Spawned binary
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_skyriders"));
        cmd.arg("serve")
            .env("APP_ENV", "development")
            .env("SKYRIDERS_BACKEND", "memory")
            .env("SKYRIDERS_PORT", port.to_string())
            .env("HOST", "127.0.0.1")
            .env("JWT_SECRET", SECRET)
            .env_remove("STORAGE_ENDPOINT")
            .env_remove("SMTP_HOST")
            .env_remove("CONTENT_SCHEMAS_PATH")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == reqwest::StatusCode::OK
                    || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

// ---------------------------------------------------------------------------
// In-process router with in-memory collaborators
// ---------------------------------------------------------------------------

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.security.jwt_secret = SECRET.to_string();
    config.api.enable_request_logging = false;
    config
}

/// Mail sink that keeps every message
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _email: &OutgoingEmail) -> Result<(), MailError> {
        Err(MailError::Build("relay refused".to_string()))
    }
}

pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn put_object(
        &self,
        _bucket: &str,
        _path: &str,
        _body: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        Err(StorageError::Put("bucket not found".to_string()))
    }

    fn public_url(&self, _bucket: &str, _path: &str) -> Result<String, StorageError> {
        Err(StorageError::PublicUrl("unreachable".to_string()))
    }
}

/// Reads succeed from a fixed document, writes always fail
pub struct ReadOnlyContent(pub Value);

#[async_trait]
impl ContentStore for ReadOnlyContent {
    async fn fetch(&self, _key: &str) -> Result<Option<Value>, DatabaseError> {
        Ok(Some(self.0.clone()))
    }

    async fn upsert(&self, _key: &str, _value: &Value) -> Result<(), DatabaseError> {
        Err(DatabaseError::QueryError("permission denied for table site_content".to_string()))
    }
}

pub struct UnreachableContent;

#[async_trait]
impl ContentStore for UnreachableContent {
    async fn fetch(&self, _key: &str) -> Result<Option<Value>, DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }

    async fn upsert(&self, _key: &str, _value: &Value) -> Result<(), DatabaseError> {
        Err(DatabaseError::QueryError("connection refused".to_string()))
    }
}

pub struct Harness {
    pub state: AppState,
    pub backend: Arc<MemoryBackend>,
    pub objects: Arc<MemoryObjectStore>,
    pub mailer: Arc<RecordingMailer>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_objects_override(None)
    }

    /// Harness whose uploads go to `objects` instead of the in-memory store
    pub fn with_object_store(objects: Arc<dyn ObjectStore>) -> Self {
        Self::with_objects_override(Some(objects))
    }

    fn with_objects_override(override_store: Option<Arc<dyn ObjectStore>>) -> Self {
        let backend = Arc::new(MemoryBackend::new());
        let objects = Arc::new(MemoryObjectStore::new(url::Url::parse(PUBLIC_BASE).unwrap()));
        let mailer = Arc::new(RecordingMailer::default());
        let local = override_store.is_none();
        let store: Arc<dyn ObjectStore> = override_store.unwrap_or_else(|| objects.clone());

        let state = AppState::with_backend(
            Arc::new(test_config()),
            Arc::new(SchemaRegistry::builtin()),
            backend.clone(),
            store,
            mailer.clone(),
        );
        let state = if local {
            state.with_local_objects(objects.clone())
        } else {
            state
        };

        Self {
            state,
            backend,
            objects,
            mailer,
        }
    }

    pub fn app(&self) -> Router {
        skyriders_site::app(self.state.clone())
    }

    pub async fn admin_token(&self) -> String {
        let id = Uuid::new_v4();
        self.backend.add_profile(id, "admin", Some("admin@skyriders.org")).await;
        token_for(id, Some("admin@skyriders.org"))
    }

    pub async fn user_token(&self) -> String {
        let id = Uuid::new_v4();
        self.backend.add_profile(id, "user", Some("pilot@example.com")).await;
        token_for(id, Some("pilot@example.com"))
    }
}

pub fn token_for(id: Uuid, email: Option<&str>) -> String {
    generate_jwt(&Claims::new(id, email.map(str::to_string), 1), SECRET).unwrap()
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub fn json_request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    json_request(Method::GET, uri, token, None)
}

const BOUNDARY: &str = "skyriders-test-boundary";

/// Multipart body with a single `file` part
pub fn file_upload(uri: &str, token: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            file_name, content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Multipart body as a browser sends it when the file input is left empty
pub fn empty_upload(uri: &str, token: &str) -> Request<Body> {
    file_upload(uri, token, "", "application/octet-stream", b"")
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}
