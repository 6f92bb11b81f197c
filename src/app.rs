use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderValue, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::{jwt_auth_middleware, require_admin};
use crate::state::AppState;

/// The full HTTP surface
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state);

    let router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API
        .merge(protected_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .merge(local_storage_routes(&state))
        .layer(DefaultBodyLimit::max(body_limit));

    let router = match cors {
        Some(cors) => router.layer(cors),
        None => router,
    };

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api/content/:key", get(public::content_get))
        .route("/api/news", get(public::news_list))
        .route("/api/news/:id", get(public::news_get))
        .route("/api/apply", post(public::apply_post))
}

/// Serves uploads when they are kept in process, under the path of their public URLs.
fn local_storage_routes(state: &AppState) -> Router<AppState> {
    let Some(objects) = &state.local_objects else {
        return Router::new();
    };

    let prefix = objects.public_base().path().trim_end_matches('/').to_string();
    if prefix.is_empty() || prefix.starts_with("/api") {
        tracing::warn!(
            "STORAGE_PUBLIC_BASE_URL path '{}' collides with the API, uploads will not be served",
            objects.public_base().path()
        );
        return Router::new();
    }

    Router::new().route(
        &format!("{}/:bucket/*path", prefix),
        get(handlers::public::storage_get),
    )
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/auth/whoami", get(protected::whoami_get))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use handlers::admin;

    Router::new()
        // Content editor
        .route("/api/admin/content", get(admin::content_list))
        .route(
            "/api/admin/content/:key",
            get(admin::content_get).put(admin::content_put),
        )
        .route("/api/admin/content/:key/form", get(admin::content_form))
        .route("/api/admin/content/:key/raw", put(admin::content_raw_put))
        .route(
            "/api/admin/content/:key/images/:field",
            post(admin::content_image_post),
        )
        .route("/api/admin/uploads", post(admin::upload_post))
        // Posts
        .route(
            "/api/admin/posts",
            get(admin::post_list).post(admin::post_create),
        )
        .route(
            "/api/admin/posts/:id",
            get(admin::post_get)
                .put(admin::post_update)
                .delete(admin::post_delete),
        )
        .route("/api/admin/posts/:id/publish", patch(admin::post_publish))
        // Users
        .route("/api/admin/users", get(admin::user_list))
        // Layers run bottom-up: authenticate, then check the role
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(state: &AppState) -> Option<CorsLayer> {
    let security = &state.config.security;
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

async fn root(State(state): State<AppState>) -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");
    let pages: Vec<&str> = state
        .registry
        .iter()
        .map(|s| s.content_key.as_str())
        .collect();

    Json(json!({
        "success": true,
        "data": {
            "name": "SKYRIDERS site API",
            "version": version,
            "environment": state.config.environment,
            "pages": pages,
            "endpoints": {
                "content": "/api/content/:key (public)",
                "news": "/api/news[/:id] (public)",
                "apply": "/api/apply (public)",
                "auth": "/api/auth/whoami (authenticated)",
                "admin": "/api/admin/* (admin role)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "error": true,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "data": {
                        "status": "degraded",
                        "timestamp": now
                    }
                })),
            )
        }
    }
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let bind_addr = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("SKYRIDERS site API listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
