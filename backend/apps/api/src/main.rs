//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use auth::domain::repository::{RefreshTokenStore, UserRepository};
use auth::{
    AuthAppState, AuthConfig, MemoryAuthStore, PgAuthRepository, PgRefreshTokenStore, SigningKey,
    auth_app,
};
use axum::{
    Json, Router,
    http::{self, Method, header},
    routing::get,
};
use platform::config::ConfigError;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load_auth_config()?;
    tracing::info!(
        access_ttl_secs = config.access_token_ttl.as_secs(),
        refresh_ttl_secs = config.refresh_token_ttl.as_secs(),
        rotation_mode = %config.rotation_mode,
        cookie_secure = config.cookie_secure,
        "Auth configuration loaded"
    );

    let auth_routes = match env::var("DATABASE_URL") {
        Ok(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(&database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let sessions = PgRefreshTokenStore::new(pool.clone());

            // Errors here should not prevent server startup
            if let Err(e) = sessions.cleanup_expired().await {
                tracing::warn!(
                    error = %e,
                    "Refresh session cleanup failed, continuing anyway"
                );
            }

            auth_routes(PgAuthRepository::new(pool), sessions, config)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set; using in-memory auth store");
            let memory = MemoryAuthStore::new();
            auth_routes(memory.clone(), memory, config)
        }
    };

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:40922,http://127.0.0.1:40922".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]))
        .allow_credentials(true);

    // Build router; request authentication wraps only the auth routes
    let app = Router::new()
        .route("/health", get(health))
        .merge(auth_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    // Start server
    let addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string())
        .parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// `JWT_SECRET` is mandatory in release builds. Debug builds fall back to a
/// random key, so tokens do not survive a restart.
fn load_auth_config() -> anyhow::Result<AuthConfig> {
    match AuthConfig::from_env() {
        Ok(config) => Ok(config),
        Err(ConfigError::Missing(key)) if cfg!(debug_assertions) => {
            tracing::warn!(key = %key, "Signing key not configured; using a random development key");
            Ok(AuthConfig::from_env_with_key(SigningKey::generate())?)
        }
        Err(e) => Err(e.into()),
    }
}

fn auth_routes<R, S>(repo: R, store: S, config: AuthConfig) -> Router
where
    R: UserRepository + Send + Sync + 'static,
    S: RefreshTokenStore + Send + Sync + 'static,
{
    auth_app(AuthAppState::new(Arc::new(repo), Arc::new(store), config))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
