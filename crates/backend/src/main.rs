mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Json, Router};
use heatmap_shared::config::RuntimeConfig;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use config::ServerConfig;

#[derive(Clone)]
struct AppState {
    runtime: Arc<RuntimeConfig>,
    index_path: Arc<Path>,
}

async fn runtime_config(State(state): State<AppState>) -> Json<RuntimeConfig> {
    Json(state.runtime.as_ref().clone())
}

/// Build a cache-controlled static file router.
///
/// Separated so tests can exercise the caching layer with arbitrary directories.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";
const NO_STORE: &str = "no-store";

/// Build the full application router.
fn build_app(config: &ServerConfig) -> Router {
    // Static file routers are stateless, merge them after app state is applied
    let static_files = Router::new()
        .nest(
            "/static",
            cached_static_router(&config.assets_dir, CACHE_1DAY),
        )
        .nest("/dist", cached_static_router(&config.dist_dir, CACHE_IMMUTABLE))
        .nest(
            "/assets",
            cached_static_router(&config.dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    let state = AppState {
        runtime: Arc::new(config.runtime.clone()),
        index_path: Arc::from(config.dist_dir.join("index.html").as_path()),
    };

    // Endpoints and key change between deploys.
    let config_route = Router::new()
        .route("/config.json", get(runtime_config))
        .layer(SetResponseHeaderLayer::overriding(
            axum::http::header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE),
        ));

    Router::new()
        .route("/", get(serve_index))
        .merge(config_route)
        .with_state(state)
        .merge(static_files)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::load_server_config().context("loading server configuration")?;
    tracing::info!(
        aggregate_url = %config.runtime.aggregate_url,
        detail_url = %config.runtime.detail_url,
        weight_policy = ?config.runtime.weight_policy,
        dist_dir = %config.dist_dir.display(),
        "Loaded configuration"
    );

    let app = build_app(&config);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!("Server running at http://localhost:{}", config.port);

    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match tokio::fs::read_to_string(&*state.index_path).await {
        Ok(html) => Html(html),
        Err(e) => {
            tracing::warn!(path = %state.index_path.display(), error = %e, "Frontend not built");
            Html(
                r#"<!DOCTYPE html>
<html>
<head><title>Locality Heatmap</title></head>
<body>
<h1>Locality Heatmap</h1>
<p>Frontend not built yet. Run <code>dx build --release</code> in <code>crates/frontend</code> and copy the output to the dist directory.</p>
</body>
</html>"#
                    .to_string(),
            )
        }
    }
}
