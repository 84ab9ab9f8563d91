use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod services;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = crate::config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Taskboard API in {:?} mode", config.environment);

    // Best effort: the server still comes up without its store, requests that
    // need it fail with 5xx until it is reachable
    if let Err(e) = database::Database::migrate().await {
        tracing::warn!("database migration skipped: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(config.server.port);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    println!("🚀 Taskboard API server listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/ping", get(ping))
        .route("/health", get(health))
        // Public auth routes
        .merge(user_routes())
        // Protected API
        .merge(board_routes())
        .merge(todo_routes())
        // Contract: unmatched routes answer JSON, not an empty body
        .fallback(not_found)
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn user_routes() -> Router {
    use axum::routing::post;
    use handlers::public::users;

    Router::new()
        .route("/api/users", post(users::register))
        .route("/api/users/login", post(users::login))
}

fn board_routes() -> Router {
    use axum::routing::{get, put};
    use handlers::protected::boards;

    Router::new()
        .route("/api/boards", get(boards::list).post(boards::create))
        .route("/api/boards/:id", put(boards::update).delete(boards::remove))
        .layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

fn todo_routes() -> Router {
    use axum::routing::{get, post, put};
    use handlers::protected::todos;

    Router::new()
        .route("/api/todos", post(todos::create))
        // List keys on the board, item operations live under /id/:id
        .route("/api/todos/:boardId", get(todos::list))
        .route("/api/todos/id/:id", put(todos::update).delete(todos::remove))
        .layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

/// Credentialed CORS: the web client sends the login cookie cross-origin, so
/// origins must be listed explicitly rather than wildcarded.
fn cors_layer() -> CorsLayer {
    use axum::http::{header, HeaderValue, Method};

    let security = &config::config().security;
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Taskboard API (Rust)",
        "version": version,
        "description": "Board and todo management backend built with Rust (Axum)",
        "endpoints": {
            "ping": "/ping (public)",
            "health": "/health (public)",
            "users": "/api/users, /api/users/login (public - registration and token acquisition)",
            "boards": "/api/boards[/:id] (protected)",
            "todos": "/api/todos, /api/todos/:boardId, /api/todos/id/:id (protected)",
        }
    }))
}

async fn ping() -> &'static str {
    "ok"
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::Database::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "message": e.to_string()
            })),
        ),
    }
}

async fn not_found(uri: axum::http::Uri) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("Not found - {}", uri.path()) })),
    )
}
