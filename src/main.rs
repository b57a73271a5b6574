use axum::{routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod auth;
mod config;
mod database;
mod error;
mod handlers;
mod middleware;
mod models;
mod query;
mod services;
mod verify;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = crate::config::config();
    tracing::info!("Starting Fieldbook API in {:?} mode", config.environment);

    if let Err(e) = database::migrate().await {
        tracing::warn!("migrations not applied: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("FIELDBOOK_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Fieldbook API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API, everything under /api except register/login
        .merge(protected_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .fallback(not_found)
}

fn public_routes() -> Router {
    use axum::routing::post;
    use handlers::auth;

    Router::new()
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(plot_routes())
        .merge(subdivision_routes())
        .merge(crop_routes())
        .merge(issue_routes())
        .merge(job_routes())
        .route_layer(axum::middleware::from_fn(middleware::jwt_auth_middleware))
}

fn auth_routes() -> Router {
    use handlers::auth;

    Router::new().route("/api/auth", get(auth::check))
}

fn user_routes() -> Router {
    use axum::routing::patch;
    use handlers::users;

    Router::new()
        .route("/api/users", get(users::list))
        .route(
            "/api/users/:username",
            get(users::get).patch(users::update).delete(users::delete),
        )
        .route("/api/users/:username/password", patch(users::change_password))
}

fn plot_routes() -> Router {
    use axum::routing::patch;
    use handlers::plots;

    Router::new()
        .route(
            "/api/plots/users/:owner_id",
            get(plots::list).post(plots::create),
        )
        .route(
            "/api/plots/:plot_id",
            get(plots::get).patch(plots::update).delete(plots::delete),
        )
        .route("/api/plots/:plot_id/pin", patch(plots::pin))
        .route("/api/plots/:plot_id/unpin", patch(plots::unpin))
}

fn subdivision_routes() -> Router {
    use handlers::subdivisions;

    Router::new()
        .route(
            "/api/subdivisions/plots/:plot_id",
            get(subdivisions::list).post(subdivisions::create),
        )
        .route(
            "/api/subdivisions/:subdivision_id",
            get(subdivisions::get)
                .patch(subdivisions::update)
                .delete(subdivisions::delete),
        )
}

fn crop_routes() -> Router {
    use axum::routing::patch;
    use handlers::crops;

    Router::new()
        .route(
            "/api/crops/plots/:plot_id",
            get(crops::list_of_plot).post(crops::create_in_plot),
        )
        .route(
            "/api/crops/subdivisions/:subdivision_id",
            get(crops::list_of_subdivision).post(crops::create_in_subdivision),
        )
        .route(
            "/api/crops/:crop_id",
            get(crops::get).patch(crops::update).delete(crops::delete),
        )
        .route("/api/crops/:crop_id/plot", patch(crops::set_plot))
        .route("/api/crops/:crop_id/subdivision", patch(crops::set_subdivision))
}

fn issue_routes() -> Router {
    use axum::routing::patch;
    use handlers::issues;

    Router::new()
        .route(
            "/api/issues/plots/:plot_id",
            get(issues::list_of_plot).post(issues::create_in_plot),
        )
        .route(
            "/api/issues/subdivisions/:subdivision_id",
            get(issues::list_of_subdivision).post(issues::create_in_subdivision),
        )
        .route(
            "/api/issues/:issue_id",
            get(issues::get).patch(issues::update).delete(issues::delete),
        )
        .route("/api/issues/:issue_id/resolve", patch(issues::resolve))
        .route("/api/issues/:issue_id/unresolve", patch(issues::unresolve))
}

fn job_routes() -> Router {
    use handlers::jobs;

    Router::new()
        .route(
            "/api/jobs/plots/:plot_id",
            get(jobs::list_of_plot).post(jobs::create_in_plot),
        )
        .route(
            "/api/jobs/:job_id",
            get(jobs::get).patch(jobs::update).delete(jobs::delete),
        )
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Fieldbook API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "register": "POST /api/register (public)",
            "login": "POST /api/login (public)",
            "auth": "GET /api/auth (protected)",
            "users": "/api/users[/:username] (protected)",
            "plots": "/api/plots/users/:owner_id, /api/plots/:plot_id (protected)",
            "subdivisions": "/api/subdivisions/plots/:plot_id, /api/subdivisions/:subdivision_id (protected)",
            "crops": "/api/crops/plots/:plot_id, /api/crops/subdivisions/:subdivision_id, /api/crops/:crop_id (protected)",
            "issues": "/api/issues/plots/:plot_id, /api/issues/subdivisions/:subdivision_id, /api/issues/:issue_id (protected)",
            "jobs": "/api/jobs/plots/:plot_id, /api/jobs/:job_id (protected)",
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check().await {
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
                "database_error": e.to_string()
            })),
        ),
    }
}

async fn not_found() -> impl axum::response::IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({
            "message": "Not Found",
            "details": "Path not found"
        })),
    )
}
