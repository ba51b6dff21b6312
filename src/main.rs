//! Gatepass Server - Visitor Management System
//!
//! A Rust REST API server for visitor management.

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass_server::{
    api,
    config::AppConfig,
    repository::Repository,
    services::Services,
    AppState,
};

/// Upload cap for visitor photos
const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().expect("Failed to load configuration");

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("gatepass_server={},tower_http=debug", config.logging.level).into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Gatepass Server v{}", env!("CARGO_PKG_VERSION"));

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations completed");

    // Save server address before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(repository, config.email.clone(), config.visits.clone());

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().expect("Invalid host address"),
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes
fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API v1 routes
    let api_v1 = Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        .route("/ready", get(api::health::readiness_check))
        // Visitors
        .route("/visitors", post(api::visitors::register_visitor))
        .route("/visitors", get(api::visitors::list_visitors))
        .route("/visitors/search", get(api::visitors::search_visitors))
        .route("/visitors/status/:status", get(api::visitors::list_visitors_by_status))
        .route("/visitors/quick-checkin/:token", post(api::visitors::quick_check_in))
        .route("/visitors/:id", get(api::visitors::get_visitor))
        .route("/visitors/:id", put(api::visitors::update_visitor))
        .route("/visitors/:id", delete(api::visitors::delete_visitor))
        .route(
            "/visitors/:id/photo",
            post(api::visitors::upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        .route("/visitors/:id/checkin", post(api::visitors::check_in_visitor))
        .route("/visitors/:id/checkout", post(api::visitors::check_out_visitor))
        // Approval workflow
        .route("/approvals/approve/:token", post(api::approvals::approve_visitor))
        .route("/approvals/reject/:token", post(api::approvals::reject_visitor))
        .route("/approvals/pending", get(api::approvals::list_pending))
        .route("/approvals/pending/:employee_id", get(api::approvals::list_pending_for_employee))
        .route("/approvals/cleanup-expired", post(api::approvals::cleanup_expired))
        // Employees
        .route("/employees", post(api::employees::create_employee))
        .route("/employees", get(api::employees::list_employees))
        .route("/employees/search", get(api::employees::search_employees))
        .route("/employees/departments", get(api::employees::list_departments))
        .route("/employees/departments/:department", get(api::employees::list_department_employees))
        .route("/employees/email/:email", get(api::employees::get_employee_by_email))
        .route("/employees/:id", get(api::employees::get_employee))
        .route("/employees/:id", put(api::employees::update_employee))
        .route("/employees/:id", delete(api::employees::delete_employee))
        .route("/employees/:id/visitors", get(api::employees::list_employee_visitors))
        // Pre-approvals
        .route("/employees/:id/preapprovals", post(api::preapprovals::create_preapproval))
        .route("/employees/:id/preapprovals", get(api::preapprovals::list_preapprovals))
        .route("/employees/:id/preapprovals/limits", get(api::preapprovals::check_limits))
        .route("/employees/:id/preapprovals/:visitor_id", put(api::preapprovals::update_preapproval))
        .route("/employees/:id/preapprovals/:visitor_id", delete(api::preapprovals::cancel_preapproval))
        .with_state(state);

    // OpenAPI documentation
    let openapi = api::openapi::create_openapi_router();

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
