//! Timely Backend
//!
//! REST backend for school scheduling: schools, users, courses, calendar
//! events and bell schedules, persisted in SQLite.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod schedule;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize logging before the rest of the configuration so its warnings are kept
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config::log_level_from_env()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting Timely Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    match &config.bootstrap_admin {
        Some(admin) => {
            db::ensure_bootstrap_admin(&repo, admin, config.argon2).await?;
        }
        None => {
            tracing::warn!(
                "No bootstrap admin configured (TIMELY_ADMIN_EMAIL / TIMELY_ADMIN_PASSWORD)"
            );
        }
    }

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Everything except login requires a session token
    let protected_routes = Router::new()
        .route("/auth/profile", get(api::get_profile))
        // Schools
        .route("/schools", get(api::list_schools).post(api::create_school))
        .route(
            "/schools/{id}",
            get(api::get_school)
                .put(api::update_school)
                .delete(api::delete_school),
        )
        // Users
        .route("/users", get(api::list_users).post(api::create_user))
        .route(
            "/users/{id}",
            get(api::get_user)
                .put(api::update_user)
                .delete(api::delete_user),
        )
        // Courses
        .route("/courses", get(api::list_courses).post(api::create_course))
        .route(
            "/courses/{id}",
            put(api::update_course).delete(api::delete_course),
        )
        // Calendar
        .route("/calendar", get(api::list_events).post(api::create_event))
        .route(
            "/calendar/{id}",
            put(api::update_event).delete(api::delete_event),
        )
        // Bell schedules
        .route(
            "/bell-schedules",
            get(api::list_bell_schedules).post(api::create_bell_schedule),
        )
        .route(
            "/bell-schedules/{id}",
            put(api::update_bell_schedule).delete(api::delete_bell_schedule),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_user,
        ));

    let api_routes = Router::new()
        .route("/auth/login", post(api::login))
        .merge(protected_routes);

    // Health check (no auth required)
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}
