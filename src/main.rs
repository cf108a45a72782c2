//! Urbanisme Commission Tracker Backend
//!
//! A production-grade REST backend with SQLite persistence for the municipal
//! urban-planning commission calendar.

mod api;
mod auth;
mod config;
mod db;
mod domain;
mod errors;
mod models;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
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
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Urbanisme Commission Tracker Backend");
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    // Warn if PSK is not configured
    if config.api_psk.is_none() {
        tracing::warn!("No API PSK configured (URBANISME_API_PSK). Authentication is disabled!");
    }

    // Initialize database
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));

    // Seed reference data on first run
    if repo.seed_if_empty().await? {
        tracing::info!("Empty store detected, seeded default reference data");
    }

    // Create application state
    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Clone PSK for the auth layer
    let psk = state.config.api_psk.clone();

    // API routes
    let api_routes = Router::new()
        // Whole-store export/import
        .route("/application-data", get(api::get_application_data))
        .route("/application-data", put(api::replace_application_data))
        // Commissions
        .route("/commissions", get(api::list_commissions))
        .route("/commissions", post(api::create_commission))
        .route("/commissions/generate", post(api::generate_next_year))
        .route("/commissions/restore", post(api::restore_commission))
        .route("/commissions/{num_acta}/{data}", get(api::get_commission))
        .route("/commissions/{num_acta}/{data}", put(api::rekey_commission))
        .route("/commissions/{num_acta}/{data}", patch(api::patch_commission))
        .route("/commissions/{num_acta}/{data}", delete(api::delete_commission))
        .route(
            "/commissions/{num_acta}/{data}/mark-sent",
            put(api::mark_commission_sent),
        )
        .route(
            "/commissions/{num_acta}/{data}/detail",
            get(api::get_commission_detail),
        )
        .route("/commission-details", post(api::save_commission_detail))
        // Admin reference lists
        .route("/admin/{list}", get(api::list_admin_items))
        .route("/admin/{list}", post(api::create_admin_item))
        .route("/admin/{list}/restore", post(api::restore_admin_item))
        .route("/admin/{list}/import", post(api::import_admin_items))
        .route("/admin/{list}/{id}", put(api::update_admin_item))
        .route("/admin/{list}/{id}", delete(api::delete_admin_item))
        // Users
        .route("/users", get(api::list_users))
        .route("/users", post(api::create_user))
        .route("/users/restore", post(api::restore_user))
        .route("/users/import", post(api::import_users))
        .route("/users/import-csv", post(api::import_users_csv))
        .route("/users/export-csv", get(api::export_users_csv))
        .route("/users/{id}", put(api::update_user))
        .route("/users/{id}", delete(api::delete_user))
        // Session
        .route("/login", post(api::login))
        // Statistics
        .route("/statistics/{year}", get(api::get_statistics))
        // Backups
        .route("/backups", get(api::list_backups))
        .route("/backups", post(api::create_backup))
        .route("/backups/{timestamp}/restore", post(api::restore_backup))
        .route("/backups/{timestamp}", delete(api::delete_backup))
        // Apply PSK auth middleware
        .layer(middleware::from_fn(move |req, next| {
            auth::psk_auth_layer(psk.clone(), req, next)
        }));

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

#[cfg(test)]
mod tests;
