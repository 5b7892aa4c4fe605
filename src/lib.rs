//! Inventory API Library
//!
//! Item CRUD service (primary and fallback roles), online price lookup, and
//! the client layer that encodes the fallback policy.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{
    http::{HeaderValue, Uri},
    routing::{delete, get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::config::{AppConfig, InstanceRole};
use crate::services::{ItemService, PriceLookupService};

/// Shared handler state: the store pool, configuration, instance role and services.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: AppConfig,
    pub role: InstanceRole,
    pub items: Arc<ItemService>,
    pub price_lookup: Arc<PriceLookupService>,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: AppConfig) -> Result<Self, ServiceError> {
        let price_lookup = PriceLookupService::from_config(&config)?;
        Ok(Self {
            items: Arc::new(ItemService::new(db.clone())),
            price_lookup: Arc::new(price_lookup),
            role: config.role(),
            db,
            config,
        })
    }
}

/// Inventory routes mounted for `role`. A fallback instance serves only
/// count-items and clear-list.
pub fn inventory_routes(role: InstanceRole) -> Router<AppState> {
    use handlers::{items, price_lookup};

    let shared = Router::new()
        .route("/count-items", get(items::count_items))
        .route("/clear-list", delete(items::clear_list));

    match role {
        InstanceRole::Primary => shared
            .route("/generate-id", get(items::generate_id))
            .route("/add-item", post(items::add_item))
            .route("/search-item", get(items::search_item))
            .route("/view-list", get(items::view_list))
            .route("/delete-item", delete(items::delete_item))
            .route("/search-online", get(price_lookup::search_online)),
        InstanceRole::Fallback => shared,
    }
}

async fn route_not_found(uri: Uri) -> ServiceError {
    ServiceError::NotFound(format!("No route for {}", uri.path()))
}

/// Full application router: inventory routes, health, OpenAPI, plus the
/// request-id, tracing and timeout layers. CORS is applied by the caller.
pub fn app_router(state: AppState) -> Router {
    let timeout = state.config.request_timeout();

    Router::<AppState>::new()
        .merge(inventory_routes(state.role))
        .merge(health::health_routes())
        .merge(openapi::swagger_ui())
        .fallback(route_not_found)
        .layer(crate::tracing::configure_http_tracing())
        .layer(TimeoutLayer::new(timeout))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

/// Builds the CORS layer from configuration.
pub fn cors_layer(cfg: &AppConfig) -> Result<CorsLayer, ServiceError> {
    let configured_origins: Option<Vec<HeaderValue>> = cfg
        .cors_allowed_origins
        .as_ref()
        .map(|raw| {
            raw.split(',')
                .filter_map(|origin| {
                    let trimmed = origin.trim();
                    if trimmed.is_empty() {
                        None
                    } else {
                        HeaderValue::from_str(trimmed).ok()
                    }
                })
                .collect::<Vec<_>>()
        })
        .filter(|origins| !origins.is_empty());

    if let Some(origins) = configured_origins {
        Ok(CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any))
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Ok(CorsLayer::permissive())
    } else {
        Err(ServiceError::InternalError(
            "Missing CORS configuration: set APP__CORS_ALLOWED_ORIGINS or APP__CORS_ALLOW_ANY_ORIGIN=true"
                .to_string(),
        ))
    }
}

pub use config::{load_config, AppConfigError};
pub use errors::{ErrorResponse, ServiceError};
