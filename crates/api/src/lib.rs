//! HTTP API server with observability for the order lifecycle service.
//!
//! Provides the public order form and tracking endpoints plus the admin
//! console API, with structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{LoggingDispatcher, NotificationDispatcher, OrderService, ServiceCatalog};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R: OrderRepository + 'static>(
    state: Arc<AppState<R>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let admin_router = Router::new()
        .route("/orders", get(routes::admin::list::<R>))
        .route("/orders/bulk-delete", post(routes::admin::bulk_delete::<R>))
        .route("/orders/bulk-status", post(routes::admin::bulk_status::<R>))
        .route(
            "/orders/{id}",
            get(routes::admin::get::<R>)
                .patch(routes::admin::update::<R>)
                .delete(routes::admin::delete::<R>),
        )
        .route(
            "/orders/{id}/status",
            post(routes::admin::update_status::<R>),
        );

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::create::<R>))
        .route("/orders/track/{code}", get(routes::orders::track::<R>))
        .nest("/admin", admin_router)
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state with log-only notifications and the
/// service catalogue from `config`.
pub fn create_default_state<R: OrderRepository>(
    repository: R,
    config: &Config,
) -> Arc<AppState<R>> {
    create_state(
        repository,
        config,
        Arc::new(LoggingDispatcher),
        Arc::new(config.service_catalog()),
    )
}

/// Creates the application state with the given collaborators.
pub fn create_state<R: OrderRepository>(
    repository: R,
    config: &Config,
    notifier: Arc<dyn NotificationDispatcher>,
    catalog: Arc<dyn ServiceCatalog>,
) -> Arc<AppState<R>> {
    let order_service = OrderService::new(repository)
        .with_code_generator(config.code_generator())
        .with_notifier(notifier)
        .with_catalog(catalog)
        .with_tracking_base_url(config.tracking_base_url.clone());

    Arc::new(AppState { order_service })
}
