//! HTTP API Layer
//!
//! REST API for fee balances using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: health, roster, single-learner and inline balance endpoints
//! - **Middleware**: request ids, tracing, request logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent `{error, message}` responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(Arc::new(PostgresFeeLedger::new(pool)), config);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;

use std::sync::Arc;

use axum::{
    http::HeaderName,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_fees::{FeeLedgerPort, RosterService};

use crate::config::ApiConfig;
use crate::handlers::{fees, health};
use crate::middleware::{request_log_middleware, REQUEST_ID_HEADER};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn FeeLedgerPort>,
    pub roster: Arc<RosterService>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(ledger: Arc<dyn FeeLedgerPort>, config: ApiConfig) -> Self {
        let roster = RosterService::new(Arc::clone(&ledger), config.roster_settings());
        Self {
            ledger,
            roster: Arc::new(roster),
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `ledger` - Source of learners and fee records
/// * `config` - API configuration
pub fn create_router(ledger: Arc<dyn FeeLedgerPort>, config: ApiConfig) -> Router {
    let state = AppState::new(ledger, config);
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let api_routes = Router::new()
        .route("/grades/:grade_id/fee-balances", get(fees::grade_fee_balances))
        .route("/learners/:learner_id/fee-balance", get(fees::learner_fee_balance))
        .route("/fee-balances/compute", post(fees::compute_fee_balance));

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(axum_middleware::from_fn(request_log_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
