//! Tradeforge API Library
//!
//! Order-to-stock workflow backend for a small manufacturing/trading
//! business: product catalog, append-only stock ledger, sales/purchase
//! orders and quotes with status machines, financial transactions, vouchers
//! and payment schedules.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod logging;
pub mod migrator;
pub mod openapi;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let services = services::AppServices::new(db.clone(), event_sender.clone());
        Self {
            db,
            config,
            event_sender,
            services,
        }
    }
}

/// Common query parameters for list endpoints.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}
fn default_limit() -> u64 {
    20
}

/// Standard response envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<PageMeta>,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: None,
        }
    }

    pub fn paginated(data: T, total: u64, query: &ListQuery) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(PageMeta {
                total,
                page: query.page,
                limit: query.limit,
            }),
        }
    }
}

/// Builds the full application router with the standard middleware stack.
pub fn app_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.request_timeout_secs);

    let api = Router::new()
        // catalog
        .route(
            "/products",
            post(handlers::products::create_product).get(handlers::products::list_products),
        )
        .route(
            "/products/:id",
            get(handlers::products::get_product).delete(handlers::products::deactivate_product),
        )
        .route(
            "/parties",
            post(handlers::parties::create_party).get(handlers::parties::list_parties),
        )
        .route(
            "/parties/:id",
            get(handlers::parties::get_party).delete(handlers::parties::deactivate_party),
        )
        // inventory & ledger
        .route(
            "/inventory/adjustments",
            post(handlers::inventory::adjust_stock),
        )
        .route(
            "/inventory/:product_id",
            get(handlers::inventory::get_stock_level),
        )
        .route(
            "/inventory/:product_id/movements",
            get(handlers::inventory::movement_history),
        )
        // orders & workflow
        .route(
            "/orders",
            post(handlers::orders::create_order).get(handlers::orders::list_orders),
        )
        .route(
            "/orders/:id",
            get(handlers::orders::get_order).put(handlers::orders::update_order),
        )
        .route(
            "/orders/:id/transition",
            post(handlers::orders::transition_order),
        )
        .route("/orders/:id/cancel", post(handlers::orders::cancel_order))
        .route("/quotes/:id/convert", post(handlers::orders::convert_quote))
        // finance
        .route(
            "/finance/transactions",
            post(handlers::finance::record_transaction).get(handlers::finance::list_transactions),
        )
        .route(
            "/finance/vouchers",
            post(handlers::finance::create_voucher).get(handlers::finance::list_vouchers),
        )
        .route(
            "/finance/vouchers/:id/settle",
            post(handlers::finance::settle_voucher),
        )
        // payment schedules
        .route(
            "/payment-schedules/models",
            post(handlers::payment_schedules::create_model),
        )
        .route(
            "/payment-schedules/models/:id",
            get(handlers::payment_schedules::get_model),
        )
        .route(
            "/payment-schedules/apply",
            post(handlers::payment_schedules::apply_schedule),
        )
        .route(
            "/payment-schedules/orders/:order_id",
            get(handlers::payment_schedules::list_for_order),
        )
        .route(
            "/payment-schedules/:id/status",
            put(handlers::payment_schedules::update_installment_status),
        )
        // reports
        .route("/reports/low-stock", get(handlers::reports::low_stock))
        .route(
            "/reports/stock-valuation",
            get(handlers::reports::stock_valuation),
        )
        .route(
            "/reports/finance-summary",
            get(handlers::reports::finance_summary),
        )
        .route(
            "/reports/outstanding-vouchers",
            get(handlers::reports::outstanding_vouchers),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .nest("/api/v1", api)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(request_timeout))
        .with_state(state)
}
