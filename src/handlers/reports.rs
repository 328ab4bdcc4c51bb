use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{auth::AuthUser, errors::ServiceError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

pub async fn low_stock(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let products = state.services.reports.low_stock().await?;
    Ok(Json(ApiResponse::ok(products)))
}

pub async fn stock_valuation(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let valuation = state.services.reports.stock_valuation().await?;
    Ok(Json(ApiResponse::ok(valuation)))
}

pub async fn finance_summary(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<DateRangeQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let summary = state
        .services
        .reports
        .finance_summary(query.from, query.to)
        .await?;
    Ok(Json(ApiResponse::ok(summary)))
}

pub async fn outstanding_vouchers(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<impl IntoResponse, ServiceError> {
    let outstanding = state.services.reports.outstanding_vouchers().await?;
    Ok(Json(ApiResponse::ok(outstanding)))
}
