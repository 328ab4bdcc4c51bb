use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::{financial_transaction::TransactionKind, voucher::VoucherStatus},
    errors::ServiceError,
    services::finance::{
        CreateVoucherRequest, RecordTransactionRequest, SettleVoucherRequest, TransactionFilter,
    },
    ApiResponse, AppState, ListQuery,
};

#[derive(Debug, Deserialize)]
pub struct TransactionFilterQuery {
    pub kind: Option<TransactionKind>,
    pub party_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct VoucherFilterQuery {
    pub status: Option<VoucherStatus>,
}

pub async fn record_transaction(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<RecordTransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transaction = state.services.finance.record(request, user.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(transaction))))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(list): Query<ListQuery>,
    Query(query): Query<TransactionFilterQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = TransactionFilter {
        kind: query.kind,
        party_id: query.party_id,
        from: query.from,
        to: query.to,
    };
    let (transactions, total) = state
        .services
        .finance
        .list_transactions(filter, list.page, list.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(transactions, total, &list)))
}

pub async fn create_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVoucherRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let voucher = state.services.finance.create_voucher(request, user.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(voucher))))
}

pub async fn list_vouchers(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(list): Query<ListQuery>,
    Query(query): Query<VoucherFilterQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (vouchers, total) = state
        .services
        .finance
        .list_vouchers(query.status, list.page, list.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(vouchers, total, &list)))
}

/// Settles a pending voucher, appending its financial transaction in the
/// same atomic unit.
pub async fn settle_voucher(
    State(state): State<AppState>,
    user: AuthUser,
    Path(voucher_id): Path<Uuid>,
    Json(request): Json<SettleVoucherRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let settlement = state
        .services
        .finance
        .settle_voucher(voucher_id, request, user.id)
        .await?;
    Ok(Json(ApiResponse::ok(settlement)))
}
