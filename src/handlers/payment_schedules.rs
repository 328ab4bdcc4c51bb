use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::payment_schedule::ScheduleStatus,
    errors::ServiceError,
    services::payment_schedules::{ApplyScheduleRequest, CreateModelRequest},
    ApiResponse, AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct InstallmentStatusRequest {
    pub status: ScheduleStatus,
}

pub async fn create_model(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateModelRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state
        .services
        .payment_schedules
        .create_model(request, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(model))))
}

pub async fn get_model(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(model_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let model = state.services.payment_schedules.get_model(model_id).await?;
    Ok(Json(ApiResponse::ok(model)))
}

/// Applies a model to an order, generating its pending installments.
pub async fn apply_schedule(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<ApplyScheduleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let installments = state
        .services
        .payment_schedules
        .apply_schedule(request, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(installments))))
}

pub async fn list_for_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let installments = state
        .services
        .payment_schedules
        .list_for_order(order_id)
        .await?;
    Ok(Json(ApiResponse::ok(installments)))
}

pub async fn update_installment_status(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(schedule_id): Path<Uuid>,
    Json(request): Json<InstallmentStatusRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let installment = state
        .services
        .payment_schedules
        .update_installment_status(schedule_id, request.status)
        .await?;
    Ok(Json(ApiResponse::ok(installment)))
}
