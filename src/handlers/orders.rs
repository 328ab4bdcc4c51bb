use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::order::{OrderStatus, OrderType},
    errors::ServiceError,
    services::orders::{CreateOrderRequest, OrderFilter, UpdateOrderRequest},
    ApiResponse, AppState, ListQuery,
};

#[derive(Debug, Deserialize)]
pub struct OrderFilterQuery {
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub party_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransitionRequest {
    pub target: OrderStatus,
}

pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.create_order(request, user.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}

pub async fn get_order(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.orders.get_order(order_id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(list): Query<ListQuery>,
    Query(query): Query<OrderFilterQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = OrderFilter {
        order_type: query.order_type,
        status: query.status,
        party_id: query.party_id,
    };
    let response = state
        .services
        .orders
        .list_orders(filter, list.page, list.limit)
        .await?;
    Ok(Json(ApiResponse::ok(response)))
}

/// Header/line updates; only draft and pending orders accept them.
pub async fn update_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<UpdateOrderRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .orders
        .update_order(order_id, request, user.id)
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Status transition; moves stock when the target is the type's movement
/// status (sales shipped, purchase received).
pub async fn transition_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
    Json(request): Json<TransitionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .workflow
        .transition(order_id, request.target, user.id)
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}

pub async fn cancel_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(order_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state.services.workflow.cancel(order_id, user.id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Converts an approved quote into a draft sales order.
pub async fn convert_quote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let order = state
        .services
        .workflow
        .convert_quote(quote_id, user.id)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(order))))
}
