use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    entities::stock_movement::MovementType,
    errors::ServiceError,
    services::{inventory::AdjustStockRequest, ledger::MovementFilter},
    ApiResponse, AppState, ListQuery,
};

#[derive(Debug, Deserialize)]
pub struct MovementFilterQuery {
    pub movement_type: Option<MovementType>,
    pub order_id: Option<Uuid>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StockLevelResponse {
    pub product_id: Uuid,
    pub sku: String,
    /// Cached counter, maintained transactionally with the ledger.
    pub stock_on_hand: Decimal,
    /// Signed sum over the movement ledger.
    pub derived_stock: Decimal,
    pub minimum_stock: Decimal,
    pub below_minimum: bool,
}

/// Manual stock adjustment (adjustment-in / adjustment-out / return-in).
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AdjustStockRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let adjustment = state.services.inventory.adjust(request, user.id).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(adjustment))))
}

/// Current stock for a product: the cached counter next to the ledger
/// derivation, so callers can see they agree.
pub async fn get_stock_level(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.inventory.stock_level(product_id).await?;
    let derived = state.services.ledger.current_stock(product_id).await?;

    Ok(Json(ApiResponse::ok(StockLevelResponse {
        product_id: product.id,
        sku: product.sku.clone(),
        stock_on_hand: product.stock_on_hand,
        derived_stock: derived,
        minimum_stock: product.minimum_stock,
        below_minimum: product.is_below_minimum(),
    })))
}

/// Movement history for a product, most recent first.
pub async fn movement_history(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
    Query(list): Query<ListQuery>,
    Query(query): Query<MovementFilterQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let filter = MovementFilter {
        movement_type: query.movement_type,
        order_id: query.order_id,
    };
    let (movements, total) = state
        .services
        .ledger
        .history(product_id, filter, list.page, list.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(movements, total, &list)))
}
