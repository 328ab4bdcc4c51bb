use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{AuthUser, Role},
    errors::ServiceError,
    services::catalog::CreateProductRequest,
    ApiResponse, AppState, ListQuery,
};

pub async fn create_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreateProductRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.create_product(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(product))))
}

pub async fn get_product(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let product = state.services.catalog.get_product(product_id).await?;
    Ok(Json(ApiResponse::ok(product)))
}

pub async fn list_products(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (products, total) = state
        .services
        .catalog
        .list_products(query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(products, total, &query)))
}

pub async fn deactivate_product(
    State(state): State<AppState>,
    user: AuthUser,
    Path(product_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    if !user.role.at_least(Role::Manager) {
        return Err(ServiceError::Forbidden(
            "Deactivating products requires the manager role".to_string(),
        ));
    }
    let product = state.services.catalog.deactivate_product(product_id).await?;
    Ok(Json(ApiResponse::ok(product)))
}
