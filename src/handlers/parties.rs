use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{AuthUser, Role},
    entities::party::PartyKind,
    errors::ServiceError,
    services::catalog::CreatePartyRequest,
    ApiResponse, AppState, ListQuery,
};

#[derive(Debug, Deserialize)]
pub struct PartyFilterQuery {
    pub kind: Option<PartyKind>,
}

pub async fn create_party(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(request): Json<CreatePartyRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let party = state.services.catalog.create_party(request).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(party))))
}

pub async fn get_party(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(party_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let party = state.services.catalog.get_party(party_id).await?;
    Ok(Json(ApiResponse::ok(party)))
}

pub async fn list_parties(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(list): Query<ListQuery>,
    Query(filter): Query<PartyFilterQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let (parties, total) = state
        .services
        .catalog
        .list_parties(filter.kind, list.page, list.limit)
        .await?;
    Ok(Json(ApiResponse::paginated(parties, total, &list)))
}

pub async fn deactivate_party(
    State(state): State<AppState>,
    user: AuthUser,
    Path(party_id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    if !user.role.at_least(Role::Manager) {
        return Err(ServiceError::Forbidden(
            "Deactivating parties requires the manager role".to_string(),
        ));
    }
    let party = state.services.catalog.deactivate_party(party_id).await?;
    Ok(Json(ApiResponse::ok(party)))
}
