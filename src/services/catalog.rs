use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        party::{self, Entity as Party, PartyKind},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 16, message = "Unit is required"))]
    pub unit: String,
    #[serde(default)]
    pub unit_price: Decimal,
    #[serde(default)]
    pub minimum_stock: Decimal,
    #[serde(default)]
    pub reorder_quantity: Decimal,
    #[serde(default = "default_true")]
    pub track_stock: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePartyRequest {
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    pub kind: PartyKind,
    #[validate(email(message = "Email must be valid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

fn default_true() -> bool {
    true
}

/// Catalog and counterparty management: create, list, soft-deactivate.
///
/// Neither products nor parties are ever deleted; movements and orders keep
/// referencing them after deactivation.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if request.unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Unit price must not be negative".to_string(),
            ));
        }

        let row = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(request.sku),
            name: Set(request.name),
            unit: Set(request.unit),
            unit_price: Set(request.unit_price),
            minimum_stock: Set(request.minimum_stock),
            reorder_quantity: Set(request.reorder_quantity),
            track_stock: Set(request.track_stock),
            is_active: Set(true),
            stock_on_hand: Set(Decimal::ZERO),
            updated_at: Set(None),
            ..Default::default()
        };
        row.insert(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }

    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let paginator = Product::find()
            .order_by_asc(product::Column::Sku)
            .paginate(self.db.as_ref(), limit.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::classify_db_err)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::classify_db_err)?;
        Ok((rows, total))
    }

    /// Soft-deactivates a product; it stays referencable by history.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn deactivate_product(
        &self,
        product_id: Uuid,
    ) -> Result<product::Model, ServiceError> {
        let product = self.get_product(product_id).await?;
        let mut active: product::ActiveModel = product.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_party(
        &self,
        request: CreatePartyRequest,
    ) -> Result<party::Model, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let row = party::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            kind: Set(request.kind),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            is_active: Set(true),
            created_at: Set(Utc::now()),
            updated_at: Set(None),
        };
        row.insert(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }

    #[instrument(skip(self), fields(party_id = %party_id))]
    pub async fn get_party(&self, party_id: Uuid) -> Result<party::Model, ServiceError> {
        Party::find_by_id(party_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| ServiceError::NotFound(format!("Party {} not found", party_id)))
    }

    #[instrument(skip(self))]
    pub async fn list_parties(
        &self,
        kind: Option<PartyKind>,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<party::Model>, u64), ServiceError> {
        let mut query = Party::find().order_by_asc(party::Column::Name);
        if let Some(kind) = kind {
            query = query.filter(party::Column::Kind.eq(kind));
        }
        let paginator = query.paginate(self.db.as_ref(), limit.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::classify_db_err)?;
        let rows = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::classify_db_err)?;
        Ok((rows, total))
    }

    /// Soft-deactivates a party.
    #[instrument(skip(self), fields(party_id = %party_id))]
    pub async fn deactivate_party(&self, party_id: Uuid) -> Result<party::Model, ServiceError> {
        let party = self.get_party(party_id).await?;
        let mut active: party::ActiveModel = party.into();
        active.is_active = Set(false);
        active.updated_at = Set(Some(Utc::now()));
        active
            .update(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)
    }
}
