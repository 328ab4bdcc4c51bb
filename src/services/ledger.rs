use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::stock_movement::{self, Entity as StockMovement, MovementType},
    errors::ServiceError,
};

/// A movement row to be appended. The signed quantity and the before/after
/// stock levels are computed by the inventory adjustor under the product
/// lock; the ledger itself never derives them.
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed: positive inbound, negative outbound.
    pub quantity: Decimal,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    pub unit_price: Option<Decimal>,
    pub order_id: Option<Uuid>,
    pub location: Option<String>,
    pub remarks: Option<String>,
    pub created_by: Uuid,
}

/// Filters for movement history queries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovementFilter {
    pub movement_type: Option<MovementType>,
    pub order_id: Option<Uuid>,
}

/// The append-only stock ledger.
///
/// No update or delete is exposed anywhere in this module; corrections are
/// recorded as new offsetting movements by the inventory adjustor.
#[derive(Clone)]
pub struct LedgerService {
    db: Arc<DbPool>,
}

impl LedgerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Appends one movement row on the given connection. Called inside the
    /// adjustor's transaction so the row commits or rolls back together
    /// with the stock change that produced it.
    pub async fn append<C: ConnectionTrait>(
        conn: &C,
        movement: NewMovement,
    ) -> Result<stock_movement::Model, ServiceError> {
        let row = stock_movement::ActiveModel {
            product_id: Set(movement.product_id),
            movement_type: Set(movement.movement_type),
            quantity: Set(movement.quantity),
            quantity_before: Set(movement.quantity_before),
            quantity_after: Set(movement.quantity_after),
            unit_price: Set(movement.unit_price),
            order_id: Set(movement.order_id),
            location: Set(movement.location),
            remarks: Set(movement.remarks),
            created_by: Set(movement.created_by),
            approved_by: Set(None),
            ..Default::default()
        };

        row.insert(conn).await.map_err(ServiceError::classify_db_err)
    }

    /// Derived current stock: the signed sum of every committed movement
    /// for the product. Reads only committed state, so two calls with no
    /// intervening writes return the same value.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn current_stock(&self, product_id: Uuid) -> Result<Decimal, ServiceError> {
        Self::current_stock_on(self.db.as_ref(), product_id).await
    }

    /// Same derivation, usable on a transaction so callers can compare the
    /// ledger sum against the cached counter under one snapshot.
    pub async fn current_stock_on<C: ConnectionTrait>(
        conn: &C,
        product_id: Uuid,
    ) -> Result<Decimal, ServiceError> {
        let total: Option<Option<Decimal>> = StockMovement::find()
            .select_only()
            .column_as(stock_movement::Column::Quantity.sum(), "total")
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .into_tuple()
            .one(conn)
            .await
            .map_err(ServiceError::classify_db_err)?;

        Ok(total.flatten().unwrap_or(Decimal::ZERO))
    }

    /// Movement history for a product, most recent first.
    #[instrument(skip(self, filter), fields(product_id = %product_id))]
    pub async fn history(
        &self,
        product_id: Uuid,
        filter: MovementFilter,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<stock_movement::Model>, u64), ServiceError> {
        let mut query = StockMovement::find()
            .filter(stock_movement::Column::ProductId.eq(product_id))
            .order_by_desc(stock_movement::Column::Id);

        if let Some(movement_type) = filter.movement_type {
            query = query.filter(stock_movement::Column::MovementType.eq(movement_type));
        }
        if let Some(order_id) = filter.order_id {
            query = query.filter(stock_movement::Column::OrderId.eq(order_id));
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
}
