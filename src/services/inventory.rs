use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::DbPool,
    entities::{
        product::{self, Entity as Product},
        stock_movement::MovementType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::ledger::{LedgerService, NewMovement},
};

/// A stock adjustment request. The quantity is unsigned; the movement type
/// carries the direction.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    pub product_id: Uuid,
    pub movement_type: MovementType,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    pub order_id: Option<Uuid>,
    pub location: Option<String>,
    #[validate(length(max = 500, message = "Remarks must be at most 500 characters"))]
    pub remarks: Option<String>,
}

/// Outcome of a committed adjustment.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StockAdjustment {
    pub movement_id: i64,
    pub product_id: Uuid,
    /// Signed quantity actually applied.
    pub quantity: Decimal,
    pub new_stock: Decimal,
}

/// The single mutation path for product stock.
///
/// Every adjustment runs as one atomic unit: lock the product row, verify
/// the outbound invariant, append the ledger row, update the cached
/// counter. Adjustments against different products proceed in parallel;
/// adjustments against the same product serialize on the row lock.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Applies one stock adjustment in its own transaction.
    #[instrument(skip(self, request), fields(product_id = %request.product_id, movement_type = %request.movement_type))]
    pub async fn adjust(
        &self,
        request: AdjustStockRequest,
        actor_id: Uuid,
    ) -> Result<StockAdjustment, ServiceError> {
        request.validate().map_err(ServiceError::from)?;

        let db = self.db.as_ref();
        let req = request.clone();
        let (adjustment, product) = db
            .transaction::<_, (StockAdjustment, product::Model), ServiceError>(move |txn| {
                Box::pin(async move { Self::adjust_in_txn(txn, &req, actor_id).await })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(
            movement_id = adjustment.movement_id,
            new_stock = %adjustment.new_stock,
            "stock adjusted"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::StockAdjusted {
                product_id: adjustment.product_id,
                movement_id: adjustment.movement_id,
                quantity: adjustment.quantity,
                new_stock: adjustment.new_stock,
            })
            .await
        {
            warn!(error = %e, "failed to send stock adjusted event");
        }

        if product.track_stock && adjustment.new_stock < product.minimum_stock {
            if let Err(e) = self
                .event_sender
                .send(Event::StockBelowMinimum {
                    product_id: product.id,
                    stock_on_hand: adjustment.new_stock,
                    minimum_stock: product.minimum_stock,
                })
                .await
            {
                warn!(error = %e, "failed to send low stock event");
            }
        }

        Ok(adjustment)
    }

    /// The transactional body of an adjustment, composable into a larger
    /// unit (order transitions run one of these per line inside the
    /// transition's own transaction).
    ///
    /// Steps: lock the product row, compute the new level, reject negative
    /// outcomes, append the ledger row with before/after levels, update the
    /// cached counter. Any error unwinds the caller's whole transaction.
    pub(crate) async fn adjust_in_txn(
        txn: &DatabaseTransaction,
        request: &AdjustStockRequest,
        actor_id: Uuid,
    ) -> Result<(StockAdjustment, product::Model), ServiceError> {
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Adjustment quantity must be positive".to_string(),
            ));
        }

        // Row-level exclusive lock: concurrent adjustments against the same
        // product serialize here.
        let product = Product::find_by_id(request.product_id)
            .lock_exclusive()
            .one(txn)
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", request.product_id))
            })?;

        if !product.track_stock {
            return Err(ServiceError::ValidationError(format!(
                "Product {} does not track stock",
                product.sku
            )));
        }

        let signed_quantity = if request.movement_type.is_outbound() {
            -request.quantity
        } else {
            request.quantity
        };

        let stock_before = product.stock_on_hand;
        let stock_after = stock_before + signed_quantity;

        if stock_after < Decimal::ZERO {
            return Err(ServiceError::InsufficientStock(format!(
                "Product {}: requested {}, available {}",
                product.sku, request.quantity, stock_before
            )));
        }

        let movement = LedgerService::append(
            txn,
            NewMovement {
                product_id: product.id,
                movement_type: request.movement_type,
                quantity: signed_quantity,
                quantity_before: stock_before,
                quantity_after: stock_after,
                unit_price: request.unit_price,
                order_id: request.order_id,
                location: request.location.clone(),
                remarks: request.remarks.clone(),
                created_by: actor_id,
            },
        )
        .await?;

        // Keep the cached counter consistent with the ledger inside the
        // same transaction.
        let mut active: product::ActiveModel = product.clone().into();
        active.stock_on_hand = Set(stock_after);
        active.updated_at = Set(Some(chrono::Utc::now()));
        let updated = active
            .update(txn)
            .await
            .map_err(ServiceError::classify_db_err)?;

        Ok((
            StockAdjustment {
                movement_id: movement.id,
                product_id: product.id,
                quantity: signed_quantity,
                new_stock: stock_after,
            },
            updated,
        ))
    }

    /// Reads the cached stock level for a product.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn stock_level(&self, product_id: Uuid) -> Result<product::Model, ServiceError> {
        Product::find_by_id(product_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", product_id)))
    }
}
