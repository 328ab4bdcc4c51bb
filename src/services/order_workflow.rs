use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{
        order::{self, Entity as OrderEntity, OrderStatus, OrderType},
        order_line::{self, Entity as OrderLineEntity},
        product::{self, Entity as Product},
        stock_movement::MovementType,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        inventory::{AdjustStockRequest, InventoryService},
        orders::{next_reference_number, order_to_response, OrderResponse},
    },
};

/// Drives orders through their status machines.
///
/// A transition is one atomic unit: the legality check, any per-line stock
/// adjustments it implies, and the status update commit or roll back
/// together. Physical stock moves exactly once per order, on the type's
/// movement status (sales `shipped`, purchase `received`).
#[derive(Clone)]
pub struct OrderWorkflowService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl OrderWorkflowService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Transitions an order to `target`, adjusting stock when the target is
    /// the type's movement status. Illegal transitions fail with
    /// `InvalidTransition`; any line failure (e.g. insufficient stock)
    /// aborts the whole transition with the order untouched.
    #[instrument(skip(self), fields(order_id = %order_id, target = %target))]
    pub async fn transition(
        &self,
        order_id: Uuid,
        target: OrderStatus,
        actor_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let db = self.db.as_ref();
        let (order, lines, old_status) = db
            .transaction::<_, (order::Model, Vec<order_line::Model>, OrderStatus), ServiceError>(
                move |txn| {
                    Box::pin(async move {
                        let order = OrderEntity::find_by_id(order_id)
                            .lock_exclusive()
                            .one(txn)
                            .await
                            .map_err(ServiceError::classify_db_err)?
                            .ok_or_else(|| {
                                ServiceError::NotFound(format!("Order {} not found", order_id))
                            })?;

                        let old_status = order.status;
                        if !order.order_type.allows_transition(old_status, target) {
                            return Err(ServiceError::InvalidTransition(format!(
                                "{} {} cannot move from {} to {}",
                                order.order_type, order.reference_number, old_status, target
                            )));
                        }

                        let lines = OrderLineEntity::find()
                            .filter(order_line::Column::OrderId.eq(order.id))
                            .order_by_asc(order_line::Column::LineNumber)
                            .all(txn)
                            .await
                            .map_err(ServiceError::classify_db_err)?;

                        if order.order_type.movement_status() == Some(target) {
                            Self::adjust_lines(txn, &order, &lines, actor_id).await?;
                        }

                        let mut active: order::ActiveModel = order.clone().into();
                        active.status = Set(target);
                        active.updated_at = Set(Some(Utc::now()));
                        active.version = Set(order.version + 1);
                        let updated = active
                            .update(txn)
                            .await
                            .map_err(ServiceError::classify_db_err)?;

                        Ok((updated, lines, old_status))
                    })
                },
            )
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(
            reference = %order.reference_number,
            from = %old_status,
            to = %order.status,
            "order transitioned"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::OrderStatusChanged {
                order_id: order.id,
                old_status: old_status.to_string(),
                new_status: order.status.to_string(),
            })
            .await
        {
            warn!(error = %e, "failed to send status changed event");
        }

        Ok(order_to_response(order, lines))
    }

    /// Cancels an order. Fulfilled orders (shipped/delivered, received/
    /// completed) refuse with `InvalidTransition`; quotes end in
    /// rejected/expired instead of cancellation.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel(
        &self,
        order_id: Uuid,
        actor_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        self.transition(order_id, OrderStatus::Cancelled, actor_id)
            .await
    }

    /// Converts an approved quote into a new draft sales order: every line
    /// is copied, the quote becomes `converted` with a back-reference, and
    /// both writes share one transaction.
    #[instrument(skip(self), fields(quote_id = %quote_id))]
    pub async fn convert_quote(
        &self,
        quote_id: Uuid,
        actor_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let db = self.db.as_ref();
        let (sales_order, lines) = db
            .transaction::<_, (order::Model, Vec<order_line::Model>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let quote = OrderEntity::find_by_id(quote_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Quote {} not found", quote_id))
                        })?;

                    if quote.order_type != OrderType::Quote {
                        return Err(ServiceError::ValidationError(format!(
                            "{} is not a quote",
                            quote.reference_number
                        )));
                    }
                    if quote.status != OrderStatus::Approved {
                        return Err(ServiceError::InvalidTransition(format!(
                            "Quote {} is {}, only approved quotes can be converted",
                            quote.reference_number, quote.status
                        )));
                    }

                    let quote_lines = OrderLineEntity::find()
                        .filter(order_line::Column::OrderId.eq(quote.id))
                        .order_by_asc(order_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    let now = Utc::now();
                    let reference_number =
                        next_reference_number(txn, OrderType::SalesOrder, now).await?;

                    let header = order::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        reference_number: Set(reference_number),
                        order_type: Set(OrderType::SalesOrder),
                        party_id: Set(quote.party_id),
                        status: Set(OrderStatus::Draft),
                        order_date: Set(now),
                        expected_date: Set(quote.expected_date),
                        subtotal: Set(quote.subtotal),
                        discount_percent: Set(quote.discount_percent),
                        discount_amount: Set(quote.discount_amount),
                        tax_percent: Set(quote.tax_percent),
                        tax_amount: Set(quote.tax_amount),
                        total_amount: Set(quote.total_amount),
                        notes: Set(quote.notes.clone()),
                        quote_id: Set(Some(quote.id)),
                        converted_order_id: Set(None),
                        created_by: Set(actor_id),
                        updated_at: Set(None),
                        version: Set(1),
                        ..Default::default()
                    };
                    let sales_order = header
                        .insert(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    for line in &quote_lines {
                        let copy = order_line::ActiveModel {
                            id: Set(Uuid::new_v4()),
                            order_id: Set(sales_order.id),
                            line_number: Set(line.line_number),
                            product_id: Set(line.product_id),
                            description: Set(line.description.clone()),
                            quantity: Set(line.quantity),
                            unit_price: Set(line.unit_price),
                            discount_percent: Set(line.discount_percent),
                            tax_percent: Set(line.tax_percent),
                            line_total: Set(line.line_total),
                        };
                        copy.insert(txn)
                            .await
                            .map_err(ServiceError::classify_db_err)?;
                    }

                    let mut active: order::ActiveModel = quote.clone().into();
                    active.status = Set(OrderStatus::Converted);
                    active.converted_order_id = Set(Some(sales_order.id));
                    active.updated_at = Set(Some(now));
                    active.version = Set(quote.version + 1);
                    active
                        .update(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    let lines = OrderLineEntity::find()
                        .filter(order_line::Column::OrderId.eq(sales_order.id))
                        .order_by_asc(order_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    Ok((sales_order, lines))
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(
            quote_id = %quote_id,
            sales_order = %sales_order.reference_number,
            "quote converted"
        );

        if let Err(e) = self
            .event_sender
            .send(Event::QuoteConverted {
                quote_id,
                sales_order_id: sales_order.id,
            })
            .await
        {
            warn!(error = %e, "failed to send quote converted event");
        }

        Ok(order_to_response(sales_order, lines))
    }

    /// Adjusts stock for every line of an order: outbound for sales
    /// shipments, inbound for purchase receipts. One ledger entry per line;
    /// products that do not track stock are skipped. Runs inside the
    /// transition's transaction, so the first failing line unwinds every
    /// earlier line's adjustment along with the status change.
    async fn adjust_lines(
        txn: &DatabaseTransaction,
        order: &order::Model,
        lines: &[order_line::Model],
        actor_id: Uuid,
    ) -> Result<(), ServiceError> {
        if lines.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "Order {} has no lines to fulfill",
                order.reference_number
            )));
        }

        let movement_type = match order.order_type {
            OrderType::SalesOrder => MovementType::Sale,
            OrderType::PurchaseOrder => MovementType::Purchase,
            OrderType::Quote => return Ok(()),
        };

        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
        let tracked: HashMap<Uuid, bool> = Product::find()
            .filter(product::Column::Id.is_in(product_ids))
            .all(txn)
            .await
            .map_err(ServiceError::classify_db_err)?
            .into_iter()
            .map(|p| (p.id, p.track_stock))
            .collect();

        for line in lines {
            match tracked.get(&line.product_id) {
                Some(true) => {}
                Some(false) => continue,
                None => {
                    return Err(ServiceError::NotFound(format!(
                        "Product {} not found",
                        line.product_id
                    )))
                }
            }

            InventoryService::adjust_in_txn(
                txn,
                &AdjustStockRequest {
                    product_id: line.product_id,
                    movement_type,
                    quantity: line.quantity,
                    unit_price: Some(line.unit_price),
                    order_id: Some(order.id),
                    location: None,
                    remarks: Some(format!(
                        "{} line {}",
                        order.reference_number, line.line_number
                    )),
                },
                actor_id,
            )
            .await?;
        }

        Ok(())
    }
}
