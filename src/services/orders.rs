use chrono::{DateTime, Datelike, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
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
        order::{self, Entity as OrderEntity, OrderStatus, OrderType},
        order_line::{self, Entity as OrderLineEntity},
        party::{self, Entity as Party, PartyKind},
        product::{self, Entity as Product},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Rounds a monetary amount to 2 decimal places, half away from zero.
pub(crate) fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// quantity × unit_price × (1 − discount/100), rounded per currency.
pub(crate) fn line_total(quantity: Decimal, unit_price: Decimal, discount_percent: Decimal) -> Decimal {
    round_money(quantity * unit_price * (Decimal::ONE - discount_percent / HUNDRED))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Derives order-level totals from line totals. Always recomputed on every
/// write; the stored columns are never trusted as input.
pub(crate) fn compute_totals(
    line_totals: &[Decimal],
    discount_percent: Decimal,
    tax_percent: Decimal,
) -> OrderTotals {
    let subtotal: Decimal = round_money(line_totals.iter().copied().sum());
    let discount_amount = round_money(subtotal * discount_percent / HUNDRED);
    let taxable = subtotal - discount_amount;
    let tax_amount = round_money(taxable * tax_percent / HUNDRED);
    let total = taxable + tax_amount;
    OrderTotals {
        subtotal,
        discount_amount,
        tax_amount,
        total,
    }
}

fn validate_percent(value: Decimal, field: &str) -> Result<(), ServiceError> {
    if value < Decimal::ZERO || value > HUNDRED {
        return Err(ServiceError::ValidationError(format!(
            "{field} must be between 0 and 100"
        )));
    }
    Ok(())
}

/// One requested order line. `unit_price` falls back to the product's
/// catalog price when omitted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: Decimal,
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub order_type: OrderType,
    pub party_id: Uuid,
    pub order_date: Option<DateTime<Utc>>,
    pub expected_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discount_percent: Decimal,
    #[serde(default)]
    pub tax_percent: Decimal,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
    pub lines: Vec<OrderLineRequest>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub expected_date: Option<DateTime<Utc>>,
    pub discount_percent: Option<Decimal>,
    pub tax_percent: Option<Decimal>,
    #[validate(length(max = 1000, message = "Notes must be at most 1000 characters"))]
    pub notes: Option<String>,
    /// When present, replaces the full line set.
    pub lines: Option<Vec<OrderLineRequest>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub line_number: i32,
    pub product_id: Uuid,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub reference_number: String,
    pub order_type: OrderType,
    pub party_id: Uuid,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub expected_date: Option<DateTime<Utc>>,
    pub subtotal: Decimal,
    pub discount_percent: Decimal,
    pub discount_amount: Decimal,
    pub tax_percent: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub quote_id: Option<Uuid>,
    pub converted_order_id: Option<Uuid>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub lines: Vec<OrderLineResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OrderListResponse {
    pub orders: Vec<OrderResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderFilter {
    pub order_type: Option<OrderType>,
    pub status: Option<OrderStatus>,
    pub party_id: Option<Uuid>,
}

pub(crate) fn line_to_response(line: order_line::Model) -> OrderLineResponse {
    OrderLineResponse {
        id: line.id,
        line_number: line.line_number,
        product_id: line.product_id,
        description: line.description,
        quantity: line.quantity,
        unit_price: line.unit_price,
        discount_percent: line.discount_percent,
        tax_percent: line.tax_percent,
        line_total: line.line_total,
    }
}

pub(crate) fn order_to_response(
    order: order::Model,
    lines: Vec<order_line::Model>,
) -> OrderResponse {
    OrderResponse {
        id: order.id,
        reference_number: order.reference_number,
        order_type: order.order_type,
        party_id: order.party_id,
        status: order.status,
        order_date: order.order_date,
        expected_date: order.expected_date,
        subtotal: order.subtotal,
        discount_percent: order.discount_percent,
        discount_amount: order.discount_amount,
        tax_percent: order.tax_percent,
        tax_amount: order.tax_amount,
        total_amount: order.total_amount,
        notes: order.notes,
        quote_id: order.quote_id,
        converted_order_id: order.converted_order_id,
        version: order.version,
        created_at: order.created_at,
        updated_at: order.updated_at,
        lines: lines.into_iter().map(line_to_response).collect(),
    }
}

/// Allocates the next reference number for a type/year, e.g. `SO-2026-0042`.
/// Runs inside the caller's insert transaction; the unique index on
/// `reference_number` backstops a rare concurrent allocation of the same
/// suffix as a `ConstraintViolation` the caller can retry.
pub(crate) async fn next_reference_number<C: ConnectionTrait>(
    conn: &C,
    order_type: OrderType,
    order_date: DateTime<Utc>,
) -> Result<String, ServiceError> {
    let prefix = order_type.reference_prefix();
    let year = order_date.year();
    let pattern = format!("{prefix}-{year}-%");

    let existing = OrderEntity::find()
        .filter(order::Column::OrderType.eq(order_type))
        .filter(order::Column::ReferenceNumber.like(&pattern))
        .count(conn)
        .await
        .map_err(ServiceError::classify_db_err)?;

    Ok(format!("{prefix}-{year}-{:04}", existing + 1))
}

/// A validated, priced line ready for insertion.
pub(crate) struct PricedLine {
    pub product_id: Uuid,
    pub description: Option<String>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub discount_percent: Decimal,
    pub tax_percent: Decimal,
    pub line_total: Decimal,
}

/// Resolves requested lines against the catalog: every product must exist
/// and be active; missing unit prices default to the catalog price.
pub(crate) async fn price_lines<C: ConnectionTrait>(
    conn: &C,
    lines: &[OrderLineRequest],
) -> Result<Vec<PricedLine>, ServiceError> {
    if lines.is_empty() {
        return Err(ServiceError::ValidationError(
            "An order requires at least one line".to_string(),
        ));
    }

    let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id).collect();
    let products = Product::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(conn)
        .await
        .map_err(ServiceError::classify_db_err)?;

    let mut priced = Vec::with_capacity(lines.len());
    for line in lines {
        let product = products
            .iter()
            .find(|p| p.id == line.product_id)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", line.product_id))
            })?;
        if !product.is_active {
            return Err(ServiceError::ValidationError(format!(
                "Product {} is deactivated",
                product.sku
            )));
        }
        if line.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Line quantity for {} must be positive",
                product.sku
            )));
        }
        validate_percent(line.discount_percent, "Line discount percent")?;
        validate_percent(line.tax_percent, "Line tax percent")?;

        let unit_price = line.unit_price.unwrap_or(product.unit_price);
        if unit_price < Decimal::ZERO {
            return Err(ServiceError::ValidationError(format!(
                "Unit price for {} must not be negative",
                product.sku
            )));
        }

        priced.push(PricedLine {
            product_id: product.id,
            description: line.description.clone(),
            quantity: line.quantity,
            unit_price,
            discount_percent: line.discount_percent,
            tax_percent: line.tax_percent,
            line_total: line_total(line.quantity, unit_price, line.discount_percent),
        });
    }
    Ok(priced)
}

async fn insert_lines<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    priced: Vec<PricedLine>,
) -> Result<(), ServiceError> {
    for (idx, line) in priced.into_iter().enumerate() {
        let row = order_line::ActiveModel {
            id: Set(Uuid::new_v4()),
            order_id: Set(order_id),
            line_number: Set((idx + 1) as i32),
            product_id: Set(line.product_id),
            description: Set(line.description),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            discount_percent: Set(line.discount_percent),
            tax_percent: Set(line.tax_percent),
            line_total: Set(line.line_total),
        };
        row.insert(conn).await.map_err(ServiceError::classify_db_err)?;
    }
    Ok(())
}

/// Order aggregate CRUD: creation and pre-fulfillment updates, with totals
/// recomputed server-side on every write. Status changes live in the
/// workflow service.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DbPool>,
    event_sender: EventSender,
}

impl OrderService {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a new order in `draft`, allocating its reference number and
    /// pricing its lines in one transaction.
    #[instrument(skip(self, request), fields(order_type = %request.order_type, party_id = %request.party_id))]
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        actor_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        validate_percent(request.discount_percent, "Discount percent")?;
        validate_percent(request.tax_percent, "Tax percent")?;

        let db = self.db.as_ref();
        self.check_party(request.order_type, request.party_id).await?;

        let order_date = request.order_date.unwrap_or_else(Utc::now);
        let order_id = Uuid::new_v4();

        let req = request.clone();
        let (order, lines) = db
            .transaction::<_, (order::Model, Vec<order_line::Model>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let priced = price_lines(txn, &req.lines).await?;
                    let line_totals: Vec<Decimal> = priced.iter().map(|l| l.line_total).collect();
                    let totals =
                        compute_totals(&line_totals, req.discount_percent, req.tax_percent);

                    let reference_number =
                        next_reference_number(txn, req.order_type, order_date).await?;

                    let header = order::ActiveModel {
                        id: Set(order_id),
                        reference_number: Set(reference_number),
                        order_type: Set(req.order_type),
                        party_id: Set(req.party_id),
                        status: Set(OrderStatus::Draft),
                        order_date: Set(order_date),
                        expected_date: Set(req.expected_date),
                        subtotal: Set(totals.subtotal),
                        discount_percent: Set(req.discount_percent),
                        discount_amount: Set(totals.discount_amount),
                        tax_percent: Set(req.tax_percent),
                        tax_amount: Set(totals.tax_amount),
                        total_amount: Set(totals.total),
                        notes: Set(req.notes.clone()),
                        quote_id: Set(None),
                        converted_order_id: Set(None),
                        created_by: Set(actor_id),
                        updated_at: Set(None),
                        version: Set(1),
                        ..Default::default()
                    };
                    let order = header
                        .insert(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    insert_lines(txn, order.id, priced).await?;

                    let lines = OrderLineEntity::find()
                        .filter(order_line::Column::OrderId.eq(order.id))
                        .order_by_asc(order_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    Ok((order, lines))
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        info!(order_id = %order.id, reference = %order.reference_number, "order created");

        if let Err(e) = self
            .event_sender
            .send(Event::OrderCreated {
                order_id: order.id,
                reference_number: order.reference_number.clone(),
            })
            .await
        {
            warn!(error = %e, "failed to send order created event");
        }

        Ok(order_to_response(order, lines))
    }

    /// Updates header fields and (optionally) replaces the line set.
    /// Only orders still in `draft` or `pending` accept updates.
    #[instrument(skip(self, request), fields(order_id = %order_id))]
    pub async fn update_order(
        &self,
        order_id: Uuid,
        request: UpdateOrderRequest,
        _actor_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate().map_err(ServiceError::from)?;
        if let Some(pct) = request.discount_percent {
            validate_percent(pct, "Discount percent")?;
        }
        if let Some(pct) = request.tax_percent {
            validate_percent(pct, "Tax percent")?;
        }

        let db = self.db.as_ref();
        let req = request.clone();
        let (order, lines) = db
            .transaction::<_, (order::Model, Vec<order_line::Model>), ServiceError>(move |txn| {
                Box::pin(async move {
                    let order = OrderEntity::find_by_id(order_id)
                        .lock_exclusive()
                        .one(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Order {} not found", order_id))
                        })?;

                    if !order.order_type.allows_update_in(order.status) {
                        return Err(ServiceError::Conflict(format!(
                            "Order {} is {} and can no longer be modified",
                            order.reference_number, order.status
                        )));
                    }

                    let discount_percent =
                        req.discount_percent.unwrap_or(order.discount_percent);
                    let tax_percent = req.tax_percent.unwrap_or(order.tax_percent);

                    if let Some(lines) = &req.lines {
                        let priced = price_lines(txn, lines).await?;
                        OrderLineEntity::delete_many()
                            .filter(order_line::Column::OrderId.eq(order.id))
                            .exec(txn)
                            .await
                            .map_err(ServiceError::classify_db_err)?;
                        insert_lines(txn, order.id, priced).await?;
                    }

                    let lines = OrderLineEntity::find()
                        .filter(order_line::Column::OrderId.eq(order.id))
                        .order_by_asc(order_line::Column::LineNumber)
                        .all(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    let line_totals: Vec<Decimal> =
                        lines.iter().map(|l| l.line_total).collect();
                    let totals = compute_totals(&line_totals, discount_percent, tax_percent);

                    let mut active: order::ActiveModel = order.clone().into();
                    if let Some(expected) = req.expected_date {
                        active.expected_date = Set(Some(expected));
                    }
                    if let Some(notes) = req.notes.clone() {
                        active.notes = Set(Some(notes));
                    }
                    active.discount_percent = Set(discount_percent);
                    active.tax_percent = Set(tax_percent);
                    active.subtotal = Set(totals.subtotal);
                    active.discount_amount = Set(totals.discount_amount);
                    active.tax_amount = Set(totals.tax_amount);
                    active.total_amount = Set(totals.total);
                    active.updated_at = Set(Some(Utc::now()));
                    active.version = Set(order.version + 1);

                    let updated = active
                        .update(txn)
                        .await
                        .map_err(ServiceError::classify_db_err)?;

                    Ok((updated, lines))
                })
            })
            .await
            .map_err(ServiceError::from_txn_err)?;

        if let Err(e) = self.event_sender.send(Event::OrderUpdated(order.id)).await {
            warn!(error = %e, "failed to send order updated event");
        }

        Ok(order_to_response(order, lines))
    }

    /// Retrieves an order with its lines.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn get_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let db = self.db.as_ref();
        let order = OrderEntity::find_by_id(order_id)
            .one(db)
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let lines = OrderLineEntity::find()
            .filter(order_line::Column::OrderId.eq(order.id))
            .order_by_asc(order_line::Column::LineNumber)
            .all(db)
            .await
            .map_err(ServiceError::classify_db_err)?;

        Ok(order_to_response(order, lines))
    }

    /// Lists orders, newest first, with optional type/status/party filters.
    #[instrument(skip(self, filter))]
    pub async fn list_orders(
        &self,
        filter: OrderFilter,
        page: u64,
        per_page: u64,
    ) -> Result<OrderListResponse, ServiceError> {
        let db = self.db.as_ref();
        let mut query = OrderEntity::find().order_by_desc(order::Column::CreatedAt);

        if let Some(order_type) = filter.order_type {
            query = query.filter(order::Column::OrderType.eq(order_type));
        }
        if let Some(status) = filter.status {
            query = query.filter(order::Column::Status.eq(status));
        }
        if let Some(party_id) = filter.party_id {
            query = query.filter(order::Column::PartyId.eq(party_id));
        }

        let paginator = query.paginate(db, per_page.max(1));
        let total = paginator
            .num_items()
            .await
            .map_err(ServiceError::classify_db_err)?;
        let orders = paginator
            .fetch_page(page.saturating_sub(1))
            .await
            .map_err(ServiceError::classify_db_err)?;

        let mut responses = Vec::with_capacity(orders.len());
        for order in orders {
            let lines = OrderLineEntity::find()
                .filter(order_line::Column::OrderId.eq(order.id))
                .order_by_asc(order_line::Column::LineNumber)
                .all(db)
                .await
                .map_err(ServiceError::classify_db_err)?;
            responses.push(order_to_response(order, lines));
        }

        Ok(OrderListResponse {
            orders: responses,
            total,
            page,
            per_page,
        })
    }

    /// Orders and quotes belong to customers; purchase orders to suppliers.
    async fn check_party(
        &self,
        order_type: OrderType,
        party_id: Uuid,
    ) -> Result<(), ServiceError> {
        let party = Party::find_by_id(party_id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::classify_db_err)?
            .ok_or_else(|| ServiceError::NotFound(format!("Party {} not found", party_id)))?;

        if !party.is_active {
            return Err(ServiceError::ValidationError(format!(
                "Party {} is deactivated",
                party.name
            )));
        }

        let expected = match order_type {
            OrderType::SalesOrder | OrderType::Quote => PartyKind::Customer,
            OrderType::PurchaseOrder => PartyKind::Supplier,
        };
        if party.kind != expected {
            return Err(ServiceError::ValidationError(format!(
                "{} orders require a {} counterparty",
                order_type, expected
            )));
        }
        Ok(())
    }
}
