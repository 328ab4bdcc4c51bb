use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Quotes, sales orders and purchase orders share one aggregate shape and
/// one table; the type picks the status machine and the reference prefix.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderType {
    #[sea_orm(string_value = "sales_order")]
    SalesOrder,
    #[sea_orm(string_value = "purchase_order")]
    PurchaseOrder,
    #[sea_orm(string_value = "quote")]
    Quote,
}

impl OrderType {
    pub fn reference_prefix(&self) -> &'static str {
        match self {
            OrderType::SalesOrder => "SO",
            OrderType::PurchaseOrder => "PO",
            OrderType::Quote => "QT",
        }
    }
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    #[sea_orm(string_value = "shipped")]
    Shipped,
    #[sea_orm(string_value = "delivered")]
    Delivered,
    #[sea_orm(string_value = "received")]
    Received,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "converted")]
    Converted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "expired")]
    Expired,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderType {
    /// Whether `to` is reachable from `from` for this order type.
    ///
    /// Cancellation is handled here too: fulfilled orders (shipped/delivered
    /// for sales, received/completed for purchases) can no longer be
    /// cancelled, and quotes end in rejected/expired instead.
    pub fn allows_transition(&self, from: OrderStatus, to: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            OrderType::SalesOrder => matches!(
                (from, to),
                (Draft, Pending)
                    | (Pending, Confirmed)
                    | (Confirmed, Shipped)
                    | (Shipped, Delivered)
                    | (Draft, Cancelled)
                    | (Pending, Cancelled)
                    | (Confirmed, Cancelled)
            ),
            OrderType::PurchaseOrder => matches!(
                (from, to),
                (Draft, Pending)
                    | (Pending, Received)
                    | (Received, Completed)
                    | (Draft, Cancelled)
                    | (Pending, Cancelled)
            ),
            OrderType::Quote => matches!(
                (from, to),
                (Draft, Pending)
                    | (Pending, Approved)
                    | (Pending, Rejected)
                    | (Pending, Expired)
                    | (Approved, Expired)
            ),
        }
    }

    /// The status whose entry moves physical stock, if any. Stock moves
    /// exactly once per order; the follow-on states (delivered, completed)
    /// are administrative.
    pub fn movement_status(&self) -> Option<OrderStatus> {
        match self {
            OrderType::SalesOrder => Some(OrderStatus::Shipped),
            OrderType::PurchaseOrder => Some(OrderStatus::Received),
            OrderType::Quote => None,
        }
    }

    /// Header/line edits are only allowed before the order enters its
    /// fulfillment path.
    pub fn allows_update_in(&self, status: OrderStatus) -> bool {
        matches!(status, OrderStatus::Draft | OrderStatus::Pending)
    }
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered
                | OrderStatus::Completed
                | OrderStatus::Converted
                | OrderStatus::Rejected
                | OrderStatus::Expired
                | OrderStatus::Cancelled
        )
    }
}

/// The `orders` table: header of the order aggregate.
///
/// Monetary totals are always recomputed from the lines on write; the stored
/// columns exist for read-side convenience, never as an independent source.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Human-readable number, unique and monotonic per type/year,
    /// e.g. `SO-2026-0042`.
    #[sea_orm(unique)]
    pub reference_number: String,
    pub order_type: OrderType,
    /// Customer for sales orders and quotes, supplier for purchase orders.
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
    /// On a converted sales order: the quote it came from.
    pub quote_id: Option<Uuid>,
    /// On a converted quote: the sales order it became.
    pub converted_order_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
    #[sea_orm(
        belongs_to = "super::party::Entity",
        from = "Column::PartyId",
        to = "super::party::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Party,
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl Related<super::party::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Party.def()
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if let ActiveValue::NotSet = active_model.created_at {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
