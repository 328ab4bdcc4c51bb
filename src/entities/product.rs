use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The `products` table.
///
/// `stock_on_hand` is a cached aggregate of the stock-movement ledger; it is
/// only ever written in the same transaction as a ledger append, so reading
/// it is equivalent to summing the ledger at that point in time.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub sku: String,
    pub name: String,
    /// Unit of measure ("pcs", "kg", ...)
    pub unit: String,
    pub unit_price: Decimal,
    pub minimum_stock: Decimal,
    pub reorder_quantity: Decimal,
    /// When false, the ledger ignores this product entirely.
    pub track_stock: bool,
    pub is_active: bool,
    pub stock_on_hand: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::stock_movement::Entity")]
    StockMovements,
    #[sea_orm(has_many = "super::order_line::Entity")]
    OrderLines,
}

impl Related<super::stock_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockMovements.def()
    }
}

impl Related<super::order_line::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderLines.def()
    }
}

impl Model {
    pub fn is_below_minimum(&self) -> bool {
        self.track_stock && self.stock_on_hand < self.minimum_stock
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
