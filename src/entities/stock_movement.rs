use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kinds of stock movement. Each carries a canonical direction; the signed
/// quantity stored on the row always matches it.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
    strum::Display, utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum MovementType {
    /// Goods received against a purchase order.
    #[sea_orm(string_value = "purchase")]
    Purchase,
    /// Goods shipped against a sales order.
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "adjustment_in")]
    AdjustmentIn,
    #[sea_orm(string_value = "adjustment_out")]
    AdjustmentOut,
    /// Customer return back into stock.
    #[sea_orm(string_value = "return_in")]
    ReturnIn,
}

impl MovementType {
    /// +1 for inbound movements, -1 for outbound.
    pub fn direction(&self) -> i8 {
        match self {
            MovementType::Purchase | MovementType::AdjustmentIn | MovementType::ReturnIn => 1,
            MovementType::Sale | MovementType::AdjustmentOut => -1,
        }
    }

    pub fn is_outbound(&self) -> bool {
        self.direction() < 0
    }
}

/// The `stock_movements` ledger.
///
/// Rows are append-only: no service exposes an update or delete, and
/// corrections are recorded as new offsetting movements. The auto-increment
/// primary key doubles as the creation order of the ledger.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "stock_movements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed quantity: positive inbound, negative outbound.
    pub quantity: Decimal,
    pub quantity_before: Decimal,
    pub quantity_after: Decimal,
    /// Unit valuation at movement time, when known.
    pub unit_price: Option<Decimal>,
    pub order_id: Option<Uuid>,
    pub location: Option<String>,
    pub remarks: Option<String>,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_directions() {
        assert_eq!(MovementType::Purchase.direction(), 1);
        assert_eq!(MovementType::ReturnIn.direction(), 1);
        assert_eq!(MovementType::AdjustmentIn.direction(), 1);
        assert_eq!(MovementType::Sale.direction(), -1);
        assert_eq!(MovementType::AdjustmentOut.direction(), -1);
        assert!(MovementType::Sale.is_outbound());
        assert!(!MovementType::Purchase.is_outbound());
    }
}
