use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One term of a payment schedule model: due `day_offset` days after the
/// schedule start, for `percentage` of the order total.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_schedule_terms")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub model_id: Uuid,
    pub sort_order: i32,
    pub day_offset: i32,
    pub percentage: Decimal,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::payment_schedule_model::Entity",
        from = "Column::ModelId",
        to = "super::payment_schedule_model::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Model,
}

impl Related<super::payment_schedule_model::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Model.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
