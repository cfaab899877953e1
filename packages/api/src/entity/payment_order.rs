//! `SeaORM` Entity for pending provider orders

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A provider-side order opened with Razorpay before verification. Kept
/// separate from `Payment`/`Purchase` because a provider order can be
/// created and then abandoned without ever settling.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "PaymentOrder")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_name = "providerOrderId", column_type = "Text", unique)]
    pub provider_order_id: String,
    #[sea_orm(column_name = "orderId", column_type = "Text")]
    pub order_id: String,
    /// Amount in minor units, exactly as submitted to the provider
    pub amount: i64,
    #[sea_orm(column_type = "Text")]
    pub currency: String,
    pub status: super::sea_orm_active_enums::PaymentOrderStatus,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
