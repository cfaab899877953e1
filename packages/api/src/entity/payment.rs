//! `SeaORM` Entity for completed provider transactions

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One completed provider-side transaction tied to an order. Rows are
/// inserted only by the payment verifier, inside the same transaction as
/// the order's `pending -> completed` transition, which bounds the table
/// at one completed payment per order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Payment")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    #[sea_orm(column_name = "orderId", column_type = "Text")]
    pub order_id: String,
    #[sea_orm(column_name = "userId", column_type = "Text")]
    pub user_id: String,
    pub provider: super::sea_orm_active_enums::PaymentProvider,
    /// Provider payment/intent id
    #[sea_orm(column_name = "providerPaymentId", column_type = "Text")]
    pub provider_payment_id: String,
    /// Provider session/order id the payment settled under
    #[sea_orm(column_name = "providerOrderId", column_type = "Text", nullable)]
    pub provider_order_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Text")]
    pub currency: String,
    pub status: super::sea_orm_active_enums::PaymentStatus,
    /// Raw provider callback payload for audit
    #[sea_orm(nullable)]
    pub metadata: Option<Json>,
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
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
