//! `SeaORM` Entity for checkout orders

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One checkout transaction with its server-computed money breakdown.
///
/// The money invariant `total = subtotal + tax + shipping - discount` holds
/// for every row; all five columns are written once by the order builder and
/// never recomputed from client input.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Order")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    /// Human-readable order number; the unique index is the final authority
    /// against generator collisions
    #[sea_orm(column_name = "orderNumber", column_type = "Text", unique)]
    pub order_number: String,
    #[sea_orm(column_name = "userId", column_type = "Text")]
    pub user_id: String,
    /// What completing the payment delivers
    pub fulfillment: super::sea_orm_active_enums::FulfillmentKind,
    /// Set for course-enrollment orders
    #[sea_orm(column_name = "courseId", column_type = "Text", nullable)]
    pub course_id: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub subtotal: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub tax: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub shipping: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub discount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total: Decimal,
    pub status: super::sea_orm_active_enums::OrderStatus,
    #[sea_orm(column_name = "paymentStatus")]
    pub payment_status: super::sea_orm_active_enums::PaymentStatus,
    #[sea_orm(column_name = "paymentMethod")]
    pub payment_method: super::sea_orm_active_enums::PaymentMethod,
    /// Provider session/order id, null until a payment session exists
    #[sea_orm(column_name = "paymentReference", column_type = "Text", nullable)]
    pub payment_reference: Option<String>,
    /// Structured address (name, email, phone, line1.., city, state,
    /// postal code, country); null for course orders
    #[sea_orm(column_name = "shippingAddress", nullable)]
    pub shipping_address: Option<Json>,
    #[sea_orm(column_name = "billingAddress", nullable)]
    pub billing_address: Option<Json>,
    #[sea_orm(column_name = "couponCode", column_type = "Text", nullable)]
    pub coupon_code: Option<String>,
    /// Cancellation/refund reasons
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id",
        on_update = "Cascade",
        on_delete = "SetNull"
    )]
    Course,
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItem,
    #[sea_orm(has_many = "super::payment::Entity")]
    Payment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItem.def()
    }
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
