//! `SeaORM` Entity for coupon codes

use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A coupon code the order builder may apply at checkout.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(schema_name = "public", table_name = "Discount")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false, column_type = "Text")]
    pub id: String,
    /// Coupon code (e.g. "LAUNCH20")
    #[sea_orm(column_type = "Text", unique)]
    pub code: String,
    /// Percentage of the subtotal (0-100) or a fixed amount
    #[sea_orm(column_name = "discountType")]
    pub discount_type: super::sea_orm_active_enums::DiscountType,
    #[sea_orm(column_name = "discountValue", column_type = "Decimal(Some((12, 2)))")]
    pub discount_value: Decimal,
    /// Minimum subtotal required (null = no minimum)
    #[sea_orm(column_name = "minSubtotal", column_type = "Decimal(Some((12, 2)))", nullable)]
    pub min_subtotal: Option<Decimal>,
    /// Maximum number of uses (null = unlimited)
    #[sea_orm(column_name = "maxUses", nullable)]
    pub max_uses: Option<i64>,
    #[sea_orm(column_name = "usedCount")]
    pub used_count: i64,
    #[sea_orm(column_name = "isActive")]
    pub is_active: bool,
    #[sea_orm(column_name = "startsAt")]
    pub starts_at: DateTime,
    /// When the discount expires (null = never)
    #[sea_orm(column_name = "expiresAt", nullable)]
    pub expires_at: Option<DateTime>,
    #[sea_orm(column_name = "createdAt")]
    pub created_at: DateTime,
    #[sea_orm(column_name = "updatedAt")]
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
