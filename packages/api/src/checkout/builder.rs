//! Order Builder: turns a typed checkout request into a persisted
//! `pending`/`pending` order with immutable line-item snapshots.
//!
//! Prices come exclusively from the catalog tables; the request schema has
//! no price fields at all, so client-submitted amounts cannot exist inside
//! the trust boundary.

use cartella_types::create_id;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, SqlErr,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::checkout::money;
use crate::entity::{
    course, discount, order, order_item, product,
    sea_orm_active_enums::{FulfillmentKind, OrderStatus, PaymentMethod, PaymentStatus},
};
use crate::error::ApiError;
use crate::state::AppState;

/// Checkout request body. `deny_unknown_fields` makes this the
/// parse-or-reject gate: anything the schema does not name never reaches
/// the pipeline.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CheckoutRequest {
    /// Physical-goods cart lines
    pub items: Option<Vec<CartLine>>,
    /// Course to enroll in (mutually exclusive with `items`)
    pub course_id: Option<String>,
    pub shipping_address: Option<Address>,
    pub billing_address: Option<Address>,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Address {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

/// What the checkout delivers, shaped from the request.
#[derive(Debug, Clone)]
pub enum FulfillmentCart {
    PhysicalGoods {
        items: Vec<CartLine>,
        shipping_address: Address,
        billing_address: Option<Address>,
    },
    CourseEnrollment {
        course_id: String,
    },
}

impl CheckoutRequest {
    pub fn into_cart(self) -> Result<(FulfillmentCart, Option<String>), ApiError> {
        let coupon_code = self.coupon_code.clone();
        match (self.items, self.course_id) {
            (Some(_), Some(_)) => Err(ApiError::bad_request(
                "Request cannot contain both items and a course",
            )),
            (None, None) => Err(ApiError::bad_request(
                "Request must contain either items or a course",
            )),
            (Some(items), None) => {
                if items.is_empty() {
                    return Err(ApiError::bad_request("Cart is empty"));
                }
                for line in &items {
                    if line.quantity < 1 || line.quantity > money::MAX_QUANTITY {
                        return Err(ApiError::bad_request(format!(
                            "Quantity for product {} must be between 1 and {}",
                            line.product_id,
                            money::MAX_QUANTITY
                        )));
                    }
                }
                let shipping_address = self
                    .shipping_address
                    .ok_or_else(|| ApiError::bad_request("Shipping address is required"))?;
                Ok((
                    FulfillmentCart::PhysicalGoods {
                        items,
                        shipping_address,
                        billing_address: self.billing_address,
                    },
                    coupon_code,
                ))
            }
            (None, Some(course_id)) => Ok((
                FulfillmentCart::CourseEnrollment { course_id },
                coupon_code,
            )),
        }
    }
}

/// A persisted order with its line items.
#[derive(Debug, Clone)]
pub struct BuiltOrder {
    pub order: order::Model,
    pub items: Vec<order_item::Model>,
}

/// `ORD-<UTC timestamp>-<random suffix>`. Readable, sortable, and backed
/// by the unique index on `orderNumber` as the final authority.
pub fn generate_order_number() -> String {
    let id = create_id();
    let suffix: String = id
        .chars()
        .rev()
        .take(6)
        .collect::<String>()
        .to_uppercase();
    format!("ORD-{}-{}", Utc::now().format("%Y%m%d%H%M%S"), suffix)
}

/// Checks coupon eligibility against the current subtotal and clock, and
/// returns the discount amount it grants.
pub fn validate_coupon(
    coupon: &discount::Model,
    subtotal: Decimal,
    now: chrono::NaiveDateTime,
) -> Result<Decimal, ApiError> {
    if !coupon.is_active {
        return Err(ApiError::bad_request("Coupon is not active"));
    }
    if coupon.starts_at > now {
        return Err(ApiError::bad_request("Coupon is not active yet"));
    }
    if let Some(expires_at) = coupon.expires_at
        && expires_at < now
    {
        return Err(ApiError::bad_request("Coupon has expired"));
    }
    if let Some(max_uses) = coupon.max_uses
        && coupon.used_count >= max_uses
    {
        return Err(ApiError::bad_request("Coupon has been fully redeemed"));
    }
    if let Some(min_subtotal) = coupon.min_subtotal
        && subtotal < min_subtotal
    {
        return Err(ApiError::bad_request(format!(
            "Coupon requires a subtotal of at least {}",
            min_subtotal
        )));
    }
    Ok(money::discount_amount(coupon, subtotal))
}

/// Validates the cart against the catalog, computes the money breakdown and
/// persists the order plus its items in one transaction. No provider call
/// happens here; no money has moved when this returns.
pub async fn build_order(
    state: &AppState,
    user_id: &str,
    payment_method: PaymentMethod,
    request: CheckoutRequest,
) -> Result<BuiltOrder, ApiError> {
    let (cart, coupon_code) = request.into_cart()?;
    let now = Utc::now().naive_utc();

    // Resolve catalog lines: (product id, name, image, unit price, quantity)
    struct Line {
        product_id: Option<String>,
        name: String,
        image: Option<String>,
        unit_price: Decimal,
        quantity: i32,
    }

    let (lines, fulfillment, course_id, shipping_address, billing_address) = match &cart {
        FulfillmentCart::PhysicalGoods {
            items,
            shipping_address,
            billing_address,
        } => {
            let ids: Vec<String> = items.iter().map(|l| l.product_id.clone()).collect();
            let products = product::Entity::find()
                .filter(product::Column::Id.is_in(ids))
                .all(&state.db)
                .await?;
            let mut lines = Vec::with_capacity(items.len());
            for line in items {
                let Some(found) = products.iter().find(|p| p.id == line.product_id) else {
                    return Err(ApiError::bad_request(format!(
                        "Product {} does not exist",
                        line.product_id
                    )));
                };
                if !found.is_active {
                    return Err(ApiError::bad_request(format!(
                        "Product {} is not available",
                        found.name
                    )));
                }
                lines.push(Line {
                    product_id: Some(found.id.clone()),
                    name: found.name.clone(),
                    image: found.image.clone(),
                    unit_price: found.price,
                    quantity: line.quantity,
                });
            }
            (
                lines,
                FulfillmentKind::PhysicalGoods,
                None,
                Some(shipping_address.clone()),
                billing_address.clone(),
            )
        }
        FulfillmentCart::CourseEnrollment { course_id } => {
            let course = course::Entity::find_by_id(course_id.clone())
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::not_found(format!("Course {} not found", course_id)))?;
            if !course.is_active {
                return Err(ApiError::bad_request("Course is not available"));
            }
            if course.free {
                return Err(ApiError::bad_request(
                    "Course is free, use the free enrollment endpoint",
                ));
            }
            (
                vec![Line {
                    product_id: None,
                    name: course.name.clone(),
                    image: None,
                    unit_price: course.price,
                    quantity: 1,
                }],
                FulfillmentKind::CourseEnrollment,
                Some(course.id),
                None,
                None,
            )
        }
    };

    let subtotal = money::subtotal(
        &lines
            .iter()
            .map(|l| (l.unit_price, l.quantity))
            .collect::<Vec<_>>(),
    );

    let discount = match &coupon_code {
        Some(code) => {
            let coupon = discount::Entity::find()
                .filter(discount::Column::Code.eq(code.clone()))
                .one(&state.db)
                .await?
                .ok_or_else(|| ApiError::bad_request("Unknown coupon code"))?;
            validate_coupon(&coupon, subtotal, now)?
        }
        None => Decimal::ZERO,
    };

    let needs_shipping = fulfillment == FulfillmentKind::PhysicalGoods;
    let totals = money::compute_totals(subtotal, discount, needs_shipping, &state.platform_config);

    let order_id = create_id();
    let order_model = order::ActiveModel {
        id: Set(order_id.clone()),
        order_number: Set(generate_order_number()),
        user_id: Set(user_id.to_string()),
        fulfillment: Set(fulfillment),
        course_id: Set(course_id),
        subtotal: Set(totals.subtotal),
        tax: Set(totals.tax),
        shipping: Set(totals.shipping),
        discount: Set(totals.discount),
        total: Set(totals.total),
        status: Set(OrderStatus::Pending),
        payment_status: Set(PaymentStatus::Pending),
        payment_method: Set(payment_method),
        payment_reference: Set(None),
        shipping_address: Set(shipping_address
            .map(|a| serde_json::to_value(a))
            .transpose()?),
        billing_address: Set(billing_address
            .map(|a| serde_json::to_value(a))
            .transpose()?),
        coupon_code: Set(coupon_code),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let item_models: Vec<order_item::ActiveModel> = lines
        .iter()
        .map(|l| order_item::ActiveModel {
            id: Set(create_id()),
            order_id: Set(order_id.clone()),
            product_id: Set(l.product_id.clone()),
            name: Set(l.name.clone()),
            image: Set(l.image.clone()),
            unit_price: Set(l.unit_price),
            quantity: Set(l.quantity),
            total: Set(money::round_money(
                l.unit_price * Decimal::from(l.quantity),
            )),
            created_at: Set(now),
        })
        .collect();

    let (order, items) = state
        .db
        .transaction::<_, (order::Model, Vec<order_item::Model>), ApiError>(|txn| {
            Box::pin(async move {
                let order = order_model.insert(txn).await.map_err(|err| {
                    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                        ApiError::conflict("Order number collision, retry checkout")
                    } else {
                        err.into()
                    }
                })?;
                let mut items = Vec::with_capacity(item_models.len());
                for item in item_models {
                    items.push(item.insert(txn).await?);
                }
                Ok((order, items))
            })
        })
        .await?;

    tracing::info!(
        order_id = %order.id,
        order_number = %order.order_number,
        total = %order.total,
        "Order created"
    );

    Ok(BuiltOrder { order, items })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::sea_orm_active_enums::DiscountType;

    fn request(items: Option<Vec<CartLine>>, course_id: Option<String>) -> CheckoutRequest {
        CheckoutRequest {
            items,
            course_id,
            shipping_address: Some(address()),
            billing_address: None,
            coupon_code: None,
        }
    }

    fn address() -> Address {
        Address {
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            line1: "1 Analytical Way".to_string(),
            line2: None,
            city: "London".to_string(),
            state: "LDN".to_string(),
            postal_code: "E1 6AN".to_string(),
            country: "GB".to_string(),
        }
    }

    #[test]
    fn rejects_empty_cart() {
        let err = request(Some(vec![]), None).into_cart();
        assert!(err.is_err());
    }

    #[test]
    fn rejects_items_and_course_together() {
        let req = request(
            Some(vec![CartLine {
                product_id: "p1".to_string(),
                quantity: 1,
            }]),
            Some("c1".to_string()),
        );
        assert!(req.into_cart().is_err());
    }

    #[test]
    fn rejects_zero_quantity() {
        let req = request(
            Some(vec![CartLine {
                product_id: "p1".to_string(),
                quantity: 0,
            }]),
            None,
        );
        assert!(req.into_cart().is_err());
    }

    #[test]
    fn rejects_missing_shipping_address() {
        let mut req = request(
            Some(vec![CartLine {
                product_id: "p1".to_string(),
                quantity: 1,
            }]),
            None,
        );
        req.shipping_address = None;
        assert!(req.into_cart().is_err());
    }

    #[test]
    fn course_cart_needs_no_address() {
        let mut req = request(None, Some("c1".to_string()));
        req.shipping_address = None;
        let (cart, _) = req.into_cart().unwrap();
        assert!(matches!(cart, FulfillmentCart::CourseEnrollment { .. }));
    }

    #[test]
    fn request_schema_rejects_unknown_fields() {
        let raw = r#"{"items":[{"productId":"p1","quantity":1,"price":"0.01"}]}"#;
        assert!(serde_json::from_str::<CheckoutRequest>(raw).is_err());
    }

    #[test]
    fn request_schema_has_no_price_channel() {
        let raw = r#"{"items":[{"productId":"p1","quantity":2}],"total":"0.01"}"#;
        assert!(serde_json::from_str::<CheckoutRequest>(raw).is_err());
    }

    #[test]
    fn order_number_format() {
        let number = generate_order_number();
        assert!(number.starts_with("ORD-"));
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 14);
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 6);
    }

    #[test]
    fn coupon_outside_window_rejected() {
        let now = Utc::now().naive_utc();
        let mut coupon = discount::Model {
            id: "d1".to_string(),
            code: "SOON".to_string(),
            discount_type: DiscountType::Fixed,
            discount_value: Decimal::new(500, 2),
            min_subtotal: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
            starts_at: now + chrono::Duration::days(1),
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_coupon(&coupon, Decimal::new(5000, 2), now).is_err());

        coupon.starts_at = now - chrono::Duration::days(2);
        coupon.expires_at = Some(now - chrono::Duration::days(1));
        assert!(validate_coupon(&coupon, Decimal::new(5000, 2), now).is_err());
    }

    #[test]
    fn coupon_min_subtotal_and_uses() {
        let now = Utc::now().naive_utc();
        let mut coupon = discount::Model {
            id: "d1".to_string(),
            code: "BIG".to_string(),
            discount_type: DiscountType::Percentage,
            discount_value: Decimal::from(10),
            min_subtotal: Some(Decimal::new(10000, 2)),
            max_uses: Some(1),
            used_count: 0,
            is_active: true,
            starts_at: now - chrono::Duration::days(1),
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(validate_coupon(&coupon, Decimal::new(5000, 2), now).is_err());
        assert_eq!(
            validate_coupon(&coupon, Decimal::new(10000, 2), now).unwrap(),
            Decimal::new(1000, 2)
        );
        coupon.used_count = 1;
        assert!(validate_coupon(&coupon, Decimal::new(10000, 2), now).is_err());
    }
}
