//! Payment Session Initiator: opens the provider-side payment handle for a
//! pending order and stores it on the order.
//!
//! Session creation is retryable: a provider failure leaves the order
//! `pending`/`pending`, and re-invoking for the same order replaces the
//! stored reference instead of duplicating the order.

use std::collections::HashMap;
use std::str::FromStr;

use cartella_types::create_id;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, sea_query::Expr,
};

use crate::checkout::money::to_minor_units;
use crate::entity::{
    order, payment_order,
    sea_orm_active_enums::{PaymentOrderStatus, PaymentStatus},
};
use crate::error::ApiError;
use crate::state::AppState;

pub struct StripeSession {
    pub session_id: String,
    pub session_url: String,
}

pub struct RazorpayCheckout {
    pub provider_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key_id: String,
}

/// Builds a hosted Stripe Checkout session from the order's item
/// snapshots. Prices come from the `OrderItem` rows, never from a fresh
/// catalog read, so a concurrent catalog edit cannot skew the charge.
pub async fn create_stripe_session(
    state: &AppState,
    order: &order::Model,
    items: &[crate::entity::order_item::Model],
) -> Result<StripeSession, ApiError> {
    let client = state
        .stripe_client
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Stripe is not configured"))?;

    let currency = stripe::Currency::from_str(&state.platform_config.currency)
        .map_err(|_| ApiError::internal("Invalid configured currency"))?;

    let mut line_items = Vec::with_capacity(items.len() + 2);
    for item in items {
        line_items.push(stripe::CreateCheckoutSessionLineItems {
            price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                currency,
                product_data: Some(
                    stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                        name: item.name.clone(),
                        ..Default::default()
                    },
                ),
                unit_amount: Some(to_minor_units(item.unit_price)?),
                ..Default::default()
            }),
            quantity: Some(item.quantity as u64),
            ..Default::default()
        });
    }
    for (label, amount) in [("Tax", order.tax), ("Shipping", order.shipping)] {
        if amount > Decimal::ZERO {
            line_items.push(stripe::CreateCheckoutSessionLineItems {
                price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
                    currency,
                    product_data: Some(
                        stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                            name: label.to_string(),
                            ..Default::default()
                        },
                    ),
                    unit_amount: Some(to_minor_units(amount)?),
                    ..Default::default()
                }),
                quantity: Some(1),
                ..Default::default()
            });
        }
    }

    let frontend_url = &state.platform_config.frontend_url;
    let success_url = format!(
        "{}/checkout/success?orderId={}",
        frontend_url, order.id
    );
    let cancel_url = format!("{}/checkout/cancel?orderId={}", frontend_url, order.id);

    let mut metadata = HashMap::new();
    metadata.insert("order_id".to_string(), order.id.clone());
    metadata.insert("order_number".to_string(), order.order_number.clone());

    let mut params = stripe::CreateCheckoutSession::new();
    params.mode = Some(stripe::CheckoutSessionMode::Payment);
    params.success_url = Some(&success_url);
    params.cancel_url = Some(&cancel_url);
    params.client_reference_id = Some(&order.id);
    params.line_items = Some(line_items);
    params.metadata = Some(metadata);

    // A coupon discount becomes a one-off Stripe coupon so the session
    // total always equals Order.total without negative line items.
    if order.discount > Decimal::ZERO {
        let mut coupon_params = stripe::CreateCoupon::new();
        coupon_params.amount_off = Some(to_minor_units(order.discount)?);
        coupon_params.currency = Some(currency);
        coupon_params.duration = Some(stripe::CouponDuration::Once);
        coupon_params.name = Some("Order discount");
        let coupon = stripe::Coupon::create(client, coupon_params).await?;
        params.discounts = Some(vec![stripe::CreateCheckoutSessionDiscounts {
            coupon: Some(coupon.id.to_string()),
            ..Default::default()
        }]);
    }

    let session = stripe::CheckoutSession::create(client, params).await?;
    let session_url = session
        .url
        .clone()
        .ok_or_else(|| ApiError::bad_gateway("Checkout session has no URL"))?;

    attach_payment_reference(state, &order.id, session.id.as_str()).await?;

    tracing::info!(
        order_id = %order.id,
        session_id = %session.id,
        "Stripe checkout session created"
    );

    Ok(StripeSession {
        session_id: session.id.to_string(),
        session_url,
    })
}

/// Opens a Razorpay provider order for the full order total (minor units)
/// and records it as a pending `PaymentOrder`.
pub async fn create_razorpay_order(
    state: &AppState,
    order: &order::Model,
) -> Result<RazorpayCheckout, ApiError> {
    let client = state
        .razorpay_client
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Razorpay is not configured"))?;

    let amount = to_minor_units(order.total)?;
    let currency = state.platform_config.currency.to_uppercase();

    let provider_order = client
        .create_order(amount, &currency, &order.order_number)
        .await
        .map_err(|e| ApiError::bad_gateway(format!("Razorpay order creation failed: {}", e)))?;

    let now = Utc::now().naive_utc();
    payment_order::ActiveModel {
        id: Set(create_id()),
        provider_order_id: Set(provider_order.id.clone()),
        order_id: Set(order.id.clone()),
        amount: Set(provider_order.amount),
        currency: Set(provider_order.currency.clone()),
        status: Set(PaymentOrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    attach_payment_reference(state, &order.id, &provider_order.id).await?;

    tracing::info!(
        order_id = %order.id,
        provider_order_id = %provider_order.id,
        "Razorpay order created"
    );

    Ok(RazorpayCheckout {
        provider_order_id: provider_order.id,
        amount: provider_order.amount,
        currency: provider_order.currency,
        key_id: client.key_id().to_string(),
    })
}

/// Stores the provider handle on the order. Conditional on the payment
/// still being pending so a late retry can never clobber a settled order.
async fn attach_payment_reference(
    state: &AppState,
    order_id: &str,
    reference: &str,
) -> Result<(), ApiError> {
    order::Entity::update_many()
        .col_expr(
            order::Column::PaymentReference,
            Expr::value(Some(reference.to_string())),
        )
        .col_expr(
            order::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(order::Column::Id.eq(order_id))
        .filter(order::Column::PaymentStatus.eq(PaymentStatus::Pending))
        .exec(&state.db)
        .await?;
    Ok(())
}
