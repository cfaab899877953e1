//! Refund Handler: reverses a completed Stripe order through the provider
//! and marks the order refunded.
//!
//! Razorpay refunds are unsupported: the original payment cannot be
//! reversed through this service and the endpoint says so explicitly
//! instead of skipping the order silently.

use std::str::FromStr;

use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, TransactionTrait, sea_query::Expr};

use crate::entity::{
    order, payment,
    sea_orm_active_enums::{OrderStatus, PaymentMethod, PaymentStatus},
};
use crate::error::ApiError;
use crate::state::AppState;

pub struct RefundResult {
    pub refund_id: String,
}

pub async fn refund_order(
    state: &AppState,
    user_id: &str,
    order_id: &str,
    reason: &str,
) -> Result<RefundResult, ApiError> {
    let order = order::Entity::find_by_id(order_id.to_string())
        .filter(order::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NOT_FOUND)?;

    if order.payment_method != PaymentMethod::Stripe {
        return Err(ApiError::bad_request(
            "Refund not supported for this payment method",
        ));
    }
    match order.payment_status {
        PaymentStatus::Completed => {}
        PaymentStatus::Refunded => {
            return Err(ApiError::already_processed("Order already refunded"));
        }
        _ => {
            return Err(ApiError::bad_request(
                "Order has no completed payment to refund",
            ));
        }
    }
    let reference = order
        .payment_reference
        .as_deref()
        .ok_or_else(|| ApiError::bad_request("Order has no payment reference"))?;

    let client = state
        .stripe_client
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Stripe is not configured"))?;

    // Resolve the payment intent behind the checkout session.
    let session_id = stripe::CheckoutSessionId::from_str(reference)
        .map_err(|_| ApiError::internal("Order carries a malformed session reference"))?;
    let session = stripe::CheckoutSession::retrieve(client, &session_id, &[]).await?;
    let payment_intent = session
        .payment_intent
        .as_ref()
        .map(|pi| pi.id())
        .ok_or_else(|| ApiError::bad_gateway("Checkout session has no payment intent"))?;

    let mut params = stripe::CreateRefund::new();
    params.payment_intent = Some(payment_intent.clone());
    let refund = stripe::Refund::create(client, params).await?;

    // Provider confirmed; only now does local state change.
    let now = Utc::now().naive_utc();
    let reason = reason.to_string();
    let order_id_owned = order.id.clone();
    state
        .db
        .transaction::<_, (), ApiError>(move |txn| {
            Box::pin(async move {
                let update = order::Entity::update_many()
                    .col_expr(
                        order::Column::PaymentStatus,
                        Expr::value(PaymentStatus::Refunded),
                    )
                    .col_expr(order::Column::Status, Expr::value(OrderStatus::Refunded))
                    .col_expr(order::Column::Notes, Expr::value(Some(reason.clone())))
                    .col_expr(order::Column::UpdatedAt, Expr::value(now))
                    .filter(order::Column::Id.eq(&order_id_owned))
                    .filter(order::Column::PaymentStatus.eq(PaymentStatus::Completed))
                    .exec(txn)
                    .await?;
                if update.rows_affected == 0 {
                    return Err(ApiError::already_processed("Order already refunded"));
                }

                payment::Entity::update_many()
                    .col_expr(
                        payment::Column::Status,
                        Expr::value(PaymentStatus::Refunded),
                    )
                    .col_expr(payment::Column::UpdatedAt, Expr::value(now))
                    .filter(payment::Column::OrderId.eq(&order_id_owned))
                    .filter(payment::Column::Status.eq(PaymentStatus::Completed))
                    .exec(txn)
                    .await?;

                Ok(())
            })
        })
        .await?;

    tracing::info!(
        order_id = %order.id,
        refund_id = %refund.id,
        "Order refunded"
    );

    Ok(RefundResult {
        refund_id: refund.id.to_string(),
    })
}
