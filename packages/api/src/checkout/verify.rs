//! Payment Verifier: confirms provider-side payment success and applies the
//! `pending -> completed`/`processing` transition exactly once.
//!
//! Two entry points reach the same recording step: an explicit confirm call
//! from the payment-return page, and the Stripe webhook. Recording is an
//! atomic conditional update; replays short-circuit on zero rows affected,
//! so neither path can double-apply state or duplicate a `Payment` row.

use std::str::FromStr;

use cartella_types::{Value, create_id};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseTransaction, EntityTrait,
    QueryFilter, TransactionTrait, sea_query::Expr,
};

use crate::checkout::enroll;
use crate::entity::{
    order, payment, payment_order, user,
    sea_orm_active_enums::{
        FulfillmentKind, OrderStatus, PaymentOrderStatus, PaymentProvider, PaymentStatus,
    },
};
use crate::error::ApiError;
use crate::mail::{self, EmailMessage, templates};
use crate::state::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// This call performed the transition and recorded the payment.
    Completed,
    /// The order was already settled; nothing was written.
    AlreadyProcessed,
}

/// Provider-side proof of payment, normalized across providers.
pub struct ProviderEvidence {
    pub provider: PaymentProvider,
    pub provider_payment_id: String,
    pub provider_order_id: Option<String>,
    pub metadata: Option<Value>,
}

/// Client confirmation path for Stripe: re-reads the session from the
/// provider and requires `payment_status == paid` before recording.
pub async fn verify_stripe(
    state: &AppState,
    user_id: &str,
    order_id: &str,
    session_id: &str,
) -> Result<VerifyOutcome, ApiError> {
    let client = state
        .stripe_client
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Stripe is not configured"))?;

    let order = find_user_order(state, user_id, order_id).await?;

    if order.payment_reference.as_deref() != Some(session_id) {
        return Err(ApiError::bad_request(
            "Session does not belong to this order",
        ));
    }

    let parsed_id = stripe::CheckoutSessionId::from_str(session_id)
        .map_err(|_| ApiError::bad_request("Malformed session id"))?;
    let session = stripe::CheckoutSession::retrieve(client, &parsed_id, &[]).await?;

    if session.payment_status != stripe::CheckoutSessionPaymentStatus::Paid {
        return Err(ApiError::bad_request("Payment has not completed"));
    }

    let evidence = ProviderEvidence {
        provider: PaymentProvider::Stripe,
        provider_payment_id: session
            .payment_intent
            .as_ref()
            .map(|pi| pi.id().to_string())
            .unwrap_or_else(|| session.id.to_string()),
        provider_order_id: Some(session.id.to_string()),
        metadata: serde_json::to_value(&session.metadata).ok(),
    };

    record_success(state, order, evidence).await
}

/// Client confirmation path for Razorpay: verification is purely local, an
/// HMAC over `order_id|payment_id`. A mismatch rejects before any write.
pub async fn verify_razorpay(
    state: &AppState,
    user_id: &str,
    order_id: &str,
    razorpay_order_id: &str,
    razorpay_payment_id: &str,
    razorpay_signature: &str,
) -> Result<VerifyOutcome, ApiError> {
    let client = state
        .razorpay_client
        .as_ref()
        .ok_or_else(|| ApiError::service_unavailable("Razorpay is not configured"))?;

    let order = find_user_order(state, user_id, order_id).await?;

    if order.payment_reference.as_deref() != Some(razorpay_order_id) {
        return Err(ApiError::bad_request(
            "Provider order does not belong to this order",
        ));
    }

    if !client.verify_payment_signature(razorpay_order_id, razorpay_payment_id, razorpay_signature)
    {
        return Err(ApiError::invalid_signature("Invalid payment signature"));
    }

    let evidence = ProviderEvidence {
        provider: PaymentProvider::Razorpay,
        provider_payment_id: razorpay_payment_id.to_string(),
        provider_order_id: Some(razorpay_order_id.to_string()),
        metadata: Some(cartella_types::json::json!({
            "razorpay_order_id": razorpay_order_id,
            "razorpay_payment_id": razorpay_payment_id,
        })),
    };

    record_success(state, order, evidence).await
}

async fn find_user_order(
    state: &AppState,
    user_id: &str,
    order_id: &str,
) -> Result<order::Model, ApiError> {
    order::Entity::find_by_id(order_id.to_string())
        .filter(order::Column::UserId.eq(user_id))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NOT_FOUND)
}

/// Applies the success transition and records the payment, idempotently.
///
/// The order update is a single conditional statement filtered on the
/// expected prior status; `rows_affected == 0` means another call already
/// settled the order and this one becomes a no-op.
pub async fn record_success(
    state: &AppState,
    order: order::Model,
    evidence: ProviderEvidence,
) -> Result<VerifyOutcome, ApiError> {
    let currency = state.platform_config.currency.to_uppercase();
    let order_for_txn = order.clone();
    let payment_id_for_mail = evidence.provider_payment_id.clone();

    let outcome = state
        .db
        .transaction::<_, VerifyOutcome, ApiError>(move |txn| {
            Box::pin(async move {
                record_success_in_txn(txn, &order_for_txn, evidence, &currency).await
            })
        })
        .await?;

    if outcome == VerifyOutcome::Completed {
        tracing::info!(
            order_id = %order.id,
            provider_payment_id = %payment_id_for_mail,
            "Payment recorded, order processing"
        );
        notify_payment_success(state, &order).await;
    } else {
        tracing::info!(order_id = %order.id, "Order already settled, skipping (idempotent)");
    }

    Ok(outcome)
}

async fn record_success_in_txn(
    txn: &DatabaseTransaction,
    order: &order::Model,
    evidence: ProviderEvidence,
    currency: &str,
) -> Result<VerifyOutcome, ApiError> {
    let now = Utc::now().naive_utc();

    let update = order::Entity::update_many()
        .col_expr(
            order::Column::PaymentStatus,
            Expr::value(PaymentStatus::Completed),
        )
        .col_expr(order::Column::Status, Expr::value(OrderStatus::Processing))
        .col_expr(order::Column::UpdatedAt, Expr::value(now))
        .filter(order::Column::Id.eq(&order.id))
        .filter(order::Column::PaymentStatus.eq(PaymentStatus::Pending))
        .exec(txn)
        .await?;

    if update.rows_affected == 0 {
        return Ok(VerifyOutcome::AlreadyProcessed);
    }

    payment::ActiveModel {
        id: Set(create_id()),
        order_id: Set(order.id.clone()),
        user_id: Set(order.user_id.clone()),
        provider: Set(evidence.provider),
        provider_payment_id: Set(evidence.provider_payment_id.clone()),
        provider_order_id: Set(evidence.provider_order_id.clone()),
        amount: Set(order.total),
        currency: Set(currency.to_string()),
        status: Set(PaymentStatus::Completed),
        metadata: Set(evidence.metadata),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;

    if let Some(provider_order_id) = &evidence.provider_order_id {
        payment_order::Entity::update_many()
            .col_expr(
                payment_order::Column::Status,
                Expr::value(PaymentOrderStatus::Paid),
            )
            .col_expr(payment_order::Column::UpdatedAt, Expr::value(now))
            .filter(payment_order::Column::ProviderOrderId.eq(provider_order_id))
            .filter(payment_order::Column::Status.eq(PaymentOrderStatus::Pending))
            .exec(txn)
            .await?;
    }

    if order.fulfillment == FulfillmentKind::CourseEnrollment {
        let course_id = order.course_id.as_deref().ok_or_else(|| {
            ApiError::internal(format!("Course order {} has no course id", order.id))
        })?;
        // A conflicting insert means the user already owns the course;
        // for the verifier that is success, not an error.
        enroll::record_purchase(
            txn,
            &order.user_id,
            course_id,
            &evidence.provider_payment_id,
            order.total,
        )
        .await?;
    }

    Ok(VerifyOutcome::Completed)
}

/// Best-effort confirmation email on a detached task. A mail failure is
/// logged and swallowed; it cannot fail the payment transaction.
async fn notify_payment_success(state: &AppState, order: &order::Model) {
    let Some(mail_client) = state.mail_client.clone() else {
        return;
    };

    let recipient = match user::Entity::find_by_id(order.user_id.clone())
        .one(&state.db)
        .await
    {
        Ok(Some(u)) => u.email,
        Ok(None) => {
            tracing::warn!(order_id = %order.id, "No user for payment notification");
            return;
        }
        Err(err) => {
            tracing::warn!(order_id = %order.id, "User lookup for notification failed: {}", err);
            return;
        }
    };

    let (html, text) = templates::payment_confirmation(
        &order.order_number,
        order.total,
        &state.platform_config.currency.to_uppercase(),
    );
    mail::send_in_background(
        mail_client,
        EmailMessage {
            to: recipient,
            subject: format!("Order {} confirmed", order.order_number),
            body_html: Some(html),
            body_text: Some(text),
        },
    );
}
