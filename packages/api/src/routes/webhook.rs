use crate::{
    checkout::verify::{self, ProviderEvidence},
    entity::{order, sea_orm_active_enums::PaymentProvider, stripe_event},
    error::ApiError,
    routes::Envelope,
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, EntityTrait};
use serde::Serialize;
use stripe::{Event, EventObject, EventType, Webhook};
use utoipa::ToSchema;

fn get_stripe_webhook_secret() -> Option<String> {
    std::env::var("STRIPE_WEBHOOK_SECRET").ok()
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookResponse {
    pub received: bool,
}

/// POST /payments/webhook/stripe
///
/// The signing secret is mandatory: without it the endpoint answers 503
/// rather than trusting an unverified body. Event ids are deduped through
/// the `StripeEvent` ledger, so provider redeliveries are acknowledged
/// without reprocessing.
#[utoipa::path(
    post,
    path = "/payments/webhook/stripe",
    tag = "payments",
    request_body = String,
    responses(
        (status = 200, description = "Event acknowledged", body = WebhookResponse),
        (status = 400, description = "Signature verification failed"),
        (status = 503, description = "Webhook secret not configured")
    )
)]
#[tracing::instrument(name = "POST /payments/webhook/stripe", skip(state, headers, payload))]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Bytes,
) -> Result<Json<Envelope<WebhookResponse>>, ApiError> {
    let webhook_secret = get_stripe_webhook_secret()
        .ok_or_else(|| ApiError::service_unavailable("Webhook secret not configured"))?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request("Missing stripe-signature header"))?;

    let payload_str = std::str::from_utf8(&payload)
        .map_err(|_| ApiError::bad_request("Invalid UTF-8 in payload"))?;

    let event = Webhook::construct_event(payload_str, signature, &webhook_secret)
        .map_err(|e| ApiError::invalid_signature(format!("Webhook verification failed: {}", e)))?;

    let event_id = event.id.to_string();
    if is_event_processed(&state, &event_id).await? {
        tracing::info!(event_id = %event_id, "Duplicate event, skipping");
        return Ok(Envelope::ok(WebhookResponse { received: true }));
    }

    match handle_stripe_event(&state, &event).await {
        Ok(_) => {
            mark_event_processed(&state, &event_id, &event.type_.to_string()).await?;
            Ok(Envelope::ok(WebhookResponse { received: true }))
        }
        Err(e) => {
            tracing::error!(event_id = %event_id, "Failed to process webhook");
            Err(e)
        }
    }
}

async fn is_event_processed(state: &AppState, event_id: &str) -> Result<bool, ApiError> {
    let existing = stripe_event::Entity::find_by_id(event_id)
        .one(&state.db)
        .await?;
    Ok(existing.is_some())
}

async fn mark_event_processed(
    state: &AppState,
    event_id: &str,
    event_type: &str,
) -> Result<(), ApiError> {
    let new_event = stripe_event::ActiveModel {
        id: Set(event_id.to_string()),
        event_type: Set(event_type.to_string()),
        processed_at: Set(chrono::Utc::now().naive_utc()),
    };
    new_event.insert(&state.db).await?;
    Ok(())
}

async fn handle_stripe_event(state: &AppState, event: &Event) -> Result<(), ApiError> {
    match event.type_ {
        EventType::CheckoutSessionCompleted => {
            if let EventObject::CheckoutSession(session) = &event.data.object {
                handle_checkout_completed(state, session).await?;
            }
        }
        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(intent) = &event.data.object {
                // Logged for follow-up; the order stays pending.
                tracing::warn!(
                    payment_intent_id = %intent.id,
                    "Processing payment_intent.payment_failed"
                );
            }
        }
        _ => {
            tracing::debug!(event_type = %event.type_, "Unhandled event type");
        }
    }

    Ok(())
}

async fn handle_checkout_completed(
    state: &AppState,
    session: &stripe::CheckoutSession,
) -> Result<(), ApiError> {
    let session_id = session.id.to_string();

    tracing::info!(
        session_id = %session_id,
        client_reference_id = ?session.client_reference_id,
        payment_status = ?session.payment_status,
        "Processing checkout.session.completed"
    );

    if session.payment_status != stripe::CheckoutSessionPaymentStatus::Paid {
        tracing::warn!(session_id = %session_id, "Session completed but not paid, skipping");
        return Ok(());
    }

    let order_id = session
        .metadata
        .as_ref()
        .and_then(|m| m.get("order_id").cloned())
        .or_else(|| session.client_reference_id.clone())
        .ok_or_else(|| ApiError::bad_request("Session carries no order correlation"))?;

    let Some(order) = order::Entity::find_by_id(order_id.clone())
        .one(&state.db)
        .await?
    else {
        tracing::warn!(order_id = %order_id, "Order not found for checkout session");
        return Ok(());
    };

    let evidence = ProviderEvidence {
        provider: PaymentProvider::Stripe,
        provider_payment_id: session
            .payment_intent
            .as_ref()
            .map(|pi| pi.id().to_string())
            .unwrap_or_else(|| session_id.clone()),
        provider_order_id: Some(session_id),
        metadata: serde_json::to_value(&session.metadata).ok(),
    };

    verify::record_success(state, order, evidence).await?;
    Ok(())
}
