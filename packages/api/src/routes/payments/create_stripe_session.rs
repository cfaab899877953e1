use crate::{
    checkout::{
        builder::{self, CheckoutRequest},
        session,
    },
    entity::sea_orm_active_enums::PaymentMethod,
    error::ApiError,
    middleware::jwt::AppUser,
    routes::Envelope,
    state::AppState,
};
use axum::{Extension, Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStripeSessionResponse {
    pub session_id: String,
    pub session_url: String,
    pub order_id: String,
    pub order_number: String,
}

/// POST /payments/create-stripe-session
///
/// Builds the order from the server-priced cart, then opens a hosted
/// Stripe Checkout session for it. The session id lands on the order as
/// its payment reference.
#[utoipa::path(
    post,
    path = "/payments/create-stripe-session",
    tag = "payments",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CreateStripeSessionResponse),
        (status = 400, description = "Invalid cart"),
        (status = 503, description = "Stripe not configured")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /payments/create-stripe-session", skip(state, user, request))]
pub async fn create_stripe_session(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Envelope<CreateStripeSessionResponse>>, ApiError> {
    let sub = user.sub()?;

    // Fail before creating an order the provider can never settle.
    if state.stripe_client.is_none() {
        return Err(ApiError::service_unavailable("Stripe is not configured"));
    }

    let built = builder::build_order(&state, &sub, PaymentMethod::Stripe, request).await?;
    let session = session::create_stripe_session(&state, &built.order, &built.items).await?;

    Ok(Envelope::ok(CreateStripeSessionResponse {
        session_id: session.session_id,
        session_url: session.session_url,
        order_id: built.order.id,
        order_number: built.order.order_number,
    }))
}
