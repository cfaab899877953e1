use crate::{
    checkout::verify::{self, VerifyOutcome},
    error::ApiError,
    middleware::jwt::AppUser,
    routes::Envelope,
    state::AppState,
};
use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyStripePaymentRequest {
    pub session_id: String,
    pub order_id: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub order_id: String,
    pub status: String,
}

/// POST /payments/verify-stripe-payment
///
/// Client-driven confirmation from the return page. Idempotent: repeating
/// the call after success reports `already_processed` without writing.
#[utoipa::path(
    post,
    path = "/payments/verify-stripe-payment",
    tag = "payments",
    request_body = VerifyStripePaymentRequest,
    responses(
        (status = 200, description = "Payment verified", body = VerifyPaymentResponse),
        (status = 400, description = "Payment not completed or session mismatch"),
        (status = 404, description = "Unknown order")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /payments/verify-stripe-payment", skip(state, user, request))]
pub async fn verify_stripe_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<VerifyStripePaymentRequest>,
) -> Result<Json<Envelope<VerifyPaymentResponse>>, ApiError> {
    let sub = user.sub()?;

    let outcome =
        verify::verify_stripe(&state, &sub, &request.order_id, &request.session_id).await?;

    Ok(Envelope::ok(VerifyPaymentResponse {
        order_id: request.order_id,
        status: outcome_label(outcome),
    }))
}

pub(super) fn outcome_label(outcome: VerifyOutcome) -> String {
    match outcome {
        VerifyOutcome::Completed => "completed".to_string(),
        VerifyOutcome::AlreadyProcessed => "already_processed".to_string(),
    }
}
