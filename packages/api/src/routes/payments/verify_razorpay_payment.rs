use crate::{
    checkout::verify,
    error::ApiError,
    middleware::jwt::AppUser,
    routes::Envelope,
    state::AppState,
};
use axum::{Extension, Json, extract::State};
use serde::Deserialize;
use utoipa::ToSchema;

use super::verify_stripe_payment::{VerifyPaymentResponse, outcome_label};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VerifyRazorpayPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    pub order_id: String,
}

/// POST /payments/verify-razorpay-payment
///
/// Verification is a local HMAC check over `order_id|payment_id`; a
/// mismatched signature is a hard 400 and nothing is written.
#[utoipa::path(
    post,
    path = "/payments/verify-razorpay-payment",
    tag = "payments",
    request_body = VerifyRazorpayPaymentRequest,
    responses(
        (status = 200, description = "Payment verified", body = VerifyPaymentResponse),
        (status = 400, description = "Invalid payment signature"),
        (status = 404, description = "Unknown order")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    name = "POST /payments/verify-razorpay-payment",
    skip(state, user, request)
)]
pub async fn verify_razorpay_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<VerifyRazorpayPaymentRequest>,
) -> Result<Json<Envelope<VerifyPaymentResponse>>, ApiError> {
    let sub = user.sub()?;

    let outcome = verify::verify_razorpay(
        &state,
        &sub,
        &request.order_id,
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
    )
    .await?;

    Ok(Envelope::ok(VerifyPaymentResponse {
        order_id: request.order_id,
        status: outcome_label(outcome),
    }))
}
