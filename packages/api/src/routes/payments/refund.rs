use crate::{
    checkout::refund as refund_flow,
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
pub struct RefundRequest {
    pub order_id: String,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefundResponse {
    pub refund_id: String,
}

/// POST /payments/refund
///
/// Stripe only. Razorpay refunds are unsupported by this service and
/// rejected explicitly; the order is left untouched unless the provider
/// confirms the refund.
#[utoipa::path(
    post,
    path = "/payments/refund",
    tag = "payments",
    request_body = RefundRequest,
    responses(
        (status = 200, description = "Refund issued", body = RefundResponse),
        (status = 400, description = "Unsupported payment method or order not refundable"),
        (status = 404, description = "Unknown order"),
        (status = 502, description = "Provider refund failed")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /payments/refund", skip(state, user, request))]
pub async fn refund(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<Envelope<RefundResponse>>, ApiError> {
    let sub = user.sub()?;

    let result =
        refund_flow::refund_order(&state, &sub, &request.order_id, &request.reason).await?;

    Ok(Envelope::ok(RefundResponse {
        refund_id: result.refund_id,
    }))
}
