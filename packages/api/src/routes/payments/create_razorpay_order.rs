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
pub struct CreateRazorpayOrderResponse {
    pub razorpay_order_id: String,
    /// Minor units (paise), exactly what the checkout widget expects
    pub amount: i64,
    pub currency: String,
    pub order_id: String,
    pub order_number: String,
    pub key_id: String,
}

/// POST /payments/create-razorpay-order
///
/// Builds the order, then opens a Razorpay provider order for the total in
/// minor units with the order number as receipt.
#[utoipa::path(
    post,
    path = "/payments/create-razorpay-order",
    tag = "payments",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Provider order created", body = CreateRazorpayOrderResponse),
        (status = 400, description = "Invalid cart"),
        (status = 502, description = "Provider call failed"),
        (status = 503, description = "Razorpay not configured")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /payments/create-razorpay-order", skip(state, user, request))]
pub async fn create_razorpay_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Envelope<CreateRazorpayOrderResponse>>, ApiError> {
    let sub = user.sub()?;

    if state.razorpay_client.is_none() {
        return Err(ApiError::service_unavailable("Razorpay is not configured"));
    }

    let built = builder::build_order(&state, &sub, PaymentMethod::Razorpay, request).await?;
    let checkout = session::create_razorpay_order(&state, &built.order).await?;

    Ok(Envelope::ok(CreateRazorpayOrderResponse {
        razorpay_order_id: checkout.provider_order_id,
        amount: checkout.amount,
        currency: checkout.currency,
        order_id: built.order.id,
        order_number: built.order.order_number,
        key_id: checkout.key_id,
    }))
}
