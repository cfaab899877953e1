use crate::{
    checkout::builder::{self, CheckoutRequest},
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
pub struct CreateCodOrderResponse {
    pub order_id: String,
    pub order_number: String,
}

/// POST /payments/create-cod-order
///
/// Cash on delivery: the order is created `pending`/`pending` and never
/// enters the payment verifier; settlement is an out-of-scope fulfillment
/// concern.
#[utoipa::path(
    post,
    path = "/payments/create-cod-order",
    tag = "payments",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order created", body = CreateCodOrderResponse),
        (status = 400, description = "Invalid cart")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /payments/create-cod-order", skip(state, user, request))]
pub async fn create_cod_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<Envelope<CreateCodOrderResponse>>, ApiError> {
    let sub = user.sub()?;

    if request.course_id.is_some() {
        return Err(ApiError::bad_request(
            "Cash on delivery is not available for courses",
        ));
    }

    let built = builder::build_order(&state, &sub, PaymentMethod::Cod, request).await?;

    Ok(Envelope::ok(CreateCodOrderResponse {
        order_id: built.order.id,
        order_number: built.order.order_number,
    }))
}
