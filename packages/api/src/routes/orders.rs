use crate::{
    entity::{
        order, order_item,
        sea_orm_active_enums::{OrderStatus, PaymentStatus},
    },
    error::ApiError,
    middleware::jwt::AppUser,
    routes::Envelope,
    state::AppState,
};
use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_orders))
        .route("/{order_id}", get(get_order))
        .route("/{order_id}/cancel", post(cancel_order))
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemResponse {
    pub product_id: Option<String>,
    pub name: String,
    pub image: Option<String>,
    pub unit_price: Decimal,
    pub quantity: i32,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub fulfillment: crate::entity::sea_orm_active_enums::FulfillmentKind,
    pub course_id: Option<String>,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: crate::entity::sea_orm_active_enums::PaymentMethod,
    pub shipping_address: Option<serde_json::Value>,
    pub billing_address: Option<serde_json::Value>,
    pub coupon_code: Option<String>,
    pub notes: Option<String>,
    pub created_at: chrono::NaiveDateTime,
    pub items: Vec<OrderItemResponse>,
}

fn to_response(order: order::Model, items: Vec<order_item::Model>) -> OrderResponse {
    OrderResponse {
        id: order.id,
        order_number: order.order_number,
        fulfillment: order.fulfillment,
        course_id: order.course_id,
        subtotal: order.subtotal,
        tax: order.tax,
        shipping: order.shipping,
        discount: order.discount,
        total: order.total,
        status: order.status,
        payment_status: order.payment_status,
        payment_method: order.payment_method,
        shipping_address: order.shipping_address,
        billing_address: order.billing_address,
        coupon_code: order.coupon_code,
        notes: order.notes,
        created_at: order.created_at,
        items: items
            .into_iter()
            .map(|i| OrderItemResponse {
                product_id: i.product_id,
                name: i.name,
                image: i.image,
                unit_price: i.unit_price,
                quantity: i.quantity,
                total: i.total,
            })
            .collect(),
    }
}

/// GET /orders
#[utoipa::path(
    get,
    path = "/orders",
    tag = "orders",
    responses(
        (status = 200, description = "The caller's orders, newest first", body = [OrderResponse])
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "GET /orders", skip(state, user))]
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
) -> Result<Json<Envelope<Vec<OrderResponse>>>, ApiError> {
    let sub = user.sub()?;

    let orders = order::Entity::find()
        .filter(order::Column::UserId.eq(sub))
        .order_by_desc(order::Column::CreatedAt)
        .find_with_related(order_item::Entity)
        .all(&state.db)
        .await?;

    Ok(Envelope::ok(
        orders
            .into_iter()
            .map(|(order, items)| to_response(order, items))
            .collect(),
    ))
}

/// GET /orders/{order_id}
#[utoipa::path(
    get,
    path = "/orders/{order_id}",
    tag = "orders",
    params(("order_id" = String, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order with its items", body = OrderResponse),
        (status = 404, description = "Unknown order")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "GET /orders/{order_id}", skip(state, user))]
pub async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(order_id): Path<String>,
) -> Result<Json<Envelope<OrderResponse>>, ApiError> {
    let sub = user.sub()?;

    let order = order::Entity::find_by_id(order_id)
        .filter(order::Column::UserId.eq(sub))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NOT_FOUND)?;

    let items = order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order.id.clone()))
        .all(&state.db)
        .await?;

    Ok(Envelope::ok(to_response(order, items)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    pub order_id: String,
    pub status: String,
}

/// POST /orders/{order_id}/cancel
///
/// Allowed only while the payment is still pending; paid orders go through
/// the refund endpoint instead. The transition is one conditional update,
/// so a concurrent verification and a cancel cannot both win.
#[utoipa::path(
    post,
    path = "/orders/{order_id}/cancel",
    tag = "orders",
    params(("order_id" = String, Path, description = "Order id")),
    request_body = CancelOrderRequest,
    responses(
        (status = 200, description = "Order cancelled", body = CancelOrderResponse),
        (status = 400, description = "Order can no longer be cancelled"),
        (status = 404, description = "Unknown order")
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(name = "POST /orders/{order_id}/cancel", skip(state, user, request))]
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AppUser>,
    Path(order_id): Path<String>,
    Json(request): Json<CancelOrderRequest>,
) -> Result<Json<Envelope<CancelOrderResponse>>, ApiError> {
    let sub = user.sub()?;

    let order = order::Entity::find_by_id(order_id.clone())
        .filter(order::Column::UserId.eq(sub))
        .one(&state.db)
        .await?
        .ok_or(ApiError::NOT_FOUND)?;

    let update = order::Entity::update_many()
        .col_expr(order::Column::Status, Expr::value(OrderStatus::Cancelled))
        .col_expr(order::Column::Notes, Expr::value(request.reason.clone()))
        .col_expr(
            order::Column::UpdatedAt,
            Expr::value(Utc::now().naive_utc()),
        )
        .filter(order::Column::Id.eq(&order.id))
        .filter(order::Column::PaymentStatus.eq(PaymentStatus::Pending))
        .filter(order::Column::Status.is_in([OrderStatus::Pending, OrderStatus::Processing]))
        .exec(&state.db)
        .await?;

    if update.rows_affected == 0 {
        return Err(ApiError::already_processed(
            "Order can no longer be cancelled",
        ));
    }

    tracing::info!(order_id = %order.id, "Order cancelled");

    Ok(Envelope::ok(CancelOrderResponse {
        order_id: order.id,
        status: "cancelled".to_string(),
    }))
}
