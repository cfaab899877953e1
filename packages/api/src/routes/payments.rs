use crate::state::AppState;
use axum::{Router, routing::post};

pub mod create_cod_order;
pub mod create_razorpay_order;
pub mod create_stripe_session;
pub mod refund;
pub mod verify_razorpay_payment;
pub mod verify_stripe_payment;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/create-stripe-session",
            post(create_stripe_session::create_stripe_session),
        )
        .route(
            "/create-razorpay-order",
            post(create_razorpay_order::create_razorpay_order),
        )
        .route("/create-cod-order", post(create_cod_order::create_cod_order))
        .route(
            "/verify-stripe-payment",
            post(verify_stripe_payment::verify_stripe_payment),
        )
        .route(
            "/verify-razorpay-payment",
            post(verify_razorpay_payment::verify_razorpay_payment),
        )
        .route("/refund", post(refund::refund))
        .route(
            "/webhook/stripe",
            post(crate::routes::webhook::stripe_webhook),
        )
}
