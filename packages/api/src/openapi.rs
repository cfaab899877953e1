use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};

/// Security scheme modifier to add authentication methods
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cartella API",
        description = "Checkout and payment reconciliation service"
    ),
    paths(
        crate::routes::health::health,
        crate::routes::health::db_health,
        crate::routes::payments::create_stripe_session::create_stripe_session,
        crate::routes::payments::create_razorpay_order::create_razorpay_order,
        crate::routes::payments::create_cod_order::create_cod_order,
        crate::routes::payments::verify_stripe_payment::verify_stripe_payment,
        crate::routes::payments::verify_razorpay_payment::verify_razorpay_payment,
        crate::routes::payments::refund::refund,
        crate::routes::webhook::stripe_webhook,
        crate::routes::orders::list_orders,
        crate::routes::orders::get_order,
        crate::routes::orders::cancel_order,
        crate::routes::enrollments::enroll_free,
        crate::routes::enrollments::check_access,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness probes"),
        (name = "payments", description = "Checkout and payment reconciliation"),
        (name = "orders", description = "Order history and cancellation"),
        (name = "enrollments", description = "Course access"),
    )
)]
pub struct ApiDoc;

pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
