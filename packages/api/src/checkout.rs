//! The order/payment pipeline: build an order from a server-priced cart,
//! open a provider payment session, verify the payment outcome, record the
//! payment and any enrollment, refund on request.
//!
//! The pipeline is shared by both storefront variants; only the
//! fulfillment step branches on the order's [`FulfillmentKind`].
//!
//! [`FulfillmentKind`]: crate::entity::sea_orm_active_enums::FulfillmentKind

pub mod builder;
pub mod enroll;
pub mod money;
pub mod refund;
pub mod session;
pub mod verify;
