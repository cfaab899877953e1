//! `SeaORM` Entity prelude

pub use super::course::Entity as Course;
pub use super::discount::Entity as Discount;
pub use super::order::Entity as Order;
pub use super::order_item::Entity as OrderItem;
pub use super::payment::Entity as Payment;
pub use super::payment_order::Entity as PaymentOrder;
pub use super::product::Entity as Product;
pub use super::purchase::Entity as Purchase;
pub use super::stripe_event::Entity as StripeEvent;
pub use super::user::Entity as User;
