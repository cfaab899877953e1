//! `SeaORM` entities for the Cartella data model

pub mod course;
pub mod discount;
pub mod order;
pub mod order_item;
pub mod payment;
pub mod payment_order;
pub mod prelude;
pub mod product;
pub mod purchase;
pub mod sea_orm_active_enums;
pub mod stripe_event;
pub mod user;
