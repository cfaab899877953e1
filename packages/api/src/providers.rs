//! External payment-provider clients. Stripe goes through `async-stripe`;
//! Razorpay has no Rust SDK, so a minimal REST client lives here.

pub mod razorpay;
