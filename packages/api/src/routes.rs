use axum::Json;
use serde::Serialize;

pub mod enrollments;
pub mod health;
pub mod orders;
pub mod payments;
pub mod webhook;

/// Uniform success envelope: `{"success": true, "data": ...}`.
/// [`ApiError`](crate::error::ApiError) renders the failure counterpart.
#[derive(Clone, Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape() {
        let Json(envelope) = Envelope::ok(serde_json::json!({"received": true}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["success"], serde_json::json!(true));
        assert_eq!(value["data"]["received"], serde_json::json!(true));
    }
}
