//! Minimal Razorpay REST client: order creation plus local HMAC signature
//! verification. Verification never calls the provider; the signature the
//! checkout page posts back is recomputed from the key secret.

use cartella_types::{Result, bail};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com/v1";

#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
}

#[derive(Debug, Clone, Serialize)]
struct CreateOrderRequest<'a> {
    /// Minor units (paise)
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub status: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
        }
    }

    /// Public key id, safe to hand to the checkout page.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> Result<RazorpayOrder> {
        let res = self
            .http
            .post(format!("{}/orders", RAZORPAY_API_BASE))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderRequest {
                amount: amount_minor,
                currency,
                receipt,
            })
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            bail!("Razorpay order creation failed ({}): {}", status, body);
        }

        Ok(res.json::<RazorpayOrder>().await?)
    }

    /// Checks the callback signature the checkout page submitted.
    pub fn verify_payment_signature(
        &self,
        order_id: &str,
        payment_id: &str,
        signature_hex: &str,
    ) -> bool {
        verify_signature(&self.key_secret, order_id, payment_id, signature_hex)
    }
}

/// HMAC-SHA256 over `"{order_id}|{payment_id}"`, hex-encoded. Comparison is
/// constant-time via `Mac::verify_slice`. Malformed hex rejects outright.
pub fn verify_signature(
    secret: &str,
    order_id: &str,
    payment_id: &str,
    signature_hex: &str,
) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test_key_secret";

    fn sign(order_id: &str, payment_id: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(format!("{}|{}", order_id, payment_id).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn valid_signature_verifies() {
        let sig = sign("order_123", "pay_456");
        assert!(verify_signature(SECRET, "order_123", "pay_456", &sig));
    }

    #[test]
    fn single_byte_mutation_rejects() {
        let sig = sign("order_123", "pay_456");
        let mut bytes = sig.into_bytes();
        // Flip one hex digit
        bytes[0] = if bytes[0] == b'0' { b'1' } else { b'0' };
        let mutated = String::from_utf8(bytes).unwrap();
        assert!(!verify_signature(SECRET, "order_123", "pay_456", &mutated));
    }

    #[test]
    fn wrong_ids_reject() {
        let sig = sign("order_123", "pay_456");
        assert!(!verify_signature(SECRET, "order_123", "pay_457", &sig));
        assert!(!verify_signature(SECRET, "order_124", "pay_456", &sig));
    }

    #[test]
    fn malformed_hex_rejects() {
        assert!(!verify_signature(SECRET, "order_123", "pay_456", "not-hex"));
        assert!(!verify_signature(SECRET, "order_123", "pay_456", ""));
    }
}
