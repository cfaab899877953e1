use cartella_types::{Result, anyhow};
use rust_decimal::Decimal;

/// Pricing and storefront configuration. These are deployment constants,
/// never user input: the order builder reads tax and shipping rules from
/// here exclusively.
#[derive(Clone, Debug)]
pub struct PlatformConfig {
    /// ISO 4217 code, lowercase (Stripe style)
    pub currency: String,
    /// Fraction of the subtotal, e.g. 0.10 for 10%
    pub tax_rate: Decimal,
    /// Flat shipping fee below the free-shipping threshold
    pub shipping_flat_fee: Decimal,
    /// Subtotal at/above which shipping is free
    pub free_shipping_threshold: Decimal,
    /// Base URL the provider redirects back to after checkout
    pub frontend_url: String,
}

impl PlatformConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            currency: std::env::var("CURRENCY")
                .unwrap_or_else(|_| "usd".to_string())
                .to_lowercase(),
            tax_rate: parse_decimal("TAX_RATE", "0.10")?,
            shipping_flat_fee: parse_decimal("SHIPPING_FLAT_FEE", "10.00")?,
            free_shipping_threshold: parse_decimal("FREE_SHIPPING_THRESHOLD", "100.00")?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

fn parse_decimal(var: &str, default: &str) -> Result<Decimal> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    raw.parse::<Decimal>()
        .map_err(|_| anyhow!("Invalid value for {}: {}", var, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse() {
        let config = PlatformConfig::from_env().unwrap();
        assert_eq!(config.currency.len(), 3);
        assert!(config.tax_rate >= Decimal::ZERO);
        assert!(config.free_shipping_threshold > config.shipping_flat_fee);
    }
}
