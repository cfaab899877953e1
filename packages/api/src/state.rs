use std::{collections::HashMap, sync::Arc, time::Duration};

use cartella_types::{Result, Value, anyhow};
use jsonwebtoken::{DecodingKey, Validation, decode};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::PlatformConfig;
use crate::mail::{DynMailClient, MailConfig, create_mail_client};
use crate::providers::razorpay::RazorpayClient;

pub type AppState = Arc<State>;

pub struct State {
    pub platform_config: PlatformConfig,
    pub db: DatabaseConnection,
    pub stripe_client: Option<stripe::Client>,
    pub razorpay_client: Option<RazorpayClient>,
    pub mail_client: Option<DynMailClient>,
    jwt_secret: Option<String>,
}

impl State {
    pub async fn new() -> Self {
        let platform_config = PlatformConfig::from_env().expect("Failed to parse platform config");

        let db_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let mut opt = ConnectOptions::new(db_url.to_owned());
        opt.max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8))
            .sqlx_logging(false);

        let db = Database::connect(opt)
            .await
            .expect("Failed to connect to database");

        let stripe_client = std::env::var("STRIPE_SECRET_KEY")
            .ok()
            .map(stripe::Client::new);
        if stripe_client.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set, Stripe checkout disabled");
        }

        let razorpay_client = match (
            std::env::var("RAZORPAY_KEY_ID"),
            std::env::var("RAZORPAY_KEY_SECRET"),
        ) {
            (Ok(key_id), Ok(key_secret)) => Some(RazorpayClient::new(key_id, key_secret)),
            _ => {
                tracing::warn!("Razorpay credentials not set, Razorpay checkout disabled");
                None
            }
        };

        let mail_client = match MailConfig::from_env() {
            Some(mail_config) => match create_mail_client(&mail_config).await {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!("Failed to initialize mail client: {}", e);
                    None
                }
            },
            None => None,
        };

        let jwt_secret = std::env::var("JWT_SECRET").ok();
        if jwt_secret.is_none() {
            tracing::warn!("JWT_SECRET not set, authenticated routes will reject all tokens");
        }

        Self {
            platform_config,
            db,
            stripe_client,
            razorpay_client,
            mail_client,
            jwt_secret,
        }
    }

    pub fn validate_token(&self, token: &str) -> Result<HashMap<String, Value>> {
        let secret = self
            .jwt_secret
            .as_deref()
            .ok_or_else(|| anyhow!("JWT_SECRET not configured"))?;
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        let decoded = decode::<HashMap<String, Value>>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(decoded.claims)
    }
}
