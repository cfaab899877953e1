use std::sync::Arc;

use cartella_types::Result;

#[cfg(feature = "sendgrid")]
mod sendgrid;
#[cfg(feature = "smtp")]
mod smtp;
pub mod templates;

#[cfg(feature = "sendgrid")]
pub use sendgrid::SendgridMailClient;
#[cfg(feature = "smtp")]
pub use smtp::SmtpMailClient;

#[derive(Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MailProviderType {
    Smtp,
    Sendgrid,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    pub provider: MailProviderType,
    pub from_email: String,
    pub from_name: String,
}

impl MailConfig {
    /// Reads `MAIL_PROVIDER`, `MAIL_FROM_EMAIL` and `MAIL_FROM_NAME`.
    /// Returns `None` when mail is not configured; the service runs fine
    /// without it, notifications are simply skipped.
    pub fn from_env() -> Option<Self> {
        let provider = match std::env::var("MAIL_PROVIDER").ok()?.to_lowercase().as_str() {
            "smtp" => MailProviderType::Smtp,
            "sendgrid" => MailProviderType::Sendgrid,
            other => {
                tracing::warn!("Unknown MAIL_PROVIDER '{}', mail disabled", other);
                return None;
            }
        };
        let from_email = std::env::var("MAIL_FROM_EMAIL").ok()?;
        let from_name =
            std::env::var("MAIL_FROM_NAME").unwrap_or_else(|_| "Cartella".to_string());
        Some(Self {
            provider,
            from_email,
            from_name,
        })
    }
}

#[async_trait::async_trait]
pub trait MailClient: Send + Sync {
    async fn send(&self, message: EmailMessage) -> Result<()>;
    fn from_email(&self) -> &str;
    fn from_name(&self) -> &str;
}

pub type DynMailClient = Arc<dyn MailClient>;

pub async fn create_mail_client(config: &MailConfig) -> Result<DynMailClient> {
    match config.provider {
        MailProviderType::Smtp => {
            #[cfg(feature = "smtp")]
            {
                let client = SmtpMailClient::new(config)?;
                Ok(Arc::new(client))
            }
            #[cfg(not(feature = "smtp"))]
            {
                Err(cartella_types::anyhow!("SMTP feature not enabled"))
            }
        }
        MailProviderType::Sendgrid => {
            #[cfg(feature = "sendgrid")]
            {
                let client = SendgridMailClient::new(config)?;
                Ok(Arc::new(client))
            }
            #[cfg(not(feature = "sendgrid"))]
            {
                Err(cartella_types::anyhow!("Sendgrid feature not enabled"))
            }
        }
    }
}

/// Best-effort delivery on a detached task. Used for the post-payment
/// notifications: a mail failure is structurally incapable of failing the
/// request that queued it.
pub fn send_in_background(client: DynMailClient, message: EmailMessage) {
    tokio::spawn(async move {
        if let Err(err) = client.send(message).await {
            tracing::warn!("Failed to send notification email: {}", err);
        }
    });
}
