//! Transactional email via the Brevo HTTP API.
//!
//! Intake notifications and subscription confirmations are best-effort: they
//! run on a spawned task and a failure is logged, never surfaced. Only the
//! explicit reply endpoint treats a send failure as an error.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.brevo.com/v3/smtp/email";
const DEFAULT_FROM: &str = "noreply@dreamaker-productions.com";

pub struct Mailer {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    from: String,
}

impl Mailer {
    /// Build from `BREVO_API_KEY` / `BREVO_API_URL` / `MAIL_FROM`.
    /// Without an API key there is no mailer and every best-effort send
    /// becomes a logged no-op.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("BREVO_API_KEY").ok()?;
        let api_url =
            std::env::var("BREVO_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let from = std::env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_FROM.to_string());

        Some(Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            from,
        })
    }

    pub async fn send(&self, to: &str, subject: &str, html: &str) -> Result<()> {
        let payload = json!({
            "sender": { "email": self.from },
            "to": [{ "email": to }],
            "subject": subject,
            "htmlContent": html,
        });

        self.client
            .post(&self.api_url)
            .header("api-key", &self.api_key)
            .json(&payload)
            .send()
            .await
            .context("email API request failed")?
            .error_for_status()
            .context("email API rejected the message")?;

        Ok(())
    }
}

/// Fire-and-forget send. The primary operation has already succeeded by the
/// time this runs; delivery failures are logged at warn and swallowed.
pub fn send_best_effort(mailer: Option<Arc<Mailer>>, to: String, subject: String, html: String) {
    let Some(mailer) = mailer else {
        debug!("mailer not configured, skipping '{}' to {}", subject, to);
        return;
    };

    tokio::spawn(async move {
        if let Err(e) = mailer.send(&to, &subject, &html).await {
            warn!("best-effort email '{}' to {} failed: {:#}", subject, to, e);
        }
    });
}
