//! Discord webhook delivery

use async_trait::async_trait;
use reqwest::Client;
use tracing::{error, info};

use super::message::{NotificationBuilder, WebhookMessage};
use crate::core::config::AppConfig;
use crate::core::models::{PullRequestContext, SummaryResult};
use crate::core::ports::Notifier;
use crate::errors::NotifyError;

pub struct DiscordNotifier {
    http: Client,
    webhook_url: String,
    mention: Option<String>,
}

impl DiscordNotifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| NotifyError::Http(format!("Failed to build Discord HTTP client: {e}")))?;

        Ok(Self {
            http,
            webhook_url: config.discord_webhook_url.clone(),
            mention: config.discord_user_id.clone(),
        })
    }

    /// POSTs one message to the webhook. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Rejected`] on a non-success status and
    /// [`NotifyError::Http`] when the endpoint is unreachable.
    pub async fn send(&self, message: &WebhookMessage) -> Result<(), NotifyError> {
        let resp = self.http.post(&self.webhook_url).json(message).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".to_string());
            error!(
                "Discord webhook POST failed: status={} body={}",
                status, body_text
            );
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body: body_text,
            });
        }

        info!(embeds = message.embeds.len(), "Notification sent to Discord");
        Ok(())
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(
        &self,
        context: &PullRequestContext,
        summary: Option<&SummaryResult>,
        action: &str,
    ) -> Result<(), NotifyError> {
        let message = NotificationBuilder::new(context)
            .action(action)
            .summary(summary)
            .mention(self.mention.as_deref())
            .build();
        self.send(&message).await
    }
}
