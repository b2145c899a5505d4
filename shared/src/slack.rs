use reqwest::Client;
use serde::Serialize;
use tracing::instrument;

/// Slack incoming webhook. Every call posts one message, no retries.
#[derive(Clone, Debug)]
pub struct SlackWebhook {
    client: Client,
    url: String,
}

#[derive(Serialize, Debug)]
struct WebhookPayload<'a> {
    text: &'a str,
}

impl SlackWebhook {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn send_message(&self, text: &str) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { text })
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to send message: Received HTTP {}",
                response.status()
            );
        }

        Ok(())
    }
}
