//! Telegram Bot API notifier.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use jobwatch_shared::{JobWatchError, Result};

use crate::Notifier;

/// Body of a `sendMessage` call.
#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Envelope every Bot API response shares.
#[derive(Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends messages through `POST {api_base}/bot{token}/sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    api_base: Url,
    token: String,
}

impl TelegramNotifier {
    /// Create a notifier for the bot identified by `token`.
    pub fn new(api_base: Url, token: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| JobWatchError::Delivery(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            token: token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.as_str().trim_end_matches('/'),
            self.token
        )
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_base", &self.api_base.as_str())
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip_all, fields(chat_id = %destination))]
    async fn send(&self, destination: &str, message: &str) -> Result<()> {
        // Errors carry the request URL, which contains the token.
        let response = self
            .client
            .post(self.endpoint())
            .json(&SendMessage {
                chat_id: destination,
                text: message,
            })
            .send()
            .await
            .map_err(|e| JobWatchError::Delivery(e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobWatchError::Delivery(e.without_url().to_string()))?;

        let parsed: Option<ApiResponse> = serde_json::from_str(&body).ok();
        match parsed {
            Some(api) if status.is_success() && api.ok => {
                debug!(bytes = message.len(), "message delivered");
                Ok(())
            }
            Some(ApiResponse {
                description: Some(description),
                ..
            }) => Err(JobWatchError::Delivery(format!("HTTP {status}: {description}"))),
            _ => Err(JobWatchError::Delivery(format!(
                "HTTP {status}: unexpected Bot API response"
            ))),
        }
    }
}
