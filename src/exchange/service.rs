//! Client for the remote reply service.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::error::ExchangeError;

/// Path of the chat endpoint, relative to the service base URL.
pub const CHAT_PATH: &str = "chat";

/// Something that turns a user message into a reply.
#[async_trait::async_trait]
pub trait ReplyService: Send + Sync {
    /// Send one message and wait for its reply.
    async fn send(&self, message: &str) -> Result<String, ExchangeError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    reply: String,
}

/// `POST {base}/chat` with `{"message": ...}`, expecting `{"reply": ...}`.
#[derive(Debug, Clone)]
pub struct HttpReplyService {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpReplyService {
    /// Create a client for the service at `base_url`.
    ///
    /// Every request is bounded by `timeout`; expiry is reported as
    /// [`ExchangeError::Timeout`].
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ExchangeError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, http)
    }

    /// Create a client with a custom reqwest client.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, ExchangeError> {
        let mut base = Url::parse(base_url)?;
        // Without a trailing slash `join` would replace the last path segment.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(CHAT_PATH)?;
        Ok(Self { http, endpoint })
    }

    /// Full URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ReplyService for HttpReplyService {
    async fn send(&self, message: &str) -> Result<String, ExchangeError> {
        debug!(name: "service.request", endpoint = %self.endpoint, "Sending chat request");

        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&ChatRequest { message })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status.is_client_error() {
                warn!(name: "service.client_error", status = status.as_u16(), "Reply service rejected the request");
            } else {
                warn!(name: "service.server_error", status = status.as_u16(), "Reply service failed");
            }
            return Err(ExchangeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        let reply: ChatReply = serde_json::from_slice(&bytes)?;
        Ok(reply.reply)
    }
}
