use std::time::Duration;

use async_trait::async_trait;
use leaderhook_application::{HolderNotifier, NotificationResponse};
use leaderhook_core::{AppError, AppResult};
use leaderhook_domain::{NotificationEndpoint, NotificationTarget};
use url::Url;

const MAX_RESPONSE_BODY_CHARS: usize = 512;

/// HTTP implementation of holder notifications.
///
/// Sends one JSON POST per call. Retrying is left to the dispatcher.
pub struct HttpHolderNotifier {
    http_client: reqwest::Client,
    endpoint: NotificationEndpoint,
    request_timeout: Duration,
}

impl HttpHolderNotifier {
    /// Default per-request timeout.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Creates a notifier for the given endpoint.
    #[must_use]
    pub fn new(
        http_client: reqwest::Client,
        endpoint: NotificationEndpoint,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            endpoint,
            request_timeout,
        }
    }

    fn url_for(&self, address: &str) -> AppResult<Url> {
        let raw = self.endpoint.url_for(address);
        Url::parse(raw.as_str()).map_err(|error| {
            AppError::Validation(format!("invalid notification url '{raw}': {error}"))
        })
    }
}

#[async_trait]
impl HolderNotifier for HttpHolderNotifier {
    async fn send_notification(
        &self,
        target: &NotificationTarget,
    ) -> AppResult<NotificationResponse> {
        let url = self.url_for(target.address())?;

        let response = self
            .http_client
            .post(url.clone())
            .timeout(self.request_timeout)
            .json(&target.payload())
            .send()
            .await
            .map_err(|error| {
                AppError::Transport(format!("notification to '{url}' failed: {error}"))
            })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());

        Ok(NotificationResponse {
            status,
            body: truncate_body(body),
        })
    }
}

fn truncate_body(body: String) -> String {
    if body.chars().count() <= MAX_RESPONSE_BODY_CHARS {
        return body;
    }

    let mut truncated: String = body.chars().take(MAX_RESPONSE_BODY_CHARS).collect();
    truncated.push_str("...");
    truncated
}
