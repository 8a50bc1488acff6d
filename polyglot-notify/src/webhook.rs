//! Report notifications delivered by webhook
//!
//! A notification is a single JSON `POST` to the recipient's target URL:
//!
//! ```json
//! {
//!     "name": "Weekly sales",
//!     "time": 1718000000000,
//!     "description": "Sales by region",
//!     "url": "https://bi.example.com/dashboard/7",
//!     "text": "Revenue is up 4%"
//! }
//! ```
//!
//! `time` is the send time in milliseconds since the Unix epoch (UTC).
//! Any failure, from a malformed recipient config to a non-2xx answer, is
//! reported as [`NotificationError::Unprocessable`]. Each send is counted in
//! [`WebhookMetrics`] by outcome.

use crate::error::{NotificationError, NotifyResult};
use crate::headers::{HeaderProvider, Headers};
use crate::metrics::{SendOutcome, WebhookMetrics};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// Report content to deliver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationContent {
    pub name: String,
    pub description: Option<String>,
    pub url: Option<String>,
    pub text: Option<String>,
}

/// Recipient configuration as stored with the report, e.g. `{"target": "https://..."}`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RecipientConfig {
    pub target: String,
}

impl RecipientConfig {
    pub fn from_json(json: &str) -> NotifyResult<Self> {
        serde_json::from_str(json).map_err(|e| {
            NotificationError::Unprocessable(format!("Invalid recipient config: {}", e))
        })
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    name: &'a str,
    time: i64,
    description: Option<&'a str>,
    url: Option<&'a str>,
    text: Option<&'a str>,
}

impl<'a> WebhookPayload<'a> {
    fn new(content: &'a NotificationContent, time: i64) -> Self {
        Self {
            name: &content.name,
            time,
            description: content.description.as_deref(),
            url: content.url.as_deref(),
            text: content.text.as_deref(),
        }
    }
}

/// Sends report notifications to one webhook recipient
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: reqwest::Client,
    recipient: RecipientConfig,
    headers: HeaderProvider,
    metrics: Option<WebhookMetrics>,
}

impl WebhookNotifier {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn new(recipient: RecipientConfig, headers: HeaderProvider) -> NotifyResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Self::DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| {
                NotificationError::Unprocessable(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            recipient,
            headers,
            metrics: WebhookMetrics::global(),
        })
    }

    /// Build a notifier from the stored recipient config JSON
    pub fn from_recipient_json(json: &str, headers: HeaderProvider) -> NotifyResult<Self> {
        Self::new(RecipientConfig::from_json(json)?, headers)
    }

    /// Reuse an existing HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Count sends in `metrics` instead of the default registry
    pub fn with_metrics(mut self, metrics: WebhookMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.recipient.target
    }

    /// Deliver `content` to the recipient
    pub async fn send(&self, content: &NotificationContent) -> NotifyResult<()> {
        info!("Sending report notification via webhook...");

        let result = match self.deliver(content).await {
            Ok(payload) => {
                info!(
                    "Report sent via webhook (\"{}\") with payload: \"{}\"",
                    self.endpoint(),
                    payload
                );
                Ok(())
            }
            Err(err) => {
                error!("Error when sending report via webhook: {}", err);
                Err(err)
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.observe(if result.is_ok() {
                SendOutcome::Success
            } else {
                SendOutcome::Failure
            });
        }
        result
    }

    async fn deliver(&self, content: &NotificationContent) -> NotifyResult<String> {
        let endpoint = self.endpoint();
        let payload = WebhookPayload::new(content, Utc::now().timestamp_millis());
        let headers = to_header_map(&self.headers.resolve(endpoint))?;

        self.client
            .post(endpoint)
            .headers(headers)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        serde_json::to_string(&payload)
            .map_err(|e| NotificationError::Unprocessable(e.to_string()))
    }
}

fn to_header_map(headers: &Headers) -> NotifyResult<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            NotificationError::Unprocessable(format!("Invalid header name '{}': {}", name, e))
        })?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            NotificationError::Unprocessable(format!("Invalid value for header '{}': {}", name, e))
        })?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::Registry;
    use serde_json::{Value, json};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn content() -> NotificationContent {
        NotificationContent {
            name: "Weekly sales".to_string(),
            description: Some("Sales by region".to_string()),
            url: Some("https://bi.example.com/dashboard/7".to_string()),
            text: Some("Revenue is up 4%".to_string()),
        }
    }

    fn recipient(server: &MockServer) -> RecipientConfig {
        RecipientConfig {
            target: format!("{}/hook", server.uri()),
        }
    }

    #[test]
    fn test_recipient_from_json() {
        let config = RecipientConfig::from_json(r#"{"target": "https://hooks.example/x"}"#).unwrap();
        assert_eq!(config.target, "https://hooks.example/x");
    }

    #[test]
    fn test_recipient_from_json_missing_target() {
        let result = RecipientConfig::from_json(r#"{"url": "https://hooks.example/x"}"#);
        match result {
            Err(NotificationError::Unprocessable(msg)) => assert!(msg.contains("recipient")),
            other => panic!("Expected Unprocessable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_posts_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_partial_json(json!({
                "name": "Weekly sales",
                "description": "Sales by region",
                "url": "https://bi.example.com/dashboard/7",
                "text": "Revenue is up 4%"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let before = Utc::now().timestamp_millis();
        let notifier = WebhookNotifier::new(recipient(&server), HeaderProvider::default()).unwrap();
        notifier.send(&content()).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        let time = body["time"].as_i64().unwrap();
        assert!(time >= before);
    }

    #[tokio::test]
    async fn test_send_missing_fields_are_null() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(recipient(&server), HeaderProvider::default()).unwrap();
        let minimal = NotificationContent {
            name: "Alert".to_string(),
            ..Default::default()
        };
        notifier.send(&minimal).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let body: Value = requests[0].body_json().unwrap();
        assert_eq!(body["name"], "Alert");
        assert!(body["text"].is_null());
    }

    #[tokio::test]
    async fn test_send_with_static_headers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Webhook-Token", "s3cret"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(
            recipient(&server),
            HeaderProvider::fixed([("X-Webhook-Token", "s3cret")]),
        )
        .unwrap();
        notifier.send(&content()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_with_dynamic_headers() {
        let server = MockServer::start().await;
        let expected_endpoint = format!("{}/hook", server.uri());
        Mock::given(method("POST"))
            .and(header("X-Endpoint", expected_endpoint.as_str()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let headers = HeaderProvider::dynamic(|endpoint| {
            Headers::from([("X-Endpoint".to_string(), endpoint.to_string())])
        });
        let notifier = WebhookNotifier::new(recipient(&server), headers).unwrap();
        notifier.send(&content()).await.unwrap();
    }

    #[tokio::test]
    async fn test_send_error_status_is_unprocessable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(recipient(&server), HeaderProvider::default()).unwrap();
        match notifier.send(&content()).await {
            Err(NotificationError::Unprocessable(msg)) => assert!(msg.contains("500")),
            other => panic!("Expected Unprocessable, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_unreachable_endpoint() {
        let notifier = WebhookNotifier::new(
            RecipientConfig {
                target: "http://127.0.0.1:1/hook".to_string(),
            },
            HeaderProvider::default(),
        )
        .unwrap();
        assert!(matches!(
            notifier.send(&content()).await,
            Err(NotificationError::Unprocessable(_))
        ));
    }

    #[tokio::test]
    async fn test_send_invalid_header_name() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let notifier = WebhookNotifier::new(
            recipient(&server),
            HeaderProvider::fixed([("Bad Header", "x")]),
        )
        .unwrap();
        match notifier.send(&content()).await {
            Err(NotificationError::Unprocessable(msg)) => assert!(msg.contains("Bad Header")),
            other => panic!("Expected Unprocessable, got {:?}", other),
        }
    }

    #[test]
    fn test_from_recipient_json() {
        let notifier = WebhookNotifier::from_recipient_json(
            r#"{"target": "https://hooks.example/reports"}"#,
            HeaderProvider::default(),
        )
        .unwrap();
        assert_eq!(notifier.endpoint(), "https://hooks.example/reports");
        assert!(
            WebhookNotifier::from_recipient_json("not json", HeaderProvider::default()).is_err()
        );
    }

    #[tokio::test]
    async fn test_send_counts_outcomes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/broken"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let registry = Registry::new();
        let metrics = WebhookMetrics::register(&registry).unwrap();
        let ok = WebhookNotifier::new(recipient(&server), HeaderProvider::default())
            .unwrap()
            .with_metrics(metrics.clone());
        let broken = WebhookNotifier::new(
            RecipientConfig {
                target: format!("{}/broken", server.uri()),
            },
            HeaderProvider::default(),
        )
        .unwrap()
        .with_metrics(metrics.clone());

        ok.send(&content()).await.unwrap();
        ok.send(&content()).await.unwrap();
        assert!(broken.send(&content()).await.is_err());

        assert_eq!(metrics.sends(SendOutcome::Success), 2);
        assert_eq!(metrics.sends(SendOutcome::Failure), 1);
    }

    #[tokio::test]
    async fn test_invalid_headers_count_as_failure() {
        let registry = Registry::new();
        let metrics = WebhookMetrics::register(&registry).unwrap();
        let notifier = WebhookNotifier::new(
            RecipientConfig {
                target: "http://127.0.0.1:1/hook".to_string(),
            },
            HeaderProvider::fixed([("Bad Header", "x")]),
        )
        .unwrap()
        .with_metrics(metrics.clone());

        assert!(notifier.send(&content()).await.is_err());
        assert_eq!(metrics.sends(SendOutcome::Failure), 1);
        assert_eq!(metrics.sends(SendOutcome::Success), 0);
    }
}
