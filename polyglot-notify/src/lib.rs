//! Webhook notifications for scheduled reports
//!
//! ```ignore
//! use polyglot_notify::{HeaderProvider, NotificationContent, WebhookNotifier};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let headers = HeaderProvider::fixed([("X-Webhook-Token", "s3cret")]);
//!     let notifier = WebhookNotifier::from_recipient_json(
//!         r#"{"target": "https://hooks.example.com/reports"}"#,
//!         headers,
//!     )?;
//!
//!     notifier
//!         .send(&NotificationContent {
//!             name: "Weekly sales".to_string(),
//!             text: Some("Revenue is up 4%".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod headers;
pub mod metrics;
pub mod webhook;

pub use error::{NotificationError, NotifyResult};
pub use headers::{HeaderProvider, Headers};
pub use metrics::{SendOutcome, WebhookMetrics, encode_text};
pub use webhook::{NotificationContent, RecipientConfig, WebhookNotifier};
