//! Prometheus metrics for webhook delivery
//!
//! Every [`WebhookNotifier::send`](crate::WebhookNotifier::send) bumps
//! `reports_webhook_send_total`, labelled with `outcome="success"` or
//! `outcome="failure"`. Notifiers report into the process-wide default
//! registry unless given their own [`WebhookMetrics`].

use crate::error::{NotificationError, NotifyResult};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::LazyLock;
use tracing::warn;

pub const SEND_COUNTER_NAME: &str = "reports_webhook_send_total";

static DEFAULT_METRICS: LazyLock<Option<WebhookMetrics>> = LazyLock::new(|| {
    WebhookMetrics::register(prometheus::default_registry())
        .map_err(|e| warn!("Webhook metrics disabled: {}", e))
        .ok()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    Failure,
}

impl SendOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendOutcome::Success => "success",
            SendOutcome::Failure => "failure",
        }
    }
}

/// Send counters registered in one registry
#[derive(Clone)]
pub struct WebhookMetrics {
    sends: IntCounterVec,
}

impl std::fmt::Debug for WebhookMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookMetrics")
            .field("success", &self.sends(SendOutcome::Success))
            .field("failure", &self.sends(SendOutcome::Failure))
            .finish()
    }
}

impl WebhookMetrics {
    /// Create the counters and register them in `registry`
    pub fn register(registry: &Registry) -> NotifyResult<Self> {
        let sends = IntCounterVec::new(
            Opts::new(SEND_COUNTER_NAME, "Report notifications sent via webhook"),
            &["outcome"],
        )
        .map_err(metrics_error)?;
        registry
            .register(Box::new(sends.clone()))
            .map_err(metrics_error)?;
        Ok(Self { sends })
    }

    /// Metrics in the default registry, `None` if they could not be registered
    pub fn global() -> Option<Self> {
        DEFAULT_METRICS.clone()
    }

    pub fn observe(&self, outcome: SendOutcome) {
        self.sends.with_label_values(&[outcome.as_str()]).inc();
    }

    /// Sends counted so far with this outcome
    pub fn sends(&self, outcome: SendOutcome) -> u64 {
        self.sends.with_label_values(&[outcome.as_str()]).get()
    }
}

/// Render `registry` in the Prometheus text exposition format
pub fn encode_text(registry: &Registry) -> NotifyResult<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .map_err(metrics_error)?;
    String::from_utf8(buffer).map_err(metrics_error)
}

fn metrics_error(err: impl std::fmt::Display) -> NotificationError {
    NotificationError::Unprocessable(format!("Metrics error: {}", err))
}
