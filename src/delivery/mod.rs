//! Assignment delivery.
//!
//! Once a round is confirmed, every group gets one message. The engine has
//! no knowledge of delivery; sinks resolve participant ids to whatever the
//! receiving side understands. Per-group failures are collected and
//! reported, never short-circuited, so one unreachable group does not
//! strand the rest of the round.

pub mod webhook;

use async_trait::async_trait;
use thiserror::Error;

use crate::core::{Assignment, Group};

pub use webhook::{WebhookConfig, WebhookSink};

/// Default message attached to a delivered group
pub const DEFAULT_MESSAGE: &str = "Say hi to your new pairing buddies!";

#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("invalid sink configuration: {0}")]
    InvalidConfig(String),

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery rejected: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// A destination for one message per group
#[async_trait]
pub trait DeliverySink {
    fn name(&self) -> &str;

    async fn deliver(&self, group: &Group, message: &str) -> Result<(), DeliveryError>;
}

/// One group that could not be delivered, with the reason
#[derive(Debug)]
pub struct DeliveryFailure {
    pub group: Group,
    pub reason: String,
}

/// Outcome of delivering a whole assignment
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failures: Vec<DeliveryFailure>,
}

impl DeliveryReport {
    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Send one message per group, collecting per-group failures
pub async fn deliver_assignment<S: DeliverySink + ?Sized>(
    sink: &S,
    assignment: &Assignment,
    message: &str,
) -> DeliveryReport {
    let mut report = DeliveryReport::default();
    for group in &assignment.groups {
        match sink.deliver(group, message).await {
            Ok(()) => {
                tracing::info!(sink = sink.name(), %group, "group delivered");
                report.delivered += 1;
            }
            Err(err) => {
                tracing::error!(sink = sink.name(), %group, %err, "group delivery failed");
                report.failures.push(DeliveryFailure {
                    group: group.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }
    report
}

/// Prints each group to stdout; the no-network default for CLI use
#[derive(Debug, Default)]
pub struct ConsoleSink;

#[async_trait]
impl DeliverySink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    async fn deliver(&self, group: &Group, message: &str) -> Result<(), DeliveryError> {
        println!("{group}: {message}");
        Ok(())
    }
}
