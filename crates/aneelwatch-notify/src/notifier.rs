use aneelwatch_core::summary::{render_body, render_subject};
use aneelwatch_core::{RelevancePolicy, RunResult};
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{info, warn};

use crate::MailError;

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub subject: String,
    pub body: String,
    pub recipient: String,
}

/// Mail transport collaborator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> Result<(), MailError>;
}

/// What happened to a run's notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    /// Nothing found and empty-run notices are turned off.
    SkippedEmpty,
    /// No mail transport configured.
    NotConfigured,
    Failed(String),
}

struct Route {
    mailer: Box<dyn Mailer>,
    recipient: String,
}

/// Formats a [`RunResult`] and sends it, swallowing any delivery failure.
pub struct Notifier {
    route: Option<Route>,
    send_when_empty: bool,
    policy: RelevancePolicy,
}

impl Notifier {
    pub fn new(mailer: Box<dyn Mailer>, recipient: impl Into<String>) -> Self {
        Self {
            route: Some(Route {
                mailer,
                recipient: recipient.into(),
            }),
            send_when_empty: true,
            policy: RelevancePolicy::default(),
        }
    }

    /// A notifier with no transport; every call is a no-op.
    pub fn disabled() -> Self {
        Self {
            route: None,
            send_when_empty: true,
            policy: RelevancePolicy::default(),
        }
    }

    /// Whether a run with zero documents still sends a "no documents" notice.
    pub fn send_when_empty(mut self, send: bool) -> Self {
        self.send_when_empty = send;
        self
    }

    pub fn with_policy(mut self, policy: RelevancePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build the message for `result` without sending it.
    pub fn compose(&self, result: &RunResult, search_date: NaiveDate, recipient: &str) -> MailMessage {
        MailMessage {
            subject: render_subject(result, search_date),
            body: render_body(result, search_date, &self.policy),
            recipient: recipient.to_string(),
        }
    }

    pub async fn notify(&self, result: &RunResult, search_date: NaiveDate) -> Delivery {
        let Some(route) = &self.route else {
            info!("mail not configured; skipping notification");
            return Delivery::NotConfigured;
        };
        if result.is_empty() && !self.send_when_empty {
            info!("no documents and empty notices disabled; skipping notification");
            return Delivery::SkippedEmpty;
        }

        let message = self.compose(result, search_date, &route.recipient);
        match route.mailer.send(&message).await {
            Ok(()) => {
                info!(total = result.total_documents, "notification sent");
                Delivery::Sent
            }
            Err(e) => {
                warn!(error = %e, "notification failed; run continues");
                Delivery::Failed(e.to_string())
            }
        }
    }
}
