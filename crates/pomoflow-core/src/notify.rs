//! User-visible alerts.
//!
//! The core decides *when* to alert; delivery belongs to a [`Notifier`].
//! Delivery is best-effort: failures are logged and never reach the timer.

use tracing::info;

use crate::error::Result;

/// An alert to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Displays alerts.
pub trait Notifier: Send {
    fn notify(&self, notification: &Notification) -> Result<()>;

    /// Play the completion sound.
    fn chime(&self) -> Result<()> {
        Ok(())
    }

    /// Withdraw anything still pending for the current run.
    fn cancel(&self) -> Result<()> {
        Ok(())
    }
}

/// Writes alerts to the log only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            title = %notification.title,
            body = %notification.body,
            "notification"
        );
        Ok(())
    }
}

/// Drops every alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}
