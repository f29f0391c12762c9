//! The single user-visible message slot.
//!
//! Network, auth and workflow code post here; a front end subscribes to
//! the watch channel and draws whatever is current. Last write wins, and a
//! message clears itself after a fixed delay unless a newer one replaced it.

use core::sync::atomic::{AtomicU64, Ordering};
use core::time::Duration;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

/// Message severity, used by front ends for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// One message in the slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub text: String,
}

struct Inner {
    sender: watch::Sender<Option<Notification>>,
    generation: AtomicU64,
    clear_after: Duration,
}

/// Shared handle to the message slot. Cloning is cheap.
#[derive(Clone)]
pub struct MessageBoard {
    inner: Arc<Inner>,
}

impl MessageBoard {
    #[must_use]
    pub fn new(clear_after: Duration) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                sender,
                generation: AtomicU64::new(0),
                clear_after,
            }),
        }
    }

    /// Replaces the current message. Empty text clears the slot.
    ///
    /// The auto-clear timer needs a tokio runtime; outside one the message
    /// stays until replaced.
    pub fn post(&self, text: impl Into<String>, severity: Severity) {
        let text = text.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if text.is_empty() {
            self.inner.sender.send_replace(None);
            return;
        }

        debug!(%severity, text = %text, "Posting message");
        self.inner
            .sender
            .send_replace(Some(Notification { severity, text }));

        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        handle.spawn(async move {
            tokio::time::sleep(inner.clear_after).await;
            inner.sender.send_if_modified(|slot| {
                if inner.generation.load(Ordering::SeqCst) == generation && slot.is_some() {
                    *slot = None;
                    true
                } else {
                    false
                }
            });
        });
    }

    pub fn clear(&self) {
        self.post(String::new(), Severity::Info);
    }

    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.inner.sender.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.sender.subscribe()
    }
}

impl Default for MessageBoard {
    fn default() -> Self {
        Self::new(Duration::from_secs(config::DEFAULT_MESSAGE_CLEAR_SECS))
    }
}

/// Makes server-provided text safe to show: line breaks become single
/// spaces, angle brackets are HTML-escaped, surrounding whitespace trimmed.
#[must_use]
pub fn sanitize_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_break = false;
    for c in value.chars() {
        match c {
            '\r' | '\n' => {
                if !in_break {
                    out.push(' ');
                }
                in_break = true;
                continue;
            }
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            other => out.push(other),
        }
        in_break = false;
    }
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("line1\r\n\nline2"), "line1 line2");
        assert_eq!(sanitize_text("<b>bold</b>"), "&lt;b&gt;bold&lt;/b&gt;");
        assert_eq!(sanitize_text("  padded \n"), "padded");
        assert_eq!(sanitize_text(""), "");
    }

    #[test]
    fn test_post_without_runtime_keeps_message() {
        let board = MessageBoard::new(Duration::from_millis(1));
        board.post("Logged out", Severity::Success);
        assert_eq!(
            board.current(),
            Some(Notification {
                severity: Severity::Success,
                text: "Logged out".to_owned(),
            })
        );
        board.clear();
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_auto_clears_after_delay() {
        let board = MessageBoard::new(Duration::from_secs(20));
        board.post("Operation completed", Severity::Success);

        tokio::time::sleep(Duration::from_secs(19)).await;
        assert!(board.current().is_some());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_newer_message_survives_older_timer() {
        let board = MessageBoard::new(Duration::from_secs(20));
        board.post("first", Severity::Info);

        tokio::time::sleep(Duration::from_secs(15)).await;
        board.post("second", Severity::Error);

        // First timer fires here but must not wipe the newer message.
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(board.current().map(|n| n.text), Some("second".to_owned()));

        tokio::time::sleep(Duration::from_secs(11)).await;
        assert_eq!(board.current(), None);
    }

    #[tokio::test]
    async fn test_subscriber_sees_latest_message() {
        let board = MessageBoard::default();
        let mut receiver = board.subscribe();
        board.post("Please login first", Severity::Error);

        receiver.changed().await.unwrap();
        let seen = receiver.borrow_and_update().clone().unwrap();
        assert_eq!(seen.severity, Severity::Error);
        assert_eq!(seen.text, "Please login first");
    }
}
