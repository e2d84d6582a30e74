//! Transient toast notifications.
//!
//! One slot, last write wins. A new notification replaces whatever is showing
//! and dismissal is measured from the new notification's own creation
//! instant, so a superseded toast can never take its successor down with it.

use std::time::{Duration, Instant};

/// How long a notification stays on screen.
pub const DISMISS_AFTER: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub created_at: Instant,
}

#[derive(Default)]
pub struct NotificationCenter {
    current: Option<Notification>,
}

impl NotificationCenter {
    /// Show a notification, replacing any visible one.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.current = Some(Notification {
            message: message.into(),
            severity,
            created_at: Instant::now(),
        });
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }

    /// Drop the current notification once it has been visible long enough.
    pub fn tick(&mut self, now: Instant) {
        if let Some(notification) = &self.current {
            if now.duration_since(notification.created_at) >= DISMISS_AFTER {
                self.current = None;
            }
        }
    }

    /// When the current notification should be dismissed, for repaint
    /// scheduling.
    pub fn deadline(&self) -> Option<Instant> {
        self.current
            .as_ref()
            .map(|n| n.created_at + DISMISS_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_replaces_current() {
        let mut center = NotificationCenter::default();
        center.show("first", Severity::Info);
        center.show("second", Severity::Error);

        let current = center.current().expect("notification visible");
        assert_eq!(current.message, "second");
        assert_eq!(current.severity, Severity::Error);
    }

    #[test]
    fn test_tick_dismisses_after_deadline() {
        let mut center = NotificationCenter::default();
        center.show("done", Severity::Success);
        let created = center.current().unwrap().created_at;

        center.tick(created + Duration::from_secs(3));
        assert!(center.current().is_some());

        center.tick(created + DISMISS_AFTER);
        assert!(center.current().is_none());
    }

    #[test]
    fn test_superseding_resets_the_dismissal_clock() {
        let mut center = NotificationCenter::default();
        center.show("first", Severity::Info);
        let first_created = center.current().unwrap().created_at;

        std::thread::sleep(Duration::from_millis(20));
        center.show("second", Severity::Info);
        let second_created = center.current().unwrap().created_at;
        assert!(second_created > first_created);

        // The first notification's deadline passes; the second survives it.
        center.tick(first_created + DISMISS_AFTER);
        let current = center.current().expect("second notification still visible");
        assert_eq!(current.message, "second");

        center.tick(second_created + DISMISS_AFTER);
        assert!(center.current().is_none());
    }
}
