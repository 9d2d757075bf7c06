//! Toast notifications queued for the UI host.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use std::collections::VecDeque;

use uuid::Uuid;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Error => "Error",
            Self::Info => "Notification",
        }
    }
}

/// Button attached to a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    Retry,
}

impl NotifyAction {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Retry => "Try again",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub action: Option<NotifyAction>,
}

impl Notification {
    #[must_use]
    pub fn title(&self) -> &'static str {
        self.kind.title()
    }
}

/// Bounded FIFO of pending notifications. When full, the oldest is dropped.
#[derive(Debug)]
pub struct Notifier {
    queue: VecDeque<Notification>,
    capacity: usize,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { queue: VecDeque::with_capacity(capacity), capacity }
    }

    /// Queue a notification. Errors carry a retry action.
    pub fn push(&mut self, kind: NotificationKind, message: impl Into<String>) -> Uuid {
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        let id = Uuid::new_v4();
        let action = (kind == NotificationKind::Error).then_some(NotifyAction::Retry);
        self.queue.push_back(Notification { id, kind, message: message.into(), action });
        id
    }

    pub fn success(&mut self, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Success, message)
    }

    pub fn error(&mut self, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Error, message)
    }

    pub fn info(&mut self, message: impl Into<String>) -> Uuid {
        self.push(NotificationKind::Info, message)
    }

    /// Take every pending notification, oldest first.
    pub fn drain(&mut self) -> Vec<Notification> {
        self.queue.drain(..).collect()
    }

    /// Most recent notification, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Notification> {
        self.queue.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
