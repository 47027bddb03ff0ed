//! The single user-visible error channel for board mutations.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// A dismissible message shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notice {
    pub id: Uuid,
    pub severity: Severity,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub dismissed: bool,
}

impl Notice {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            title: title.into(),
            message: message.into(),
            timestamp: Utc::now(),
            dismissed: false,
        }
    }
}

struct Inner {
    notices: VecDeque<Notice>,
    capacity: usize,
    subscribers: Vec<flume::Sender<Notice>>,
}

/// Bounded notice history plus broadcast to subscribers. Cheap to clone.
#[derive(Clone)]
pub struct NoticeBoard {
    inner: Arc<Mutex<Inner>>,
}

impl NoticeBoard {
    /// Keep at most `capacity` notices; the oldest are dropped first.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                notices: VecDeque::new(),
                capacity: capacity.max(1),
                subscribers: Vec::new(),
            })),
        }
    }

    /// Receive every notice published from now on.
    pub fn subscribe(&self) -> flume::Receiver<Notice> {
        let (tx, rx) = flume::unbounded();
        let mut inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        inner.subscribers.push(tx);
        rx
    }

    /// Publish a notice. Disconnected subscribers are pruned.
    pub fn push(&self, notice: Notice) -> Uuid {
        let id = notice.id;
        let mut inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        inner.subscribers.retain(|tx| tx.send(notice.clone()).is_ok());
        inner.notices.push_back(notice);
        while inner.notices.len() > inner.capacity {
            inner.notices.pop_front();
        }
        id
    }

    /// Publish an error notice for a failed backend call.
    pub fn error(&self, title: impl Into<String>, err: &ApiError) -> Uuid {
        self.push(Notice::new(Severity::Error, title, err.to_string()))
    }

    /// Notices that have not been dismissed, oldest first.
    pub fn active(&self) -> Vec<Notice> {
        let inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        inner.notices.iter().filter(|n| !n.dismissed).cloned().collect()
    }

    pub fn all(&self) -> Vec<Notice> {
        let inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        inner.notices.iter().cloned().collect()
    }

    /// Mark one notice dismissed. Returns `false` when the id is unknown.
    pub fn dismiss(&self, id: &Uuid) -> bool {
        let mut inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        match inner.notices.iter_mut().find(|n| n.id == *id) {
            Some(n) => {
                n.dismissed = true;
                true
            }
            None => false,
        }
    }

    pub fn dismiss_all(&self) {
        let mut inner = self.inner.lock().expect("NoticeBoard lock poisoned");
        for n in &mut inner.notices {
            n.dismissed = true;
        }
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(50)
    }
}
