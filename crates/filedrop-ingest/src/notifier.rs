use std::sync::Mutex;

use filedrop_core::{RejectReason, Rejection};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A human-readable message for whoever is watching the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub kind: Option<RejectReason>,
    pub message: String,
}

impl Notice {
    pub fn added(count: usize) -> Self {
        let plural = if count == 1 { "" } else { "s" };
        Self {
            level: NoticeLevel::Success,
            kind: None,
            message: format!("Added {count} file{plural}"),
        }
    }

    pub fn rejected(rejection: &Rejection) -> Self {
        Self {
            level: NoticeLevel::Error,
            kind: Some(rejection.reason),
            message: rejection.message.clone(),
        }
    }
}

#[derive(Debug, Error)]
#[error("notify failed: {0}")]
pub struct NotifyError(pub String);

/// Side channel for user-facing messages (toast, log, callback).
///
/// Errors are logged by the caller and otherwise ignored.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError>;
}

/// Writes notices to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        match notice.level {
            NoticeLevel::Success => info!("{}", notice.message),
            NoticeLevel::Error => warn!(kind = ?notice.kind, "{}", notice.message),
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: &Notice) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Keeps every notice in memory, in delivery order.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }

    pub fn count_of(&self, kind: RejectReason) -> usize {
        self.notices()
            .iter()
            .filter(|n| n.kind == Some(kind))
            .count()
    }

    pub fn take(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|mut n| std::mem::take(&mut *n))
            .unwrap_or_default()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notice: &Notice) -> Result<(), NotifyError> {
        self.notices
            .lock()
            .map_err(|e| NotifyError(e.to_string()))?
            .push(notice.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_pluralizes() {
        assert_eq!(Notice::added(1).message, "Added 1 file");
        assert_eq!(Notice::added(3).message, "Added 3 files");
        assert_eq!(Notice::added(3).level, NoticeLevel::Success);
    }

    #[test]
    fn rejected_copies_reason_and_message() {
        let r = Rejection::read_failure("a.txt");
        let n = Notice::rejected(&r);
        assert_eq!(n.level, NoticeLevel::Error);
        assert_eq!(n.kind, Some(RejectReason::ReadFailure));
        assert_eq!(n.message, "Failed to read file: a.txt");
    }

    #[test]
    fn memory_notifier_collects_in_order() {
        let notifier = MemoryNotifier::new();
        notifier.notify(&Notice::added(1)).unwrap();
        notifier
            .notify(&Notice::rejected(&Rejection::batch_limit(20)))
            .unwrap();
        assert_eq!(notifier.count_of(RejectReason::BatchLimitExceeded), 1);
        let taken = notifier.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].level, NoticeLevel::Success);
        assert!(notifier.notices().is_empty());
    }
}
