//! Cooperative cancellation

use crate::error::{OutputError, OutputResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cancellation flag shared between the caller and a running task.
///
/// Clones share the flag. The generator polls it between stages.
#[derive(Debug, Clone, Default)]
pub struct TaskStatus {
    cancelled: Arc<AtomicBool>,
}

impl TaskStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// `Err(OutputError::Cancelled)` once [`TaskStatus::cancel`] was called.
    pub fn throw_if_cancelled(&self) -> OutputResult<()> {
        if self.is_cancelled() {
            return Err(OutputError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_is_shared() {
        let status = TaskStatus::new();
        let handle = status.clone();
        assert!(status.throw_if_cancelled().is_ok());
        handle.cancel();
        assert!(status.is_cancelled());
        assert!(matches!(status.throw_if_cancelled(), Err(OutputError::Cancelled)));
    }
}
