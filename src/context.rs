use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::StorageError;

/// Execution context threaded through every driver call.
///
/// Carries cooperative cancellation and an optional deadline. Clones share the
/// same cancellation flag, so a caller can hand a clone to a walk and cancel
/// it from elsewhere.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancelled: Arc<AtomicBool>,
    deadline:  Option<Instant>,
}

impl Context {
    /// A context that never expires on its own.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that also expires `timeout` from now. Cancellation
    /// is still shared with `self`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`, keeping the earlier of
    /// the two deadlines if `self` already has one.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(d) => d.min(deadline),
            None    => deadline,
        };
        Self {
            cancelled: Arc::clone(&self.cancelled),
            deadline:  Some(deadline),
        }
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast if the context is done.
    ///
    /// Drivers call this before touching the backend; the walker calls it
    /// before every `list` and `stat`.
    pub fn check(&self) -> Result<(), StorageError> {
        if self.is_cancelled() {
            return Err(StorageError::Cancelled);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(StorageError::DeadlineExceeded);
            }
        }
        Ok(())
    }
}
