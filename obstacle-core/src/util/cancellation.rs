use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::error::{ObstacleError, Result};

/// Shared flag for cooperative cancellation of a long-running extraction
///
/// Clones of a token share the same flag. Algorithms check the flag between units of work (clusters,
/// tiles) and stop with `ObstacleError::Cancelled` once it is set.
/// ```
/// # use obstacle_core::util::CancellationToken;
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(token.check().is_ok());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check().is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of all work observing this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Returns `Err(ObstacleError::Cancelled)` if cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ObstacleError::Cancelled)
        } else {
            Ok(())
        }
    }
}
