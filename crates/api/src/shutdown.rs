//! Cooperative cancellation of blocking backend calls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
struct ShutdownState {
    requested: AtomicBool,
    reason: Mutex<Option<String>>,
}

/// Owner side: request that running and future solver calls stop.
///
/// Cloning shares the same flag. Unlike sessions, the manager is `Send` and
/// `Sync`, so another thread (a timer, a signal handler) can trigger it.
#[derive(Debug, Clone, Default)]
pub struct ShutdownManager {
    state: Arc<ShutdownState>,
}

/// Observer side handed to provers.
#[derive(Debug, Clone)]
pub struct ShutdownNotifier {
    state: Arc<ShutdownState>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifier(&self) -> ShutdownNotifier {
        ShutdownNotifier {
            state: Arc::clone(&self.state),
        }
    }

    /// Request shutdown. The first reason wins.
    pub fn request_shutdown(&self, reason: impl Into<String>) {
        let reason = reason.into();
        if let Ok(mut slot) = self.state.reason.lock()
            && slot.is_none()
        {
            tracing::debug!(%reason, "shutdown requested");
            *slot = Some(reason);
        }
        self.state.requested.store(true, Ordering::SeqCst);
    }
}

impl ShutdownNotifier {
    /// A notifier that never fires.
    pub fn never() -> Self {
        ShutdownManager::new().notifier()
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.state.requested.load(Ordering::SeqCst)
    }

    pub fn reason(&self) -> Option<String> {
        self.state
            .reason
            .lock()
            .ok()
            .and_then(|slot| slot.clone())
    }

    /// `Err(Interrupted)` once shutdown has been requested.
    pub fn check(&self) -> ApiResult<()> {
        if self.is_shutdown_requested() {
            Err(ApiError::Interrupted(
                self.reason().unwrap_or_else(|| "shutdown requested".to_string()),
            ))
        } else {
            Ok(())
        }
    }
}
