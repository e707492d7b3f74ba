//! Count of running sessions, reported by `/health`.
//!
//! Sessions only ever increment on entry and decrement on exit through
//! [`SessionGuard`]; none of them reads the count.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use metrics::gauge;

use crate::metrics::WS_CONNECTIONS_ACTIVE;

/// Number of live stream sessions.
#[derive(Debug, Default)]
pub struct SessionTracker {
    active: AtomicUsize,
}

impl SessionTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session start. The session ends when the guard drops.
    pub fn enter(self: &Arc<Self>) -> SessionGuard {
        let _ = self.active.fetch_add(1, Ordering::Relaxed);
        gauge!(WS_CONNECTIONS_ACTIVE).increment(1.0);
        SessionGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Sessions currently running.
    pub fn active(&self) -> usize {
        self.active.load(Ordering::Relaxed)
    }
}

/// Decrements the tracker on drop.
#[derive(Debug)]
pub struct SessionGuard {
    tracker: Arc<SessionTracker>,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let _ = self.tracker.active.fetch_sub(1, Ordering::Relaxed);
        gauge!(WS_CONNECTIONS_ACTIVE).decrement(1.0);
    }
}
