//! Liveness flag and the `/healthz` probe.
//!
//! | State | `/healthz` |
//! |---|---|
//! | serving | `204 No Content` |
//! | starting / draining | `503 Service Unavailable` |
//!
//! The flag starts false, flips true right before the accept loop starts and
//! back to false the moment a shutdown signal arrives. Load balancers see the
//! pod go unhealthy before the drain finishes.

use std::sync::atomic::{AtomicBool, Ordering};

use http::StatusCode;

/// Whether the server is accepting traffic.
#[derive(Debug, Default)]
pub struct Liveness {
    healthy: AtomicBool,
}

impl Liveness {
    /// A new flag, not yet healthy.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_serving(&self) {
        self.healthy.store(true, Ordering::Release);
    }

    pub fn mark_draining(&self) {
        self.healthy.store(false, Ordering::Release);
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    /// Probe response: `204` while healthy, `503` otherwise. No body.
    pub fn probe(&self) -> StatusCode {
        if self.is_healthy() {
            StatusCode::NO_CONTENT
        } else {
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
