//! Shutdown coordination for the host.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

/// The runtime substrate's "request stop" callback.
///
/// Non-blocking: it only signals the surrounding runtime to wind down.
pub trait ApplicationLifetime: Send + Sync {
    fn stop_application(&self);
}

/// Lifetime owned by the process entry point.
///
/// Hands out the stopping token that `execute` observes and records stop requests.
#[derive(Debug, Default)]
pub struct HostLifetime {
    stopping: CancellationToken,
    stop_requests: AtomicUsize,
}

impl HostLifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token cancelled once stop has been requested.
    pub fn stopping_token(&self) -> CancellationToken {
        self.stopping.clone()
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stopping.is_cancelled()
    }

    /// How many times stop was requested.
    pub fn stop_requests(&self) -> usize {
        self.stop_requests.load(Ordering::SeqCst)
    }
}

impl ApplicationLifetime for HostLifetime {
    fn stop_application(&self) {
        self.stop_requests.fetch_add(1, Ordering::SeqCst);
        self.stopping.cancel();
    }
}

/// One-shot guard so shutdown work runs exactly once.
#[derive(Debug, Default)]
pub struct ShutdownLatch {
    tripped: AtomicBool,
}

impl ShutdownLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the latch. Only the first caller gets `true`.
    pub fn trip(&self) -> bool {
        !self.tripped.swap(true, Ordering::SeqCst)
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }
}
