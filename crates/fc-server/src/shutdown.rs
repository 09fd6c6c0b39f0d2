use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long in-flight requests may run once shutdown starts.
pub const GRACE_PERIOD: Duration = Duration::from_secs(1);

/// Lifecycle of a resolution server.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServerState {
    Serving,
    ShuttingDown,
    Stopped,
}

impl ServerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => Self::Serving,
            1 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }
}

/// Cloneable handle that stops a running server.
#[derive(Clone, Debug)]
pub struct ShutdownHandle {
    state: Arc<AtomicU8>,
    server: axum_server::Handle,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(0)),
            server: axum_server::Handle::new(),
        }
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Begin a graceful shutdown. Returns `false` if one was already under way.
    pub fn trigger(&self) -> bool {
        if self
            .state
            .compare_exchange(0, 1, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        tracing::info!("shutting down");
        self.server.graceful_shutdown(Some(GRACE_PERIOD));
        true
    }

    pub(crate) fn mark_stopped(&self) {
        self.state.store(2, Ordering::Release);
    }

    pub(crate) fn server_handle(&self) -> axum_server::Handle {
        self.server.clone()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}
