//! Connection handle shared by the link contexts on one connection.
//!
//! The protocol engine's internal state is shared across every link on
//! a connection, so engine mutations (advancing deliveries, sending
//! flows, posting dispositions) happen while holding the connection
//! lock. Contexts on separate connections hold separate locks and
//! proceed in parallel; contexts sharing a connection serialise.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

/// Clonable handle to the lock guarding one connection's engine state.
#[derive(Clone, Debug, Default)]
pub struct ConnectionHandle {
    lock: Arc<Mutex<()>>,
}

impl ConnectionHandle {
    /// Create the handle for a freshly accepted connection.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Acquire the connection lock for an engine-touching region.
    pub async fn lock(&self) -> MutexGuard<'_, ()> { self.lock.lock().await }
}
