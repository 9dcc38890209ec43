//! Broker-facing session callback interface.
//!
//! The receiver context trusts the session callback for every
//! broker-side decision: temporary-node naming and creation, queue
//! existence, and message ingestion. `server_send` owns durable
//! persistence and settlement of successful deliveries; the context
//! only settles failures.

use async_trait::async_trait;
use thiserror::Error;

use crate::engine::{DeliveryHandle, ReceiverLink};

/// Failure reported by a broker session callback.
///
/// The message becomes the description of the `Rejected` outcome when a
/// delivery-path callback fails, so it should be peer-presentable.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct SessionError {
    message: String,
}

impl SessionError {
    /// Wrap a broker-side failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The broker-side failure message.
    #[must_use]
    pub fn message(&self) -> &str { &self.message }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for SessionError {
    fn from(error: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::new(error.to_string())
    }
}

/// Broker session operations consumed by the receiver context.
///
/// Implementations may complete synchronously on the connection's event
/// loop or suspend; either way, credit replenishment and settlement are
/// issued on the event loop after `server_send` resolves.
#[async_trait]
pub trait SessionCallback: Send + Sync {
    /// Generate a unique temporary queue name.
    fn temp_queue_name(&self) -> String;

    /// Register a queue whose lifetime is bound to the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the broker cannot create the node.
    async fn create_temporary_queue(&self, name: &str) -> Result<(), SessionError>;

    /// Whether a queue bound to `address` exists.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when the lookup itself fails, as
    /// distinct from a clean negative answer.
    async fn queue_query(&self, address: &str) -> Result<bool, SessionError>;

    /// Hand an assembled message to the broker.
    ///
    /// The callback settles the delivery (accept, release, modify or
    /// reject) on success; a returned error leaves settlement to the
    /// context, which rejects the delivery.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError`] when ingestion fails.
    async fn server_send(
        &self,
        receiver: &mut dyn ReceiverLink,
        delivery: &mut dyn DeliveryHandle,
        address: &str,
        message_format: u32,
        payload: &[u8],
    ) -> Result<(), SessionError>;
}
