//! Consumed interface of the AMQP protocol engine.
//!
//! The receiver context never owns the wire codec or the transport; it
//! drives an engine-supplied link handle through these traits. Embedders
//! implement [`ReceiverLink`] and [`DeliveryHandle`] over their engine's
//! receiver and delivery objects, and the context performs all engine
//! mutations while holding the connection lock.

use bytes::BytesMut;
use thiserror::Error;

/// Target terminus carried on an attach frame.
///
/// A `dynamic` target asks the server to create a fresh, session-scoped
/// destination node and write the chosen address back so the peer can
/// observe it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TerminusTarget {
    /// Destination address, if the peer supplied one.
    pub address: Option<String>,
    /// Whether the peer requested a server-generated node.
    pub dynamic: bool,
}

impl TerminusTarget {
    /// Target naming an existing destination.
    #[must_use]
    pub fn named(address: impl Into<String>) -> Self {
        Self {
            address: Some(address.into()),
            dynamic: false,
        }
    }

    /// Target requesting a server-generated node.
    #[must_use]
    pub fn dynamic() -> Self {
        Self {
            address: None,
            dynamic: true,
        }
    }
}

/// Result of a single [`ReceiverLink::recv`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecvStatus {
    /// Bytes were appended to the buffer; more may be available now.
    Read(usize),
    /// No further bytes are buffered yet; the delivery is incomplete.
    Pending,
    /// The current delivery has been read in full.
    Complete,
}

/// Errors reported by the protocol engine while reading a delivery.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EngineError {
    /// The underlying transport failed mid-read.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
    /// The link detached while a read was in progress.
    #[error("link is no longer attached")]
    Detached,
}

/// AMQP error condition attached to a negative outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorCondition {
    /// Condition symbol, e.g. `"failed"` or `"amqp:not-found"`.
    pub condition: String,
    /// Free-form description of the failure.
    pub description: Option<String>,
}

impl ErrorCondition {
    /// Build a condition with a description.
    #[must_use]
    pub fn new(condition: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            condition: condition.into(),
            description: Some(description.into()),
        }
    }
}

/// Settlement outcome applied to a delivery.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The delivery was accepted by the broker.
    Accepted,
    /// The delivery was rejected with an error condition.
    Rejected(ErrorCondition),
    /// The delivery was released back to the sender.
    Released,
    /// The delivery was modified before release.
    Modified {
        /// Whether the delivery counts as a failed attempt.
        delivery_failed: bool,
        /// Whether the sender should avoid redelivering here.
        undeliverable_here: bool,
    },
}

/// Engine receiver object for one inbound link.
///
/// `recv` appends whatever bytes the engine has buffered for the current
/// delivery; it never moves the link cursor. The caller advances with
/// [`ReceiverLink::advance`] once a delivery is complete.
pub trait ReceiverLink: Send {
    /// Remote target carried on the attach, if any.
    fn remote_target(&self) -> Option<&TerminusTarget>;

    /// Write the resolved address into the local target echoed to the
    /// peer on attach completion.
    fn set_target_address(&mut self, address: &str);

    /// Append currently-buffered bytes of the current delivery.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] when the engine cannot read the pending
    /// transfer bytes.
    fn recv(&mut self, buffer: &mut BytesMut) -> Result<RecvStatus, EngineError>;

    /// Advance the link cursor past the current delivery.
    fn advance(&mut self);

    /// Grant `credits` additional link credit and emit a flow frame.
    fn flow(&mut self, credits: u32);

    /// Mark the link's next flow state as draining.
    fn drain(&mut self);
}

/// Engine handle for one delivery on a link.
pub trait DeliveryHandle: Send {
    /// Whether payload bytes are buffered and ready to read.
    fn is_readable(&self) -> bool;

    /// The message-format code carried on the transfer.
    fn message_format(&self) -> u32;

    /// Apply a settlement outcome to the delivery.
    fn disposition(&mut self, outcome: DeliveryOutcome);
}
