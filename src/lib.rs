#![doc(html_root_url = "https://docs.rs/amqp-ingress/latest")]
//! Public API for the `amqp-ingress` library.
//!
//! This crate implements the server-side receiving endpoint of an AMQP
//! 1.0 link: credit accounting, multi-frame delivery reassembly, target
//! resolution (including dynamic-node creation) and the disposition
//! protocol that settles each delivery. The protocol engine and the
//! broker are consumed through the [`engine`] and [`session`] seams;
//! [`ServerReceiverContext`] orchestrates the three engine events
//! (attach completed, peer flow, delivery fragment arrived) on the
//! connection's event loop.

pub mod buffer;
pub mod connection;
pub mod credit;
pub mod delivery;
pub mod engine;
pub mod error;
pub mod link;
pub mod metrics;
pub mod receiver;
pub mod session;

pub use buffer::{BufferPool, DEFAULT_BUFFER_CAPACITY, PooledBuffer};
pub use connection::ConnectionHandle;
pub use credit::{CreditConfig, CreditController};
pub use delivery::{DeliveryProgress, read_delivery};
pub use engine::{
    DeliveryHandle,
    DeliveryOutcome,
    EngineError,
    ErrorCondition,
    ReceiverLink,
    RecvStatus,
    TerminusTarget,
};
pub use error::{DELIVERY_FAILED_CONDITION, DeliveryError, LinkAttachError};
pub use link::LinkState;
pub use receiver::ServerReceiverContext;
pub use session::{SessionCallback, SessionError};
