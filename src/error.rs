//! Error types for link attachment and delivery processing.
//!
//! Attach-time failures are fatal to the link: the context never enters
//! `Ready` and the error maps to an AMQP condition on the detach.
//! Delivery-time failures are recovered locally with a `Rejected`
//! disposition and never close the link.

use thiserror::Error;

use crate::{engine::EngineError, session::SessionError};

/// Condition symbol carried on per-delivery `Rejected` outcomes.
pub const DELIVERY_FAILED_CONDITION: &str = "failed";

/// Failures while resolving a receiver link's target on attach.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LinkAttachError {
    /// A non-dynamic target carried no address.
    #[error("target address not set on non-dynamic link")]
    TargetAddressNotSet,

    /// The queue query answered cleanly that no queue is bound.
    #[error("address {0} does not exist")]
    AddressDoesNotExist(String),

    /// The queue query itself failed.
    #[error("error finding queue {address}: {source}")]
    QueueLookup {
        /// Address whose lookup failed.
        address: String,
        /// Underlying broker failure.
        source: SessionError,
    },

    /// Any other initialisation failure, notably temporary-queue creation.
    #[error("internal error: {0}")]
    Internal(#[source] SessionError),
}

impl LinkAttachError {
    /// AMQP condition symbol surfaced to the peer on attach failure.
    #[must_use]
    pub fn condition(&self) -> &'static str {
        match self {
            Self::TargetAddressNotSet => "amqp:invalid-field",
            Self::AddressDoesNotExist(_) => "amqp:not-found",
            Self::QueueLookup { .. } | Self::Internal(_) => "amqp:internal-error",
        }
    }
}

/// Failures while reassembling or dispatching one delivery.
///
/// The display string becomes the description on the `Rejected`
/// outcome, mirroring how the broker reports undifferentiated internal
/// failures to the peer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DeliveryError {
    /// The engine failed while reading transfer bytes.
    #[error("{0}")]
    Engine(#[from] EngineError),

    /// The broker refused or failed the message hand-off.
    #[error("{0}")]
    Send(#[from] SessionError),

    /// The link attached without a target, so dispatch has no address.
    #[error("link has no resolved target address")]
    NoAddress,
}
