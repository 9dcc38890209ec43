//! Delivery-buffer utility: accumulate transfer fragments.
//!
//! [`read_delivery`] drains every byte the engine currently holds for
//! the in-progress delivery into a growable buffer. A delivery may span
//! several transfer frames, so the utility is invoked once per engine
//! notification and reports whether the delivery completed or is still
//! [`DeliveryProgress::Pending`]. It never advances the link cursor;
//! the caller advances after a complete delivery.

use bytes::BytesMut;

use crate::engine::{EngineError, ReceiverLink, RecvStatus};

/// Reassembly progress after draining currently-available bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryProgress {
    /// More fragments are expected; bytes so far are in the buffer.
    Pending,
    /// The delivery is complete; the buffer holds the full payload.
    Complete,
}

/// Append all currently-available bytes of the current delivery.
///
/// # Errors
///
/// Propagates any [`EngineError`] from the link; the caller is expected
/// to release the buffer.
pub fn read_delivery<R>(
    receiver: &mut R,
    buffer: &mut BytesMut,
) -> Result<DeliveryProgress, EngineError>
where
    R: ReceiverLink + ?Sized,
{
    loop {
        match receiver.recv(buffer)? {
            RecvStatus::Read(_) => {}
            RecvStatus::Pending => return Ok(DeliveryProgress::Pending),
            RecvStatus::Complete => return Ok(DeliveryProgress::Complete),
        }
    }
}
