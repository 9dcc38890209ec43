//! Server-side receiver context for one inbound AMQP 1.0 link.
//!
//! The context reacts to three engine events. Attach completion runs
//! [`ServerReceiverContext::initialise`], which resolves the target
//! (creating a session-scoped node for dynamic targets) and issues
//! initial credit. Peer flow frames land in
//! [`ServerReceiverContext::on_flow`]. Each transfer notification lands
//! in [`ServerReceiverContext::on_delivery`], which reassembles the
//! delivery across fragments, hands the complete payload to the broker
//! session, and replenishes credit.
//!
//! All entry points run on the connection's event loop; engine-touching
//! regions hold the connection lock so links sharing a connection
//! serialise their engine mutations.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    buffer::{BufferPool, PooledBuffer},
    connection::ConnectionHandle,
    credit::{CreditConfig, CreditController},
    delivery::{DeliveryProgress, read_delivery},
    engine::{DeliveryHandle, DeliveryOutcome, ErrorCondition, ReceiverLink},
    error::{DELIVERY_FAILED_CONDITION, DeliveryError, LinkAttachError},
    link::{LinkState, ReceiverLinkState},
    metrics,
    session::SessionCallback,
};

/// Receiving endpoint of one inbound link.
///
/// Owns the engine receiver handle supplied by the embedder and borrows
/// upward: the session callback and connection handle are shared with
/// the structures that own this context.
pub struct ServerReceiverContext<R> {
    receiver: R,
    session: Arc<dyn SessionCallback>,
    connection: ConnectionHandle,
    link: ReceiverLinkState,
    credit: CreditController,
    pool: BufferPool,
    pending: Option<PooledBuffer>,
}

impl<R: ReceiverLink> ServerReceiverContext<R> {
    /// Create a context for a link the peer just attached.
    #[must_use]
    pub fn new(
        receiver: R,
        session: Arc<dyn SessionCallback>,
        connection: ConnectionHandle,
        config: CreditConfig,
    ) -> Self {
        Self {
            receiver,
            session,
            connection,
            link: ReceiverLinkState::default(),
            credit: CreditController::new(config),
            pool: BufferPool::default(),
            pending: None,
        }
    }

    /// Use a caller-supplied buffer pool instead of a private one.
    ///
    /// Links on one connection typically share a pool so reassembly
    /// capacity is recycled across links.
    #[must_use]
    pub fn with_buffer_pool(mut self, pool: BufferPool) -> Self {
        self.pool = pool;
        self
    }

    /// Engine receiver handle this context drives.
    #[must_use]
    pub fn receiver(&self) -> &R { &self.receiver }

    /// Mutable access to the engine receiver handle.
    pub fn receiver_mut(&mut self) -> &mut R { &mut self.receiver }

    /// Resolved destination address, if initialisation resolved one.
    #[must_use]
    pub fn address(&self) -> Option<&str> { self.link.address() }

    /// Whether the address names a server-generated node.
    #[must_use]
    pub fn is_dynamic(&self) -> bool { self.link.is_dynamic() }

    /// Lifecycle state of the link.
    #[must_use]
    pub fn state(&self) -> LinkState { self.link.state() }

    /// Credit the peer currently holds.
    #[must_use]
    pub fn credit_issued(&self) -> u32 { self.credit.issued() }

    /// Resolve the remote target and issue initial credit.
    ///
    /// A dynamic target gets a fresh session-scoped node whose name is
    /// written back into the target so the peer observes the chosen
    /// address. A named target must point at an existing queue. A link
    /// with no target at all skips resolution; dispatch then fails per
    /// delivery. On success the link is `Ready` holding `max_credit`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkAttachError`] when resolution fails; the attach
    /// cannot complete, the link never becomes `Ready` and no credit is
    /// issued.
    pub async fn initialise(&mut self) -> Result<(), LinkAttachError> {
        if let Some(target) = self.receiver.remote_target().cloned() {
            if target.dynamic {
                let address = self.session.temp_queue_name();
                self.session
                    .create_temporary_queue(&address)
                    .await
                    .map_err(LinkAttachError::Internal)?;
                self.receiver.set_target_address(&address);
                debug!(address = %address, "created dynamic node for receiver link");
                self.link.set_address(address, true);
            } else {
                let Some(address) = target.address else {
                    return Err(LinkAttachError::TargetAddressNotSet);
                };
                match self.session.queue_query(&address).await {
                    Ok(true) => {}
                    Ok(false) => return Err(LinkAttachError::AddressDoesNotExist(address)),
                    Err(source) => return Err(LinkAttachError::QueueLookup { address, source }),
                }
                self.link.set_address(address, false);
            }
        }

        {
            let _guard = self.connection.lock().await;
            self.credit.replenish(&mut self.receiver);
        }
        self.link.mark_ready();
        debug!(
            address = self.link.address().unwrap_or(""),
            dynamic = self.link.is_dynamic(),
            credit = self.credit.issued(),
            "receiver link ready"
        );
        Ok(())
    }

    /// Handle a flow frame from the peer.
    ///
    /// Grants `min(requested, max_credit)` tracked against the peer's
    /// ceiling; drain is honoured by issuing the grant immediately and
    /// signalling drain to the engine. Ignored unless the link is
    /// `Ready`.
    pub async fn on_flow(&mut self, requested: u32, drain: bool) {
        if !self.link.is_ready() {
            return;
        }
        let _guard = self.connection.lock().await;
        let granted = self.credit.grant_requested(&mut self.receiver, requested, drain);
        debug!(requested, drain, granted, "processed peer flow");
    }

    /// Handle a transfer notification for `delivery`.
    ///
    /// May be invoked several times per delivery; fragments accumulate
    /// in a pooled buffer parked on the context between notifications.
    /// A complete delivery is advanced past, handed to the broker via
    /// `server_send` and followed by a credit top-up. Failures settle
    /// the delivery `Rejected` with condition `"failed"` and leave the
    /// link open for the next delivery.
    pub async fn on_delivery(&mut self, delivery: &mut dyn DeliveryHandle) {
        if !self.link.is_ready() {
            return;
        }
        if !delivery.is_readable() {
            // Normal mid-delivery state while the engine buffers the
            // next fragment; it re-invokes when bytes arrive.
            return;
        }

        let mut buffer = match self.pending.take() {
            Some(partial) => partial,
            None => self.pool.acquire(),
        };

        // Clones share one mutex; locking through a clone leaves `self`
        // free for `process_delivery`.
        let connection = self.connection.clone();
        let _guard = connection.lock().await;
        match self.process_delivery(&mut buffer, delivery).await {
            Ok(DeliveryProgress::Pending) => {
                self.pending = Some(buffer);
            }
            Ok(DeliveryProgress::Complete) => {
                metrics::inc_settled();
            }
            Err(error) => {
                warn!(%error, "delivery failed, rejecting");
                delivery.disposition(DeliveryOutcome::Rejected(ErrorCondition::new(
                    DELIVERY_FAILED_CONDITION,
                    error.to_string(),
                )));
                metrics::inc_rejected();
            }
        }
        // `buffer` returns to the pool here unless parked as pending.
    }

    /// Close the link on detach, session close or connection drop.
    ///
    /// Terminal; any in-flight reassembly buffer is released. A dynamic
    /// node is destroyed by the session owner when the session ends,
    /// not here.
    pub fn close(&mut self) {
        self.link.mark_closed();
        self.pending = None;
        debug!(address = self.link.address().unwrap_or(""), "receiver link closed");
    }

    async fn process_delivery(
        &mut self,
        buffer: &mut PooledBuffer,
        delivery: &mut dyn DeliveryHandle,
    ) -> Result<DeliveryProgress, DeliveryError> {
        match read_delivery(&mut self.receiver, buffer)? {
            DeliveryProgress::Pending => Ok(DeliveryProgress::Pending),
            DeliveryProgress::Complete => {
                self.receiver.advance();
                self.credit.consume();

                let address = self
                    .link
                    .address()
                    .ok_or(DeliveryError::NoAddress)?
                    .to_owned();
                let message_format = delivery.message_format();
                self.session
                    .server_send(
                        &mut self.receiver,
                        delivery,
                        &address,
                        message_format,
                        buffer.as_ref(),
                    )
                    .await?;

                if self.credit.replenish(&mut self.receiver) > 0 {
                    metrics::inc_credit_topups();
                }
                Ok(DeliveryProgress::Complete)
            }
        }
    }
}
