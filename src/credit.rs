//! Link-credit accounting for a receiver link.
//!
//! The controller tracks the credit the peer currently holds and feeds
//! every grant through a single primitive, [`CreditController::flow`]:
//! do nothing while issued credit sits at or above the refresh
//! threshold, otherwise top the peer back up to the grant target and
//! emit one wire flow for the delta. The broker-driven path replenishes
//! with `flow(max_credit, min_credit_threshold)`; the peer-driven path
//! grants `flow(min(requested, max_credit), max_credit)`.

use tracing::debug;

use crate::engine::ReceiverLink;

/// Credit tuning carried per connection or session.
///
/// These were process-wide mutable statics in older brokers; keeping
/// them on the controller lets tests vary them without global state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CreditConfig {
    /// Ceiling on credit granted in a single replenishment.
    pub max_credit: u32,
    /// Issued-credit level at which the broker replenishes.
    pub min_credit_threshold: u32,
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            max_credit: 100,
            min_credit_threshold: 30,
        }
    }
}

/// Tracks issued credit and decides when to top up.
#[derive(Debug)]
pub struct CreditController {
    config: CreditConfig,
    issued: u32,
    draining: bool,
}

impl CreditController {
    /// Create a controller with no credit issued.
    #[must_use]
    pub fn new(config: CreditConfig) -> Self {
        Self {
            config,
            issued: 0,
            draining: false,
        }
    }

    /// Credit the peer currently holds.
    #[must_use]
    pub fn issued(&self) -> u32 { self.issued }

    /// Whether a peer-requested drain is in progress.
    #[must_use]
    pub fn is_draining(&self) -> bool { self.draining }

    /// Tuning parameters this controller was built with.
    #[must_use]
    pub fn config(&self) -> CreditConfig { self.config }

    /// Account for one completed delivery consuming one credit.
    ///
    /// Reaching zero outstanding credit ends any drain in progress.
    pub fn consume(&mut self) {
        self.issued = self.issued.saturating_sub(1);
        if self.issued == 0 {
            self.draining = false;
        }
    }

    /// Core grant primitive shared by both credit paths.
    ///
    /// Issues nothing while `issued >= refresh_at`; otherwise tops
    /// issued credit up to `grant` and sends one flow for the delta.
    /// Returns the credits placed on the wire (zero when no frame was
    /// sent).
    pub fn flow(&mut self, link: &mut dyn ReceiverLink, grant: u32, refresh_at: u32) -> u32 {
        if self.issued >= refresh_at {
            return 0;
        }
        let delta = grant.saturating_sub(self.issued);
        if delta == 0 {
            return 0;
        }
        self.issued += delta;
        link.flow(delta);
        debug!(granted = delta, issued = self.issued, "issued link credit");
        delta
    }

    /// Broker-driven replenishment toward `max_credit`.
    ///
    /// Suppressed while the peer is draining; the peer asked for the
    /// outstanding credit to run dry, not to be topped up.
    pub fn replenish(&mut self, link: &mut dyn ReceiverLink) -> u32 {
        if self.draining {
            return 0;
        }
        self.flow(link, self.config.max_credit, self.config.min_credit_threshold)
    }

    /// Peer-driven grant, capped at `max_credit`.
    ///
    /// When `drain` is asserted the granted credit is issued first and
    /// the drain flag is then signalled to the engine.
    pub fn grant_requested(&mut self, link: &mut dyn ReceiverLink, requested: u32, drain: bool) -> u32 {
        let granted = self.flow(
            link,
            requested.min(self.config.max_credit),
            self.config.max_credit,
        );
        if drain {
            self.draining = self.issued > 0;
            link.drain();
        } else {
            self.draining = false;
        }
        granted
    }
}
