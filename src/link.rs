//! Receiver-link state: lifecycle, resolved address, dynamic flag.

/// Lifecycle state of an inbound link.
///
/// Events outside the transitions below are ignored: a link that never
/// finished attaching grants no credit, and a closed link drops flow
/// and delivery events on the floor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LinkState {
    /// Attach received, target not yet resolved.
    #[default]
    Initial,
    /// Target resolved and initial credit issued.
    Ready,
    /// Detached; terminal.
    Closed,
}

/// Per-link state owned by the receiver context.
#[derive(Debug, Default)]
pub struct ReceiverLinkState {
    state: LinkState,
    address: Option<String>,
    dynamic: bool,
}

impl ReceiverLinkState {
    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> LinkState { self.state }

    /// Resolved destination address, if initialisation resolved one.
    #[must_use]
    pub fn address(&self) -> Option<&str> { self.address.as_deref() }

    /// Whether the address names a server-generated, session-scoped node.
    #[must_use]
    pub fn is_dynamic(&self) -> bool { self.dynamic }

    /// Whether the link accepts flow and delivery events.
    #[must_use]
    pub fn is_ready(&self) -> bool { self.state == LinkState::Ready }

    pub(crate) fn set_address(&mut self, address: String, dynamic: bool) {
        self.address = Some(address);
        self.dynamic = dynamic;
    }

    pub(crate) fn mark_ready(&mut self) {
        if self.state == LinkState::Initial {
            self.state = LinkState::Ready;
        }
    }

    pub(crate) fn mark_closed(&mut self) { self.state = LinkState::Closed; }
}
