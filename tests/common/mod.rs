//! Shared mocks for receiver-context integration tests.
//!
//! Provides a scripted engine link, a recording session callback and a
//! mock delivery handle so scenario tests can drive the context without
//! a real protocol engine or broker.

#![allow(
    dead_code,
    reason = "shared test utilities are not used by all test binaries"
)]

use std::{
    collections::{HashSet, VecDeque},
    sync::{
        Arc,
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

use amqp_ingress::{
    ConnectionHandle,
    CreditConfig,
    DeliveryHandle,
    DeliveryOutcome,
    EngineError,
    ReceiverLink,
    RecvStatus,
    ServerReceiverContext,
    SessionCallback,
    SessionError,
    TerminusTarget,
};
use async_trait::async_trait;
use bytes::BytesMut;

/// One scripted response from [`ScriptedReceiver::recv`].
#[derive(Clone, Debug)]
pub enum RecvStep {
    /// Append these bytes and report `Read`.
    Bytes(Vec<u8>),
    /// Report the delivery incomplete with nothing buffered.
    Pending,
    /// Report the delivery complete.
    Complete,
    /// Fail the read.
    Fail,
}

/// Scripted engine link recording every mutation the context performs.
#[derive(Debug, Default)]
pub struct ScriptedReceiver {
    pub target: Option<TerminusTarget>,
    pub steps: VecDeque<RecvStep>,
    pub flows: Vec<u32>,
    pub drains: u32,
    pub advanced: u32,
    pub assigned_address: Option<String>,
}

impl ScriptedReceiver {
    pub fn new(target: Option<TerminusTarget>) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Queue a delivery whose payload arrives in one fragment.
    pub fn queue_delivery(&mut self, payload: &[u8]) {
        self.steps.push_back(RecvStep::Bytes(payload.to_vec()));
        self.steps.push_back(RecvStep::Complete);
    }

    /// Queue a fragment that leaves the current delivery incomplete.
    pub fn queue_fragment(&mut self, payload: &[u8]) {
        self.steps.push_back(RecvStep::Bytes(payload.to_vec()));
        self.steps.push_back(RecvStep::Pending);
    }

    /// Queue the final fragment of the current delivery.
    pub fn queue_final_fragment(&mut self, payload: &[u8]) {
        self.steps.push_back(RecvStep::Bytes(payload.to_vec()));
        self.steps.push_back(RecvStep::Complete);
    }

    /// Queue a read failure.
    pub fn queue_read_failure(&mut self) { self.steps.push_back(RecvStep::Fail); }
}

impl ReceiverLink for ScriptedReceiver {
    fn remote_target(&self) -> Option<&TerminusTarget> { self.target.as_ref() }

    fn set_target_address(&mut self, address: &str) {
        if let Some(target) = &mut self.target {
            target.address = Some(address.to_owned());
        }
        self.assigned_address = Some(address.to_owned());
    }

    fn recv(&mut self, buffer: &mut BytesMut) -> Result<RecvStatus, EngineError> {
        match self.steps.pop_front() {
            Some(RecvStep::Bytes(bytes)) => {
                buffer.extend_from_slice(&bytes);
                Ok(RecvStatus::Read(bytes.len()))
            }
            Some(RecvStep::Pending) | None => Ok(RecvStatus::Pending),
            Some(RecvStep::Complete) => Ok(RecvStatus::Complete),
            Some(RecvStep::Fail) => Err(EngineError::Detached),
        }
    }

    fn advance(&mut self) { self.advanced += 1; }

    fn flow(&mut self, credits: u32) { self.flows.push(credits); }

    fn drain(&mut self) { self.drains += 1; }
}

/// Mock delivery handle capturing applied outcomes.
#[derive(Debug)]
pub struct MockDelivery {
    pub readable: bool,
    pub format: u32,
    pub outcomes: Vec<DeliveryOutcome>,
}

impl MockDelivery {
    pub fn readable(format: u32) -> Self {
        Self {
            readable: true,
            format,
            outcomes: Vec::new(),
        }
    }

    pub fn unreadable() -> Self {
        Self {
            readable: false,
            format: 0,
            outcomes: Vec::new(),
        }
    }
}

impl DeliveryHandle for MockDelivery {
    fn is_readable(&self) -> bool { self.readable }

    fn message_format(&self) -> u32 { self.format }

    fn disposition(&mut self, outcome: DeliveryOutcome) { self.outcomes.push(outcome); }
}

/// One `server_send` invocation observed by the mock broker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SendRecord {
    pub address: String,
    pub message_format: u32,
    pub payload: Vec<u8>,
}

/// Recording broker session with configurable failures.
#[derive(Debug, Default)]
pub struct RecordingSession {
    queues: Mutex<HashSet<String>>,
    created: Mutex<Vec<String>>,
    sends: Mutex<Vec<SendRecord>>,
    temp_name_calls: AtomicU64,
    fail_next_send: Mutex<Option<String>>,
    fail_create: Mutex<Option<String>>,
    fail_query: Mutex<Option<String>>,
}

impl RecordingSession {
    /// Session that already knows the queue bound to `address`.
    pub fn with_queue(address: &str) -> Self {
        let session = Self::default();
        session
            .queues
            .lock()
            .expect("queue set poisoned")
            .insert(address.to_owned());
        session
    }

    pub fn fail_next_send(&self, message: &str) {
        *self.fail_next_send.lock().expect("send flag poisoned") = Some(message.to_owned());
    }

    pub fn fail_create(&self, message: &str) {
        *self.fail_create.lock().expect("create flag poisoned") = Some(message.to_owned());
    }

    pub fn fail_query(&self, message: &str) {
        *self.fail_query.lock().expect("query flag poisoned") = Some(message.to_owned());
    }

    pub fn temp_name_calls(&self) -> u64 { self.temp_name_calls.load(Ordering::SeqCst) }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().expect("created list poisoned").clone()
    }

    pub fn sends(&self) -> Vec<SendRecord> {
        self.sends.lock().expect("send list poisoned").clone()
    }
}

#[async_trait]
impl SessionCallback for RecordingSession {
    fn temp_queue_name(&self) -> String {
        let n = self.temp_name_calls.fetch_add(1, Ordering::SeqCst);
        format!("amq.temp.{}", n + 1)
    }

    async fn create_temporary_queue(&self, name: &str) -> Result<(), SessionError> {
        if let Some(message) = self.fail_create.lock().expect("create flag poisoned").take() {
            return Err(SessionError::new(message));
        }
        self.created
            .lock()
            .expect("created list poisoned")
            .push(name.to_owned());
        self.queues
            .lock()
            .expect("queue set poisoned")
            .insert(name.to_owned());
        Ok(())
    }

    async fn queue_query(&self, address: &str) -> Result<bool, SessionError> {
        if let Some(message) = self.fail_query.lock().expect("query flag poisoned").take() {
            return Err(SessionError::new(message));
        }
        Ok(self
            .queues
            .lock()
            .expect("queue set poisoned")
            .contains(address))
    }

    async fn server_send(
        &self,
        _receiver: &mut dyn ReceiverLink,
        delivery: &mut dyn DeliveryHandle,
        address: &str,
        message_format: u32,
        payload: &[u8],
    ) -> Result<(), SessionError> {
        if let Some(message) = self.fail_next_send.lock().expect("send flag poisoned").take() {
            return Err(SessionError::new(message));
        }
        self.sends
            .lock()
            .expect("send list poisoned")
            .push(SendRecord {
                address: address.to_owned(),
                message_format,
                payload: payload.to_vec(),
            });
        delivery.disposition(DeliveryOutcome::Accepted);
        Ok(())
    }
}

/// Context wired to a scripted link and a recording session.
pub fn context_with(
    receiver: ScriptedReceiver,
    session: &Arc<RecordingSession>,
) -> ServerReceiverContext<ScriptedReceiver> {
    ServerReceiverContext::new(
        receiver,
        session.clone(),
        ConnectionHandle::new(),
        CreditConfig::default(),
    )
}
