//! In-memory transport for exercising the client without a manager
//!
//! `MockTransport` records every message and answers `send_and_wait` from a
//! queue of scripted replies. Clones share state, so a test can keep one
//! handle while the client owns another.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;

use itempipe_protocol::MessageType;

use crate::error::TransportError;
use crate::transport::Transport;

/// One message as handed to the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub message_type: MessageType,
    pub payload: Bytes,
    pub want_reply: bool,
}

#[derive(Debug, Default)]
struct MockState {
    sent: Vec<SentMessage>,
    replies: VecDeque<Bytes>,
    fail_sends: bool,
}

/// Recording transport with scripted replies
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the payload returned by the next `send_and_wait`
    pub fn push_reply(&self, payload: impl Into<Bytes>) {
        self.state.lock().replies.push_back(payload.into());
    }

    /// Make every following send fail as if the manager were gone
    pub fn fail_sends(&self) {
        self.state.lock().fail_sends = true;
    }

    /// Everything sent so far
    pub fn sent(&self) -> Vec<SentMessage> {
        self.state.lock().sent.clone()
    }

    /// Number of messages sent so far
    pub fn send_count(&self) -> usize {
        self.state.lock().sent.len()
    }

    fn record(
        &self,
        message_type: MessageType,
        payload: Bytes,
        want_reply: bool,
    ) -> Result<(), TransportError> {
        let mut state = self.state.lock();
        if state.fail_sends {
            return Err(TransportError::Write {
                message_type,
                source: std::io::Error::from(std::io::ErrorKind::BrokenPipe),
            });
        }
        state.sent.push(SentMessage {
            message_type,
            payload,
            want_reply,
        });
        Ok(())
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<(), TransportError> {
        self.record(message_type, payload, false)
    }

    async fn send_and_wait(
        &mut self,
        message_type: MessageType,
        payload: Bytes,
    ) -> Result<Bytes, TransportError> {
        self.record(message_type, payload, true)?;
        self.state
            .lock()
            .replies
            .pop_front()
            .ok_or(TransportError::Closed)
    }
}
