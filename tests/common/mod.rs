//! Shared test doubles for dispatcher integration tests.

#![allow(dead_code)] // not every test file uses every helper

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use routegate::{ApiRequest, ApiResponse, Clock, ManualClock, Transport, TransportError};

/// One recorded transport send: the rendered path plus the clock time at which
/// it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendRecord {
    pub path: String,
    pub at_ms: u64,
}

/// Transport that replays a fixed script of responses and records every send.
///
/// Clones share state, so a clone handed to the dispatcher can still be
/// inspected from the test body. An exhausted script turns into a transport
/// error, which makes a test that sends more than it scripted fail loudly.
#[derive(Clone)]
pub struct ScriptedTransport {
    clock: ManualClock,
    responses: Arc<Mutex<VecDeque<ApiResponse>>>,
    sends: Arc<Mutex<Vec<SendRecord>>>,
}

impl ScriptedTransport {
    pub fn new(clock: ManualClock, responses: Vec<ApiResponse>) -> Self {
        Self {
            clock,
            responses: Arc::new(Mutex::new(responses.into())),
            sends: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Append more responses to the script.
    pub fn push_responses(&self, responses: Vec<ApiResponse>) {
        self.responses.lock().unwrap().extend(responses);
    }

    pub fn sends(&self) -> Vec<SendRecord> {
        self.sends.lock().unwrap().clone()
    }

    pub fn send_times(&self) -> Vec<u64> {
        self.sends.lock().unwrap().iter().map(|record| record.at_ms).collect()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.sends.lock().unwrap().push(SendRecord {
            path: request.path().to_string(),
            at_ms: self.clock.now_millis(),
        });
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| TransportError::new("script exhausted"))
    }
}
