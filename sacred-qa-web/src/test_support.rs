//! Scripted in-memory backend and log capture for tests

use crate::backend::{Backend, RelayError, Resource};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;

type Queue<T> = HashMap<Resource, VecDeque<Result<T, RelayError>>>;

/// Replays queued responses per resource. When a queue holds a single
/// response it is repeated for every later call.
#[derive(Default)]
pub struct StubBackend {
    collections: Mutex<Queue<Vec<Value>>>,
    submit_responses: Mutex<Queue<Value>>,
    fetches: Mutex<Vec<Resource>>,
    submissions: Mutex<Vec<(Resource, Value)>>,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_collection(&self, resource: Resource, response: Result<Vec<Value>, RelayError>) {
        self.collections
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .push_back(response);
    }

    pub fn push_submit(&self, resource: Resource, response: Result<Value, RelayError>) {
        self.submit_responses
            .lock()
            .unwrap()
            .entry(resource)
            .or_default()
            .push_back(response);
    }

    pub fn fetch_count(&self, resource: Resource) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .iter()
            .filter(|r| **r == resource)
            .count()
    }

    pub fn submissions(&self) -> Vec<(Resource, Value)> {
        self.submissions.lock().unwrap().clone()
    }

    fn next<T: Clone>(queue: &Mutex<Queue<T>>, resource: Resource) -> Result<T, RelayError> {
        let mut queue = queue.lock().unwrap();
        let responses = queue.entry(resource).or_default();
        match responses.len() {
            0 => Err(RelayError::Network(format!("no stubbed response for {}", resource))),
            1 => responses[0].clone(),
            _ => responses.pop_front().unwrap(),
        }
    }
}

#[async_trait]
impl Backend for StubBackend {
    fn base_url(&self) -> &str {
        "stub://agent"
    }

    async fn fetch_collection(&self, resource: Resource) -> Result<Vec<Value>, RelayError> {
        self.fetches.lock().unwrap().push(resource);
        Self::next(&self.collections, resource)
    }

    async fn submit(&self, resource: Resource, payload: &Value) -> Result<Value, RelayError> {
        self.submissions
            .lock()
            .unwrap()
            .push((resource, payload.clone()));
        Self::next(&self.submit_responses, resource)
    }
}

/// Formatted log output recorded on the current thread while alive
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: DefaultGuard,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Route `tracing` events on this thread into a buffer. Pair with a
/// current-thread runtime so every task logs through the same default.
pub fn capture_logs() -> CapturedLogs {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = BufferWriter(buffer.clone());
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    CapturedLogs {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}
