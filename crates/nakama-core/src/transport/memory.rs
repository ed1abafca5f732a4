use std::collections::{HashMap, VecDeque};

use futures::channel::mpsc::{unbounded, UnboundedSender};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use futures::StreamExt;
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::Transport;
use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Default)]
struct State {
    responses: HashMap<(Method, String), VecDeque<Result<Value, CoreError>>>,
    requests: Vec<RecordedRequest>,
    channels: HashMap<String, Vec<UnboundedSender<Value>>>,
}

/// In-process transport: scripted responses per `(method, path)` and live channels
/// driven by [`MemoryTransport::emit`].
///
/// Unscripted requests answer `404`.
#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Scripting =====

    pub fn respond_get(&self, path: &str, body: Value) {
        self.script(Method::Get, path, Ok(body));
    }

    pub fn fail_get(&self, path: &str, error: CoreError) {
        self.script(Method::Get, path, Err(error));
    }

    pub fn respond_post(&self, path: &str, body: Value) {
        self.script(Method::Post, path, Ok(body));
    }

    pub fn fail_post(&self, path: &str, error: CoreError) {
        self.script(Method::Post, path, Err(error));
    }

    fn script(&self, method: Method, path: &str, response: Result<Value, CoreError>) {
        self.state
            .lock()
            .responses
            .entry((method, path.to_string()))
            .or_default()
            .push_back(response);
    }

    // ===== Live channels =====

    /// Push a frame to every open channel on `path`.
    pub fn emit(&self, path: &str, frame: Value) {
        let mut state = self.state.lock();
        if let Some(senders) = state.channels.get_mut(path) {
            senders.retain(|tx| tx.unbounded_send(frame.clone()).is_ok());
        }
    }

    /// End every channel on `path`, as if the server hung up.
    pub fn close_channels(&self, path: &str) {
        if let Some(senders) = self.state.lock().channels.remove(path) {
            for tx in senders {
                tx.close_channel();
            }
        }
    }

    pub fn open_channels(&self, path: &str) -> usize {
        self.state
            .lock()
            .channels
            .get(path)
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    // ===== Inspection =====

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    fn answer(&self, method: Method, path: &str, body: Option<Value>) -> Result<Value, CoreError> {
        let mut state = self.state.lock();
        state.requests.push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });
        state
            .responses
            .get_mut(&(method, path.to_string()))
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(CoreError::Status {
                    status_code: 404,
                    message: format!("no scripted response for {}", path),
                    fields: Map::new(),
                })
            })
    }
}

impl Transport for MemoryTransport {
    fn get<'a>(&'a self, path: &'a str) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move { self.answer(Method::Get, path, None) })
    }

    fn post<'a>(
        &'a self,
        path: &'a str,
        payload: Value,
    ) -> BoxFuture<'a, Result<Value, CoreError>> {
        Box::pin(async move { self.answer(Method::Post, path, Some(payload)) })
    }

    fn subscribe(&self, path: &str) -> BoxStream<'static, Value> {
        let (tx, rx) = unbounded();
        self.state
            .lock()
            .channels
            .entry(path.to_string())
            .or_default()
            .push(tx);
        rx.boxed()
    }
}
