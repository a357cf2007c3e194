//! A scripted in-memory transport for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::{PluginTransport, TransportError, TransportRequest, TransportResponse};

type Reply = Result<TransportResponse, TransportError>;

/// Replays canned replies per wire operation and records every request.
///
/// Replies queued for an operation are returned in order; the last one is
/// repeated once the queue would otherwise run dry. An operation with no
/// scripted reply fails with [`TransportError::Failed`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with nothing scripted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply with `body` for `operation`.
    #[must_use]
    pub fn respond(self, operation: &str, body: &str) -> Self {
        self.push(operation, Ok(TransportResponse::with_body(body)))
    }

    /// Queues a reply without a body for `operation`.
    #[must_use]
    pub fn respond_empty(self, operation: &str) -> Self {
        self.push(operation, Ok(TransportResponse::empty()))
    }

    /// Queues a failure for `operation`.
    #[must_use]
    pub fn fail(self, operation: &str, error: TransportError) -> Self {
        self.push(operation, Err(error))
    }

    /// Returns every request submitted so far.
    #[must_use]
    pub fn requests(&self) -> Vec<TransportRequest> {
        lock(&self.requests).clone()
    }

    /// Returns the requests submitted for `operation`.
    #[must_use]
    pub fn requests_for(&self, operation: &str) -> Vec<TransportRequest> {
        lock(&self.requests)
            .iter()
            .filter(|request| request.operation() == operation)
            .cloned()
            .collect()
    }

    fn push(self, operation: &str, reply: Reply) -> Self {
        lock(&self.replies)
            .entry(operation.to_owned())
            .or_default()
            .push_back(reply);
        self
    }
}

impl PluginTransport for ScriptedTransport {
    fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        lock(&self.requests).push(request.clone());
        let mut replies = lock(&self.replies);
        let queue = replies.get_mut(request.operation());
        let reply = match queue {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply.unwrap_or_else(|| {
            Err(TransportError::Failed {
                plugin_id: request.plugin_id().to_owned(),
                message: format!("no scripted reply for '{}'", request.operation()),
            })
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
