//! Peer — the outbound half of a channel.
//!
//! A [`Peer`] emits events, requests and responses as whole text frames and
//! owns the table of requests still waiting for the remote side to answer.
//! It is cheap to clone; domains keep one to push their own events.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::task::{Context, Poll};

use cdp_protocol::{
    ErrorCode, Event, Events, HandlerResult, Message, Outcome, Request, RequestId, Response,
};
use dashmap::DashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::error::DispatchError;

/// Issues local request ids: -1, -2, -3, ...
///
/// Remote ids are positive by convention, so the two spaces never collide on
/// one channel.
#[derive(Debug, Default)]
pub struct IdGenerator {
    current: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> RequestId {
        self.current.fetch_sub(1, Ordering::Relaxed) - 1
    }
}

#[derive(Clone)]
pub struct Peer {
    inner: Arc<PeerInner>,
}

struct PeerInner {
    outbound: mpsc::UnboundedSender<String>,
    ids: IdGenerator,
    pending: DashMap<RequestId, oneshot::Sender<HandlerResult>>,
    diagnostics: bool,
}

impl Peer {
    pub fn new(outbound: mpsc::UnboundedSender<String>, diagnostics: bool) -> Self {
        Self {
            inner: Arc::new(PeerInner {
                outbound,
                ids: IdGenerator::new(),
                pending: DashMap::new(),
                diagnostics,
            }),
        }
    }

    /// Emit an event. Nothing comes back.
    pub fn send_event(&self, method: &str, params: Value) -> Result<(), DispatchError> {
        self.emit(&Message::Event(Event::new(method, params)))
    }

    /// Issue a request to the remote side.
    ///
    /// The pending entry exists before the frame leaves, so even an
    /// immediate answer finds it. No timeout applies: if the remote never
    /// answers, the returned future never completes and the entry stays.
    pub fn send_request(&self, method: &str, params: Value) -> Result<PendingResponse, DispatchError> {
        let id = self.inner.ids.next_id();
        let (tx, rx) = oneshot::channel();
        self.inner.pending.insert(id, tx);

        if let Err(e) = self.emit(&Message::Request(Request::new(id, method, params))) {
            self.inner.pending.remove(&id);
            return Err(e);
        }

        Ok(PendingResponse { id, rx })
    }

    /// Emit a fully formed response to a remote request.
    pub fn send_response(&self, response: Response) -> Result<(), DispatchError> {
        self.emit(&Message::Response(response))
    }

    /// Hand a response to the request waiting for it.
    ///
    /// Returns `false` when no local request has that id.
    pub fn resolve(&self, response: Response) -> bool {
        match self.inner.pending.remove(&response.id) {
            Some((_, tx)) => {
                // The waiter may have been dropped; that is not an error here.
                let _ = tx.send(response.into_result());
                true
            }
            None => false,
        }
    }

    /// Number of requests still waiting for an answer.
    pub fn pending_requests(&self) -> usize {
        self.inner.pending.len()
    }

    pub fn is_closed(&self) -> bool {
        self.inner.outbound.is_closed()
    }

    fn emit(&self, message: &Message) -> Result<(), DispatchError> {
        let frame = serde_json::to_string(message)?;
        if self.inner.diagnostics && !is_quiet(message) {
            info!("SEND: {frame}");
        } else {
            debug!("SEND: {frame}");
        }
        self.inner
            .outbound
            .send(frame)
            .map_err(|_| DispatchError::ChannelClosed)
    }
}

/// Frames too frequent or too uninteresting for the diagnostics log.
fn is_quiet(message: &Message) -> bool {
    match message {
        Message::Response(Response {
            outcome: Outcome::Result(Value::Object(map)),
            ..
        }) => map.is_empty(),
        Message::Response(Response {
            outcome: Outcome::Error(err),
            ..
        }) => err.code == Some(ErrorCode::MethodNotFound.code()),
        Message::Event(event) => event.method == Events::RUNTIME_CONSOLE_API_CALLED,
        _ => false,
    }
}

/// The eventual answer to a request sent with [`Peer::send_request`].
#[derive(Debug)]
pub struct PendingResponse {
    id: RequestId,
    rx: oneshot::Receiver<HandlerResult>,
}

impl PendingResponse {
    pub fn id(&self) -> RequestId {
        self.id
    }
}

impl Future for PendingResponse {
    type Output = Result<Value, DispatchError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let id = self.id;
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result.map_err(DispatchError::Remote)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(DispatchError::Abandoned(id))),
            Poll::Pending => Poll::Pending,
        }
    }
}
