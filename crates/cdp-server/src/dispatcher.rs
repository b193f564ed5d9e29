//! CDP Dispatcher — routes inbound messages to domains and correlates responses.

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use cdp_protocol::{Event, HandlerResult, Message, ProtocolError, Request, Response};
use futures_util::FutureExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::Domain;
use crate::error::DispatchError;
use crate::peer::{PendingResponse, Peer};
use crate::registry::{DomainRegistry, MethodFn};

/// Dispatcher configuration.
#[derive(Debug, Clone, Default)]
pub struct DispatcherConfig {
    /// Log unmatched calls and outbound traffic at `info` level.
    pub diagnostics: bool,
}

/// One channel's dispatcher.
///
/// Built per connection: register domains with `&mut self`, then wrap in an
/// `Arc` and feed it messages with [`Dispatcher::receive`].
pub struct Dispatcher {
    peer: Peer,
    registry: DomainRegistry,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new(outbound: mpsc::UnboundedSender<String>) -> Self {
        Self::with_config(outbound, DispatcherConfig::default())
    }

    pub fn with_config(outbound: mpsc::UnboundedSender<String>, config: DispatcherConfig) -> Self {
        Self {
            peer: Peer::new(outbound, config.diagnostics),
            registry: DomainRegistry::new(),
            config,
        }
    }

    /// Handle for emitting events and requests on this channel.
    pub fn peer(&self) -> Peer {
        self.peer.clone()
    }

    /// Register a domain's allow-listed methods under `name`.
    pub fn register<D: Domain + 'static>(&mut self, name: &str, domain: Arc<D>) {
        self.registry.register(name, domain);
    }

    /// Register a direct method-name-to-callable mapping under `name`.
    pub fn register_methods<I, S>(&mut self, name: &str, methods: I)
    where
        I: IntoIterator<Item = (S, MethodFn)>,
        S: Into<String>,
    {
        self.registry.register_methods(name, methods);
    }

    pub fn register_fn<F, Fut>(&mut self, domain: &str, method: &str, f: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.registry.register_fn(domain, method, f);
    }

    pub fn registry(&self) -> &DomainRegistry {
        &self.registry
    }

    pub fn send_event(&self, method: &str, params: Value) -> Result<(), DispatchError> {
        self.peer.send_event(method, params)
    }

    pub fn send_request(&self, method: &str, params: Value) -> Result<PendingResponse, DispatchError> {
        self.peer.send_request(method, params)
    }

    pub fn send_response(&self, response: Response) -> Result<(), DispatchError> {
        self.peer.send_response(response)
    }

    /// Accept one inbound message and process it on its own task.
    ///
    /// Messages do not wait for each other, so responses may leave in a
    /// different order than their requests arrived.
    pub fn receive(self: &Arc<Self>, message: Message) -> JoinHandle<()> {
        let this = self.clone();
        tokio::spawn(async move { this.handle_message(message).await })
    }

    /// Process one inbound message to completion.
    pub async fn handle_message(&self, message: Message) {
        match message {
            Message::Response(response) => {
                let id = response.id;
                if !self.peer.resolve(response) {
                    debug!("Ignoring response {id}: no request is waiting for it");
                }
            }
            Message::Request(Request { id, method, params }) => {
                let response = match self.call_method(&method, params).await {
                    Ok(result) => Response::success(id, result),
                    Err(err) => Response::error(id, err),
                };
                if let Err(e) = self.peer.send_response(response) {
                    warn!("Failed to send response {id} for {method}: {e}");
                }
            }
            Message::Event(Event { method, params }) => {
                if let Err(err) = self.call_method(&method, params).await {
                    debug!("Event {method} failed: {err}");
                }
            }
        }
    }

    /// Route a call to its handler.
    async fn call_method(&self, method: &str, params: Value) -> HandlerResult {
        let Some(handler) = self.registry.lookup(method) else {
            if self.config.diagnostics {
                warn!("Unhandled method: {method} {params}");
            }
            return Err(ProtocolError::method_not_found(method));
        };

        match AssertUnwindSafe(handler.invoke(params)).catch_unwind().await {
            Ok(result) => result,
            Err(_) => {
                warn!("Handler for {method} panicked");
                Err(ProtocolError::internal(format!("Handler for {method} panicked")))
            }
        }
    }
}
