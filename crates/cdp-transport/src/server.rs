//! WebSocket transport server using Axum.
//!
//! Any path upgrades to a WebSocket; plain HTTP requests fall through to the
//! discovery endpoints. Every connection owns a dispatcher and a writer task
//! draining that dispatcher's outbound channel into the socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket, rejection::WebSocketUpgradeRejection},
    },
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use cdp_protocol::Message as CdpMessage;
use cdp_server::{Dispatcher, DispatcherConfig};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

use crate::discovery::{self, DiscoveryInfo};

/// Populates a fresh dispatcher for each incoming connection.
///
/// Implemented for any `Fn(&mut Dispatcher)`, so a closure registering the
/// domains is usually all that is needed.
pub trait ChannelBuilder: Send + Sync + 'static {
    fn build(&self, dispatcher: &mut Dispatcher);
}

impl<F> ChannelBuilder for F
where
    F: Fn(&mut Dispatcher) + Send + Sync + 'static,
{
    fn build(&self, dispatcher: &mut Dispatcher) {
        self(dispatcher)
    }
}

/// Transport server configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Log sent frames and unmatched calls
    pub diagnostics: bool,
    /// Maximum concurrent connections
    pub max_connections: Option<usize>,
    /// Enable CORS
    pub enable_cors: bool,
    /// Name reported by the discovery endpoints
    pub product_name: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 9229,
            hostname: "127.0.0.1".into(),
            diagnostics: false,
            max_connections: Some(32),
            enable_cors: false,
            product_name: "cdp-inspector".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shared state for the transport server.
struct AppState<B: ChannelBuilder> {
    builder: B,
    config: TransportConfig,
    discovery: DiscoveryInfo,
    slots: Arc<ConnectionSlots>,
}

/// Live connection count with an optional ceiling.
///
/// A slot is reserved before the upgrade is accepted and released when its
/// [`ConnectionSlot`] drops, so concurrent upgrades cannot overshoot.
#[derive(Debug)]
struct ConnectionSlots {
    count: AtomicUsize,
    max: Option<usize>,
}

impl ConnectionSlots {
    fn new(max: Option<usize>) -> Arc<Self> {
        Arc::new(Self {
            count: AtomicUsize::new(0),
            max,
        })
    }

    fn try_acquire(self: &Arc<Self>) -> Option<ConnectionSlot> {
        self.count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| match self.max {
                Some(max) if n >= max => None,
                _ => Some(n + 1),
            })
            .ok()?;
        Some(ConnectionSlot(self.clone()))
    }

    fn current(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

struct ConnectionSlot(Arc<ConnectionSlots>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.count.fetch_sub(1, Ordering::AcqRel);
    }
}

/// The transport server. Accepts WebSocket connections and hands their
/// frames to per-connection dispatchers.
pub struct TransportServer {
    /// Shutdown signal
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    handle: Option<tokio::task::JoinHandle<()>>,
    /// Actual bound port
    port: u16,
}

impl TransportServer {
    /// Bind and start serving. Returns once the listener is bound.
    pub async fn start<B: ChannelBuilder>(
        config: TransportConfig,
        builder: B,
    ) -> Result<Self, TransportError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let addr = format!("{}:{}", config.hostname, config.port);
        let listener = tokio::net::TcpListener::bind((config.hostname.as_str(), config.port))
            .await
            .map_err(|source| TransportError::Bind { addr, source })?;
        let actual_port = listener.local_addr()?.port();

        let state = Arc::new(AppState {
            builder,
            discovery: DiscoveryInfo::new(&config.product_name, &config.hostname, actual_port),
            slots: ConnectionSlots::new(config.max_connections),
            config: config.clone(),
        });

        let mut app = Router::new()
            .fallback(entry_handler::<B>)
            .with_state(state);
        if config.enable_cors {
            app = app.layer(CorsLayer::permissive());
        }

        info!("CDP transport listening on ws://{}:{}/", config.hostname, actual_port);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gracefully stop the server.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("CDP transport server stopped");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn entry_handler<B: ChannelBuilder>(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    State(state): State<Arc<AppState<B>>>,
    uri: Uri,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(_) => return discovery::respond(uri.path(), &state.discovery),
    };

    let Some(slot) = state.slots.try_acquire() else {
        warn!(
            "Connection rejected: max connections reached ({})",
            state.slots.current()
        );
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    };

    // A failed upgrade drops the callback, and the slot with it.
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, slot))
        .into_response()
}

// ─────────────────────────────────────────────────────────────────────────────
// WebSocket Connection Handler
// ─────────────────────────────────────────────────────────────────────────────

async fn handle_ws_connection<B: ChannelBuilder>(
    socket: WebSocket,
    state: Arc<AppState<B>>,
    slot: ConnectionSlot,
) {
    let client_id = uuid::Uuid::new_v4().to_string();
    info!("Client connected: {client_id}");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();

    let mut dispatcher = Dispatcher::with_config(
        outbound_tx,
        DispatcherConfig {
            diagnostics: state.config.diagnostics,
        },
    );
    state.builder.build(&mut dispatcher);
    let dispatcher = Arc::new(dispatcher);

    let writer_id = client_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_tx.send(Message::Text(frame.into())).await {
                debug!("Failed to send to {writer_id}: {e}");
                break;
            }
        }
    });

    while let Some(msg) = ws_rx.next().await {
        match msg {
            Ok(Message::Text(text)) => match CdpMessage::decode(text.as_str()) {
                Ok(message) => {
                    dispatcher.receive(message);
                }
                Err(e) => warn!("Dropping malformed frame from {client_id}: {e}"),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket error for {client_id}: {e}");
                break;
            }
        }
    }

    writer.abort();
    drop(slot);
    info!(
        "Client disconnected: {client_id} (total: {})",
        state.slots.current()
    );
}
