//! CDP Transport Layer
//!
//! Serves the dispatcher over WebSocket and answers the HTTP discovery
//! endpoints front ends probe before connecting. Each WebSocket gets its own
//! dispatcher, populated by a caller-supplied [`ChannelBuilder`].

pub mod discovery;
pub mod server;

pub use discovery::DiscoveryInfo;
pub use server::{ChannelBuilder, TransportConfig, TransportError, TransportServer};
