//! Local dispatcher failures.

use cdp_protocol::ProtocolError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The transport dropped its end of the outbound channel.
    #[error("outbound channel closed")]
    ChannelClosed,
    #[error("failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
    /// The remote side answered one of our requests with an error.
    #[error("remote error: {0}")]
    Remote(ProtocolError),
    /// The dispatcher went away before a response arrived.
    #[error("request {0} abandoned before a response arrived")]
    Abandoned(i64),
}
