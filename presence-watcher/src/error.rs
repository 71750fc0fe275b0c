//! Error types for the presence watcher.
//!
//! Every variant here ends a single connection attempt, never the process:
//! the reconnect loop in `gateway::client` catches all of them and opens a
//! new transport. Malformed frames are not represented at all — they are
//! logged and dropped at the point of decoding.

use presence_common::FormatError;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Connect failure, send failure or abrupt close at the transport level.
    #[error("transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The gateway closed the stream or sent a close frame.
    #[error("connection closed by gateway")]
    ConnectionClosed,

    /// An outbound frame of our own could not be serialized.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Missed heartbeat acknowledgement; the connection is presumed dead.
    #[error("heartbeat acknowledgement missed")]
    LivenessFailure,

    /// The gateway asked for a reconnect; the session stays resumable.
    #[error("gateway requested reconnect")]
    ReconnectRequested,

    /// The gateway invalidated the session; the next handshake identifies
    /// from scratch.
    #[error("session invalidated by gateway")]
    SessionInvalidated,
}
