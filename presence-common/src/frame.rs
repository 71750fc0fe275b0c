//! Gateway frame codec.
//!
//! Every message on the gateway socket is a single JSON text of the shape
//! `{op, d, s, t}`:
//!
//! - `op` — integer opcode deciding how the frame is routed
//! - `d` — opcode-specific payload
//! - `s` — sequence number, present on dispatch frames only
//! - `t` — event sub-type, present on dispatch frames only
//!
//! # Connection Flow
//!
//! 1. Client opens the socket; the gateway sends `hello` (op 10) announcing
//!    the heartbeat interval
//! 2. Client sends `identify` (op 2) for a fresh session or `resume` (op 6)
//!    to pick up a previous one
//! 3. Dispatch frames (op 0) carry the domain events; the first one also
//!    acknowledges the handshake
//! 4. Client sends `heartbeat` (op 1) on the announced interval; the gateway
//!    answers each pulse with op 11
//!
//! Decoding never terminates a connection: an unparseable frame surfaces as
//! [`FormatError`] and the caller drops it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opcodes on the gateway socket.
pub mod opcode {
    /// Inbound dispatch event, discriminated further by the `t` field.
    pub const DISPATCH: u8 = 0;
    /// Outbound liveness pulse carrying the last seen sequence number.
    pub const HEARTBEAT: u8 = 1;
    /// Outbound fresh-session handshake.
    pub const IDENTIFY: u8 = 2;
    /// Outbound session-resume handshake.
    pub const RESUME: u8 = 6;
    /// Gateway asks the client to reconnect; the session stays resumable.
    pub const RECONNECT: u8 = 7;
    /// Gateway declares the session unrecoverable.
    pub const INVALID_SESSION: u8 = 9;
    /// First inbound frame, announces the heartbeat interval.
    pub const HELLO: u8 = 10;
    /// Acknowledgement of a liveness pulse.
    pub const HEARTBEAT_ACK: u8 = 11;
    /// Outbound member-list subscription for a group.
    pub const REQUEST_MEMBERS: u8 = 14;
}

/// A single gateway frame as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayFrame {
    pub op: u8,
    #[serde(default)]
    pub d: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// A frame (or its payload) could not be parsed.
#[derive(Debug, thiserror::Error)]
#[error("malformed gateway frame: {0}")]
pub struct FormatError(#[from] serde_json::Error);

impl GatewayFrame {
    /// Build an outbound command frame from a serializable payload.
    pub fn command<T: Serialize>(op: u8, payload: &T) -> Result<Self, FormatError> {
        Ok(Self {
            op,
            d: serde_json::to_value(payload)?,
            s: None,
            t: None,
        })
    }

    /// Build an outbound heartbeat pulse carrying the last seen sequence.
    pub fn heartbeat(last_sequence: Option<u64>) -> Self {
        Self {
            op: opcode::HEARTBEAT,
            d: last_sequence.map(Value::from).unwrap_or(Value::Null),
            s: None,
            t: None,
        }
    }

    /// Serialize the frame to its wire text.
    pub fn encode(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a frame from its wire text.
    pub fn decode(text: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Dispatch event sub-type, when present.
    pub fn event_type(&self) -> Option<&str> {
        self.t.as_deref()
    }

    /// Decode the `d` payload into a concrete type.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T, FormatError> {
        Ok(serde_json::from_value(self.d.clone())?)
    }
}
