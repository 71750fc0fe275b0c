//! Gateway connection handling.
//!
//! This module owns the single long-lived connection to the presence
//! gateway: handshake sequencing, heartbeat liveness, the resume-or-identify
//! decision, and routing of inbound frames to the presence tracker.

mod client;
mod heartbeat;
mod router;
mod session;

pub use client::{ConnectionState, GatewayClient};
pub use heartbeat::HeartbeatMonitor;
pub use router::{route, DispatchEvent, RoutedEvent};
pub use session::Session;
