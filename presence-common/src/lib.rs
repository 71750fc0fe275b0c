//! Presence Watcher Common Types
//!
//! Shared wire-protocol types used by the gateway client: the frame codec,
//! dispatch payloads and the presence status model.

pub mod events;
pub mod frame;

pub use events::{
    capability, event_type, Activity, EntityRef, Group, Hello, Identify, MemberEntry,
    MemberListOp, MemberListRequest, MemberListUpdate, MembershipUpdate, Occupancy,
    PresenceStatus, Ready, Resume, StatusUpdate, CUSTOM_STATUS_LABEL,
};
pub use frame::{opcode, FormatError, GatewayFrame};
