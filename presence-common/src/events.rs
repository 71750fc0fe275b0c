//! Payload types for handshake commands and dispatch events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Dispatch event sub-types carried in a frame's `t` field.
pub mod event_type {
    /// Sent once after a successful handshake; enumerates active groups.
    pub const READY: &str = "READY";
    /// An entity's presence status or activity changed.
    pub const STATUS_UPDATE: &str = "STATUS_UPDATE";
    /// An entity joined or left a channel within a group.
    pub const MEMBERSHIP_UPDATE: &str = "MEMBERSHIP_UPDATE";
    /// Paginated member-list page for a subscribed group.
    pub const MEMBER_LIST_UPDATE: &str = "MEMBER_LIST_UPDATE";
}

/// Capability bits requested at identify time.
pub mod capability {
    /// Entity presence updates.
    pub const ENTITY_PRESENCE: u32 = 1 << 1;
    /// Voice/activity presence updates.
    pub const VOICE_PRESENCE: u32 = 1 << 7;

    /// The fixed set requested at startup; there is no dynamic subscription.
    pub fn startup_set() -> u32 {
        ENTITY_PRESENCE | VOICE_PRESENCE
    }
}

/// Activity name the gateway uses for free-form status text. The member-list
/// handler substitutes the text itself for this label.
pub const CUSTOM_STATUS_LABEL: &str = "Custom Status";

/// Presence status of an entity. Unrecognized wire values decode as
/// `Unknown` rather than failing the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    Offline,
    Online,
    Idle,
    Busy,
    #[default]
    #[serde(other)]
    Unknown,
}

/// `hello` payload (op 10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hello {
    /// Heartbeat period in milliseconds.
    pub heartbeat_interval: u64,
}

/// `identify` payload (op 2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identify {
    pub credential: String,
    pub capabilities: u32,
    pub properties: Map<String, Value>,
}

impl Identify {
    pub fn new(credential: String) -> Self {
        Self {
            credential,
            capabilities: capability::startup_set(),
            properties: Map::new(),
        }
    }
}

/// `resume` payload (op 6). Deliberately credential-free: the session id is
/// the proof of a prior identify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resume {
    pub session_id: String,
    pub seq: u64,
}

/// `request members` payload (op 14); subscribes to a group's member list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListRequest {
    pub group_id: String,
    pub activities: bool,
}

impl MemberListRequest {
    pub fn new(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            activities: true,
        }
    }
}

/// Reference to an entity inside an event payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
}

/// A named activity attached to a presence. `state` carries the free-form
/// text for custom statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub name: String,
    #[serde(default)]
    pub state: Option<String>,
}

/// `READY` dispatch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ready {
    pub session_id: String,
    #[serde(default)]
    pub groups: Vec<Group>,
}

/// A group enumerated by the ready event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    /// Entities currently occupying a channel in this group.
    #[serde(default)]
    pub occupants: Vec<Occupancy>,
}

/// Channel occupancy of one entity at ready time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Occupancy {
    pub entity_id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// `STATUS_UPDATE` dispatch payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub entity: EntityRef,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
}

/// `MEMBERSHIP_UPDATE` dispatch payload. A null `channel_id` means the
/// entity left its channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipUpdate {
    pub entity_id: String,
    #[serde(default)]
    pub channel_id: Option<String>,
}

/// `MEMBER_LIST_UPDATE` dispatch payload. Pages arrive as a list of ops,
/// each carrying either a batch of entries or a single one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListUpdate {
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub ops: Vec<MemberListOp>,
}

/// One page op within a member-list update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberListOp {
    #[serde(default)]
    pub items: Vec<MemberEntry>,
    #[serde(default)]
    pub item: Option<MemberEntry>,
}

impl MemberListOp {
    /// All entries carried by this op, batch and singleton alike.
    pub fn entries(&self) -> impl Iterator<Item = &MemberEntry> {
        self.items.iter().chain(self.item.iter())
    }
}

/// Member plus presence entry inside a member-list page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberEntry {
    pub entity: EntityRef,
    #[serde(default)]
    pub status: PresenceStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
}
