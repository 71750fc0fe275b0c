//! Watch-list state and the event-to-mutation rules.

use std::collections::HashMap;

use presence_common::{
    MemberEntry, MemberListUpdate, MembershipUpdate, PresenceStatus, Ready, StatusUpdate,
    CUSTOM_STATUS_LABEL,
};

use crate::config::WatchConfig;

use super::{render, RenderTuple};

/// Derived presence state for one configured entity. Created at startup,
/// mutated only through the tracker, never removed.
#[derive(Debug, Clone)]
pub struct WatchedEntity {
    pub display_name: String,
    pub joined: bool,
    pub status: PresenceStatus,
    pub activity: Option<String>,
}

impl WatchedEntity {
    fn new(display_name: String) -> Self {
        Self {
            display_name,
            joined: false,
            status: PresenceStatus::Offline,
            activity: None,
        }
    }
}

/// Maps watch-list entity ids to derived presence state.
///
/// The watch-list is a filter: events naming entities outside it are
/// silently ignored. Every mutation yields the render tuples of the
/// entities it touched, in event order.
pub struct PresenceTracker {
    entities: HashMap<String, WatchedEntity>,
    groups: HashMap<String, bool>,
}

impl PresenceTracker {
    pub fn from_config(watch: &WatchConfig) -> Self {
        let entities = watch
            .entities
            .iter()
            .map(|(id, name)| (id.clone(), WatchedEntity::new(name.clone())))
            .collect();
        Self {
            entities,
            groups: watch.groups.clone(),
        }
    }

    /// Whether a group id is on the watch-list.
    pub fn watches_group(&self, id: &str) -> bool {
        self.groups.get(id).copied().unwrap_or(false)
    }

    /// Seed `joined` from the ready enumeration. Entities absent from every
    /// watched group keep their defaults.
    pub fn apply_ready(&mut self, ready: &Ready) -> Vec<RenderTuple> {
        let mut changed = Vec::new();
        for group in &ready.groups {
            if !self.watches_group(&group.id) {
                continue;
            }
            for occupancy in &group.occupants {
                if let Some(entity) = self.entities.get_mut(&occupancy.entity_id) {
                    entity.joined = occupancy.channel_id.is_some();
                    changed.push(render(entity));
                }
            }
        }
        changed
    }

    /// Apply a status-changed event: status plus first listed activity.
    pub fn apply_status_update(&mut self, event: &StatusUpdate) -> Option<RenderTuple> {
        let entity = self.entities.get_mut(&event.entity.id)?;
        entity.status = event.status;
        entity.activity = event.activities.first().map(|a| a.name.clone());
        Some(render(entity))
    }

    /// Apply a joined/left-channel event: joined iff a destination channel
    /// id is present.
    pub fn apply_membership_update(&mut self, event: &MembershipUpdate) -> Option<RenderTuple> {
        let entity = self.entities.get_mut(&event.entity_id)?;
        entity.joined = event.channel_id.is_some();
        Some(render(entity))
    }

    /// Apply a paginated member-list page. Each entry updates status and
    /// activity like a status-changed event, except that the custom-status
    /// label is replaced by the custom text itself.
    pub fn apply_member_list_update(&mut self, event: &MemberListUpdate) -> Vec<RenderTuple> {
        let mut changed = Vec::new();
        for op in &event.ops {
            for entry in op.entries() {
                if let Some(tuple) = self.apply_member_entry(entry) {
                    changed.push(tuple);
                }
            }
        }
        changed
    }

    fn apply_member_entry(&mut self, entry: &MemberEntry) -> Option<RenderTuple> {
        let entity = self.entities.get_mut(&entry.entity.id)?;
        entity.status = entry.status;
        entity.activity = match entry.activities.first() {
            Some(activity) if activity.name == CUSTOM_STATUS_LABEL => activity.state.clone(),
            Some(activity) => Some(activity.name.clone()),
            None => None,
        };
        Some(render(entity))
    }
}
