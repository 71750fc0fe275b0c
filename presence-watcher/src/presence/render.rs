//! Mapping from entity state to the display-ready render tuple.
//!
//! [`render`] is a pure function of the entity's current state; identical
//! state always yields an identical tuple. No history is consulted.

use presence_common::PresenceStatus;

use super::WatchedEntity;

/// Display colors per derived state.
pub mod color {
    pub const OFFLINE: &str = "#333333";
    pub const ONLINE: &str = "#008800";
    pub const IDLE: &str = "#cc9900";
    pub const BUSY: &str = "#e24f38";
    pub const JOINED: &str = "#008800";
    pub const UNKNOWN: &str = "#000000";
}

/// Localized headline labels.
pub mod headline {
    pub const OFFLINE: &str = "オフライン";
    pub const ONLINE: &str = "オンライン";
    pub const IDLE: &str = "離席中";
    pub const BUSY: &str = "取り込み中";
    pub const JOINED_PREFIX: &str = "JOINED ";
}

/// The display-ready summary handed to the external renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTuple {
    pub display_name: String,
    pub color: String,
    pub headline: String,
}

impl RenderTuple {
    /// The single-argument form the renderer program receives.
    pub fn as_argument(&self) -> String {
        format!("{},{},{}", self.display_name, self.color, self.headline)
    }
}

/// Derive the render tuple for an entity's current state.
///
/// A joined entity always gets the joined color and the `JOINED ` prefix;
/// otherwise the color follows the status. The headline body is the
/// activity when present, else the localized status label.
pub fn render(entity: &WatchedEntity) -> RenderTuple {
    let (color, prefix, base) = if entity.joined {
        (color::JOINED, headline::JOINED_PREFIX, headline::ONLINE)
    } else {
        let color = match entity.status {
            PresenceStatus::Offline => color::OFFLINE,
            PresenceStatus::Online => color::ONLINE,
            PresenceStatus::Idle => color::IDLE,
            PresenceStatus::Busy => color::BUSY,
            PresenceStatus::Unknown => color::UNKNOWN,
        };
        (color, "", headline::OFFLINE)
    };

    let body = match &entity.activity {
        Some(activity) => activity.clone(),
        None => match entity.status {
            PresenceStatus::Online => headline::ONLINE.to_string(),
            PresenceStatus::Idle => headline::IDLE.to_string(),
            PresenceStatus::Busy => headline::BUSY.to_string(),
            _ => base.to_string(),
        },
    };

    RenderTuple {
        display_name: entity.display_name.clone(),
        color: color.to_string(),
        headline: format!("{}{}", prefix, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(joined: bool, status: PresenceStatus, activity: Option<&str>) -> WatchedEntity {
        WatchedEntity {
            display_name: "alice".to_string(),
            joined,
            status,
            activity: activity.map(str::to_string),
        }
    }

    #[test]
    fn test_idle_without_activity_uses_idle_label_and_color() {
        let tuple = render(&entity(false, PresenceStatus::Idle, None));
        assert_eq!(tuple.color, color::IDLE);
        assert_eq!(tuple.headline, headline::IDLE);
    }

    #[test]
    fn test_activity_overrides_status_label() {
        let tuple = render(&entity(false, PresenceStatus::Busy, Some("deep work")));
        assert_eq!(tuple.color, color::BUSY);
        assert_eq!(tuple.headline, "deep work");
    }

    #[test]
    fn test_joined_forces_color_and_prefix_regardless_of_status() {
        let tuple = render(&entity(true, PresenceStatus::Offline, None));
        assert_eq!(tuple.color, color::JOINED);
        assert_eq!(tuple.headline, format!("{}{}", headline::JOINED_PREFIX, headline::ONLINE));
    }

    #[test]
    fn test_joined_keeps_activity_in_headline() {
        let tuple = render(&entity(true, PresenceStatus::Idle, Some("練習中")));
        assert_eq!(tuple.color, color::JOINED);
        assert_eq!(tuple.headline, "JOINED 練習中");
    }

    #[test]
    fn test_unknown_status_falls_back_to_offline_label() {
        let tuple = render(&entity(false, PresenceStatus::Unknown, None));
        assert_eq!(tuple.color, color::UNKNOWN);
        assert_eq!(tuple.headline, headline::OFFLINE);
    }

    #[test]
    fn test_render_is_idempotent() {
        let state = entity(false, PresenceStatus::Online, Some("listening"));
        assert_eq!(render(&state), render(&state));
    }

    #[test]
    fn test_as_argument_joins_fields() {
        let tuple = render(&entity(false, PresenceStatus::Offline, None));
        assert_eq!(tuple.as_argument(), format!("alice,{},{}", color::OFFLINE, headline::OFFLINE));
    }
}
