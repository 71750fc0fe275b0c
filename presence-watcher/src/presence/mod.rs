//! Presence derivation for the watch-list.

mod render;
mod tracker;

pub use render::{color, headline, render, RenderTuple};
pub use tracker::{PresenceTracker, WatchedEntity};
