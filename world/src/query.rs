//! Read-only queries over the authoritative session state.
//!
//! Systems and the presentation layer poll these snapshots once per frame
//! instead of subscribing to per-mutation notifications.

use airslash_core::config::{GameplayConfig, GridLayout};
use airslash_core::{GamePhase, SessionReport, StreakState, TargetView};

use crate::{snapshot_targets, World};

/// Current lifecycle phase of the session.
#[must_use]
pub fn phase(world: &World) -> GamePhase {
    world.phase
}

/// Last audio playback position the world ticked to, in seconds.
#[must_use]
pub fn audio_time(world: &World) -> f32 {
    world.audio_time
}

/// Snapshot view of every live target, sorted by identifier.
#[must_use]
pub fn target_view(world: &World) -> TargetView {
    TargetView::from_snapshots(snapshot_targets(world))
}

/// Copy of the running combo and accuracy counters.
#[must_use]
pub fn streak(world: &World) -> StreakState {
    world.streak
}

/// Aggregated score summary for the session so far.
#[must_use]
pub fn session_report(world: &World) -> SessionReport {
    world.report()
}

/// Approach and collision geometry the world was constructed with.
#[must_use]
pub fn gameplay_config(world: &World) -> &GameplayConfig {
    &world.gameplay
}

/// Grid-to-world mapping the world was constructed with.
#[must_use]
pub fn grid_layout(world: &World) -> &GridLayout {
    &world.layout
}
