#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame collision pass that turns slashes into resolution commands.
//!
//! Every pending target inside the collision window is tested against its
//! assigned hand: the hand must be tracked, within the hit radius, and
//! moving fast enough in close enough to the required direction for the
//! scorer to accept. Accepted strikes become [`Command::ResolveTarget`];
//! everything else is silently left pending, so a still-approaching target
//! remains eligible on later frames until it crosses the miss plane.

use airslash_core::config::{GameplayConfig, ScoringConfig};
use airslash_core::{Command, GamePhase, StreakState, TargetState, TargetView};
use airslash_system_kinematics::KinematicSmoother;
use airslash_system_slash as slash;

/// Pure system that evaluates slashes against live targets each frame.
///
/// The hand's history-averaged velocity is scored rather than the
/// instantaneous sample, so one frame of tracking jitter cannot flip a
/// judgment.
#[derive(Debug, Default)]
pub struct Collision;

impl Collision {
    /// Creates a new collision system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Tests every eligible target and emits resolution commands for hits.
    pub fn handle(
        &mut self,
        phase: GamePhase,
        smoother: &KinematicSmoother,
        targets: &TargetView,
        streak: &StreakState,
        gameplay: &GameplayConfig,
        scoring: &ScoringConfig,
        out: &mut Vec<Command>,
    ) {
        if phase != GamePhase::Playing {
            return;
        }

        for target in targets.iter() {
            if target.state != TargetState::Pending {
                continue;
            }
            if target.position.z < gameplay.collision_near_z
                || target.position.z > gameplay.collision_far_z
            {
                continue;
            }

            let hand = smoother.hand(target.spec.hand);
            let Some(hand_position) = hand.position() else {
                continue;
            };

            let hit_distance = hand_position.distance(target.position);
            if hit_distance > gameplay.hit_radius {
                continue;
            }

            let velocity = slash::average_velocity(hand.history());
            let result = slash::score_hit(
                velocity,
                target.spec.direction,
                hit_distance,
                gameplay.hit_radius,
                streak.current,
                scoring,
            );

            if result.hit {
                out.push(Command::ResolveTarget {
                    target: target.id,
                    result,
                });
            }
        }
    }
}
