#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Slash classification and hit scoring.
//!
//! Pure functions that turn a hand velocity into a discrete slash direction,
//! measure its angular deviation from a target's requirement, and grade a
//! strike into a [`HitResult`]. Degenerate geometry (near-zero vectors) is
//! answered with worst-case sentinels, never with NaN.

use airslash_core::config::ScoringConfig;
use airslash_core::{HitResult, SlashDirection};
use glam::{Vec2, Vec3};
use std::collections::VecDeque;

/// Squared magnitude below which a velocity has no discernible direction.
const DIRECTION_EPSILON_SQ: f32 = 1e-6;

/// Fraction of the dominant axis magnitude the weaker axis must exceed
/// before a slash counts as diagonal.
const DIAGONAL_THRESHOLD: f32 = 0.4;

/// Angular deviation reported for motion with no discernible direction.
const WORST_DEVIATION_DEG: f32 = 180.0;

/// Point budget awarded for angular accuracy.
const ANGLE_POINTS: f32 = 70.0;

/// Point budget awarded for swing speed.
const SPEED_POINTS: f32 = 15.0;

/// Point budget awarded for positional accuracy.
const POSITION_POINTS: f32 = 15.0;

/// Speed sub-scores saturate at this multiple of the minimum slash speed.
const SPEED_SATURATION_FACTOR: f32 = 3.0;

/// Combo multiplier gained per completed combo step.
const COMBO_INCREMENT: f32 = 0.1;

/// Classifies a velocity into one of the eight compass slash directions.
///
/// The velocity is projected onto the camera-facing XY plane. When both axis
/// magnitudes exceed [`DIAGONAL_THRESHOLD`] times the dominant magnitude the
/// sign combination selects a diagonal; otherwise the dominant axis selects
/// a cardinal direction. Scaling the velocity by any positive constant never
/// changes the classification.
///
/// Returns `None` for near-zero motion, which has no well-defined direction;
/// callers must treat that as an automatic direction mismatch rather than a
/// crash.
#[must_use]
pub fn classify_direction(velocity: Vec3) -> Option<SlashDirection> {
    let planar = Vec2::new(velocity.x, velocity.y);
    if planar.length_squared() < DIRECTION_EPSILON_SQ {
        return None;
    }

    let abs_x = planar.x.abs();
    let abs_y = planar.y.abs();
    let diagonal_bar = DIAGONAL_THRESHOLD * abs_x.max(abs_y);

    if abs_x > diagonal_bar && abs_y > diagonal_bar {
        return Some(match (planar.x > 0.0, planar.y > 0.0) {
            (true, true) => SlashDirection::UpRight,
            (false, true) => SlashDirection::UpLeft,
            (true, false) => SlashDirection::DownRight,
            (false, false) => SlashDirection::DownLeft,
        });
    }

    if abs_x >= abs_y {
        if planar.x > 0.0 {
            Some(SlashDirection::Right)
        } else {
            Some(SlashDirection::Left)
        }
    } else if planar.y > 0.0 {
        Some(SlashDirection::Up)
    } else {
        Some(SlashDirection::Down)
    }
}

/// Angular deviation in degrees between a velocity and a required direction.
///
/// [`SlashDirection::Any`] is trivially satisfied and reports zero. A
/// velocity whose XY projection is below epsilon reports the worst case of
/// 180 degrees. The dot product is clamped before the arccosine so
/// floating-point overshoot can never produce a domain error.
#[must_use]
pub fn angle_deviation_deg(velocity: Vec3, required: SlashDirection) -> f32 {
    let Some(required_unit) = required.unit_xy() else {
        return 0.0;
    };

    let planar = Vec2::new(velocity.x, velocity.y);
    if planar.length_squared() < DIRECTION_EPSILON_SQ {
        return WORST_DEVIATION_DEG;
    }

    let cosine = planar.normalize().dot(required_unit).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Arithmetic mean of the bounded velocity history.
///
/// Averaging is a deliberate noise-rejection step: a single frame of
/// tracking jitter must not swing the classified direction. An empty history
/// yields the zero vector.
#[must_use]
pub fn average_velocity(history: &VecDeque<Vec3>) -> Vec3 {
    if history.is_empty() {
        return Vec3::ZERO;
    }
    history.iter().copied().sum::<Vec3>() / history.len() as f32
}

/// Grades one slash attempt against one target.
///
/// Rejections are silent: a swing below the minimum speed or outside the
/// direction tolerance yields [`HitResult::rejected`] and the caller decides
/// whether the target remains eligible for a later attempt. Accepted hits
/// combine three budgeted sub-scores and apply the streak's combo
/// multiplier.
#[must_use]
pub fn score_hit(
    velocity: Vec3,
    required: SlashDirection,
    hit_distance: f32,
    hit_radius: f32,
    streak: u32,
    config: &ScoringConfig,
) -> HitResult {
    let speed = velocity.length();
    if speed < config.min_slash_speed {
        return HitResult::rejected();
    }

    let deviation = angle_deviation_deg(velocity, required);
    if required != SlashDirection::Any && deviation > config.direction_tolerance_deg {
        return HitResult::rejected();
    }

    let angle_accuracy = (1.0 - deviation / config.direction_tolerance_deg).max(0.0);
    let speed_accuracy = (speed / (SPEED_SATURATION_FACTOR * config.min_slash_speed)).min(1.0);
    let position_accuracy = (1.0 - hit_distance / hit_radius).max(0.0);

    let base = angle_accuracy * ANGLE_POINTS
        + speed_accuracy * SPEED_POINTS
        + position_accuracy * POSITION_POINTS;
    let multiplier = combo_multiplier(streak, config);
    let score = (base * multiplier).round() as u32;

    let perfect = angle_accuracy >= config.perfect_threshold
        && position_accuracy >= config.perfect_threshold;

    HitResult {
        hit: true,
        score,
        angle_accuracy,
        speed_accuracy,
        position_accuracy,
        perfect,
    }
}

/// Combo multiplier for the provided streak.
///
/// A non-decreasing step function: one tenth per completed combo step,
/// capped at the configured maximum multiplier.
#[must_use]
pub fn combo_multiplier(streak: u32, config: &ScoringConfig) -> f32 {
    let steps = (streak / config.combo_step) as f32;
    1.0 + (steps * COMBO_INCREMENT).min(config.max_multiplier - 1.0)
}
