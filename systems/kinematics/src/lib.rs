#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Kinematic smoothing that turns raw hand-tracking samples into gameplay
//! state.
//!
//! The landmark detector delivers noisy per-frame wrist positions and
//! pointing directions. This system exponentially smooths positions, slerps
//! directions, derives velocity from the smoothed trajectory (never from raw
//! input, which would amplify tracking jitter), and maintains a bounded
//! velocity history for the slash classifier's noise-rejecting average.

use std::collections::VecDeque;

use airslash_core::config::{ConfigError, SmoothingConfig};
use airslash_core::{HandSample, HandSide};
use glam::Vec3;

const UNIT_EPSILON: f32 = 1e-6;

/// Smoothed kinematic state of one hand.
///
/// Owned exclusively by the [`KinematicSmoother`], mutated every tracking
/// frame, and reset on tracking loss. The rendering layer polls it read-only
/// once per frame rather than being notified per update.
#[derive(Clone, Debug)]
pub struct HandKinematicState {
    position: Option<Vec3>,
    direction: Vec3,
    velocity: Vec3,
    history: VecDeque<Vec3>,
}

impl HandKinematicState {
    fn new(capacity: usize) -> Self {
        Self {
            position: None,
            direction: Vec3::Y,
            velocity: Vec3::ZERO,
            history: VecDeque::with_capacity(capacity),
        }
    }

    /// Smoothed wrist position, absent until the hand is first tracked.
    #[must_use]
    pub const fn position(&self) -> Option<Vec3> {
        self.position
    }

    /// Smoothed unit-length wrist-to-knuckle direction.
    ///
    /// Defaults to `+Y` before the first sample and holds its last value
    /// while the raw direction is absent.
    #[must_use]
    pub const fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Instantaneous velocity derived from the smoothed trajectory.
    ///
    /// Forced to zero on every frame the hand is untracked.
    #[must_use]
    pub const fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Bounded velocity history, oldest sample first.
    ///
    /// Cleared on tracking loss so reacquisition cannot replay stale
    /// high-velocity samples.
    #[must_use]
    pub const fn history(&self) -> &VecDeque<Vec3> {
        &self.history
    }

    fn reset(&mut self) {
        self.position = None;
        self.direction = Vec3::Y;
        self.velocity = Vec3::ZERO;
        self.history.clear();
    }
}

/// Converts raw per-frame hand samples into smoothed kinematic state.
#[derive(Clone, Debug)]
pub struct KinematicSmoother {
    config: SmoothingConfig,
    left: HandKinematicState,
    right: HandKinematicState,
}

impl KinematicSmoother {
    /// Creates a smoother with validated configuration.
    pub fn new(config: SmoothingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            left: HandKinematicState::new(config.history_capacity),
            right: HandKinematicState::new(config.history_capacity),
            config,
        })
    }

    /// Read-only access to one hand's smoothed state.
    #[must_use]
    pub const fn hand(&self, side: HandSide) -> &HandKinematicState {
        match side {
            HandSide::Left => &self.left,
            HandSide::Right => &self.right,
        }
    }

    /// Consumes one raw tracking sample, updating both hands in place.
    ///
    /// `dt` is the elapsed wall-clock time since the previous sample in
    /// seconds. A non-positive `dt` (duplicate timestamp) only moves the
    /// smoothed targets; velocity is left untouched so a repeated frame can
    /// never inject a spike.
    pub fn update(&mut self, sample: &HandSample, dt: f32) {
        let config = self.config;
        update_hand(
            &mut self.left,
            sample.position(HandSide::Left),
            sample.direction(HandSide::Left),
            dt,
            &config,
        );
        update_hand(
            &mut self.right,
            sample.position(HandSide::Right),
            sample.direction(HandSide::Right),
            dt,
            &config,
        );
    }

    /// Clears both hands back to their untracked state.
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}

fn update_hand(
    hand: &mut HandKinematicState,
    raw_position: Option<Vec3>,
    raw_direction: Option<Vec3>,
    dt: f32,
    config: &SmoothingConfig,
) {
    match raw_position {
        Some(raw) => {
            let previous = hand.position;
            let smoothed = match previous {
                Some(current) => {
                    let alpha = (config.position_factor * dt).clamp(0.0, 1.0);
                    current.lerp(raw, alpha)
                }
                // First acquisition: adopt the raw position outright instead
                // of sweeping in from the rest pose.
                None => raw,
            };
            hand.position = Some(smoothed);

            if dt > 0.0 {
                if let Some(current) = previous {
                    hand.velocity = (smoothed - current) / dt;
                    if hand.history.len() == config.history_capacity {
                        let _ = hand.history.pop_front();
                    }
                    hand.history.push_back(hand.velocity);
                }
            }
        }
        None => {
            // Graceful decay toward the rest pose instead of snapping, at a
            // much slower responsiveness than live tracking.
            if let Some(current) = hand.position {
                let alpha = (config.rest_factor * dt).clamp(0.0, 1.0);
                hand.position = Some(current.lerp(config.rest_position, alpha));
            }
            hand.velocity = Vec3::ZERO;
            hand.history.clear();
        }
    }

    if let Some(raw) = raw_direction {
        if raw.length_squared() > UNIT_EPSILON {
            let target = raw.normalize();
            let alpha = (config.direction_factor * dt).clamp(0.0, 1.0);
            hand.direction = slerp_unit(hand.direction, target, alpha);
        }
    }
}

/// Spherical interpolation between two unit vectors, re-normalized to
/// counter numerical drift.
fn slerp_unit(from: Vec3, to: Vec3, t: f32) -> Vec3 {
    let dot = from.dot(to).clamp(-1.0, 1.0);
    if dot > 1.0 - 1e-5 {
        return to;
    }
    if dot < -(1.0 - 1e-5) {
        // Antiparallel vectors leave the interpolation plane undefined;
        // jump to the target rather than pass through zero.
        return to;
    }

    let theta = dot.acos();
    let sin_theta = theta.sin();
    let blended =
        from * (((1.0 - t) * theta).sin() / sin_theta) + to * ((t * theta).sin() / sin_theta);
    let length = blended.length();
    if length > UNIT_EPSILON {
        blended / length
    } else {
        to
    }
}
