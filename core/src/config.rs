//! Tunable configuration for the gameplay pipeline.
//!
//! Every constant the pipeline depends on lives here as a config field with
//! a documented reference default. Configuration is validated once at
//! construction time; steady-state code never re-checks it.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{GridCell, GRID_COLUMNS};

/// Errors raised when a configuration value is malformed.
///
/// These are the only fatal conditions the core recognizes; they surface at
/// construction time, never mid-session.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A field that must be strictly positive was zero or negative.
    #[error("{field} must be strictly positive, got {value}")]
    NotPositive {
        /// Name of the offending field.
        field: &'static str,
        /// Value that failed validation.
        value: f32,
    },
    /// A capacity that must hold at least one element was zero.
    #[error("{field} must be at least 1")]
    ZeroCapacity {
        /// Name of the offending field.
        field: &'static str,
    },
    /// A window whose near bound must lie below its far bound was inverted.
    #[error("{field} near bound {near} is not below far bound {far}")]
    InvertedWindow {
        /// Name of the offending window.
        field: &'static str,
        /// Near bound supplied by the caller.
        near: f32,
        /// Far bound supplied by the caller.
        far: f32,
    },
}

fn require_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

/// Target approach and collision geometry.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameplayConfig {
    /// Speed targets travel along the approach axis, in world units/second.
    pub approach_speed: f32,
    /// Distance from the player plane at which targets materialize.
    pub spawn_distance: f32,
    /// Near Z bound of the window in which collision checks run.
    pub collision_near_z: f32,
    /// Far Z bound of the window in which collision checks run.
    pub collision_far_z: f32,
    /// Maximum hand-to-target distance that still counts as contact.
    pub hit_radius: f32,
    /// Z coordinate past which an unresolved target is marked missed.
    pub miss_z: f32,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            approach_speed: 8.0,
            spawn_distance: 16.0,
            collision_near_z: -1.2,
            collision_far_z: 1.2,
            hit_radius: 0.8,
            miss_z: 1.5,
        }
    }
}

impl GameplayConfig {
    /// Validates the configuration, rejecting malformed geometry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("approach_speed", self.approach_speed)?;
        require_positive("spawn_distance", self.spawn_distance)?;
        require_positive("hit_radius", self.hit_radius)?;
        if self.collision_near_z >= self.collision_far_z {
            return Err(ConfigError::InvertedWindow {
                field: "collision_window",
                near: self.collision_near_z,
                far: self.collision_far_z,
            });
        }
        Ok(())
    }

    /// Seconds a target needs to travel from spawn to the player plane.
    #[must_use]
    pub fn travel_time(&self) -> f32 {
        self.spawn_distance / self.approach_speed
    }
}

/// Slash validation and scoring thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Minimum slash speed for a strike to count as deliberate.
    pub min_slash_speed: f32,
    /// Maximum angular deviation from the required direction, in degrees.
    pub direction_tolerance_deg: f32,
    /// Streak interval after which the combo multiplier steps up.
    pub combo_step: u32,
    /// Upper bound on the combo multiplier.
    pub max_multiplier: f32,
    /// Accuracy both angle and position must reach for a perfect hit.
    pub perfect_threshold: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_slash_speed: 1.5,
            direction_tolerance_deg: 45.0,
            combo_step: 10,
            max_multiplier: 8.0,
            perfect_threshold: 0.9,
        }
    }
}

impl ScoringConfig {
    /// Validates the configuration, rejecting malformed thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("min_slash_speed", self.min_slash_speed)?;
        require_positive("direction_tolerance_deg", self.direction_tolerance_deg)?;
        require_positive("max_multiplier", self.max_multiplier)?;
        require_positive("perfect_threshold", self.perfect_threshold)?;
        if self.combo_step == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "combo_step",
            });
        }
        Ok(())
    }
}

/// Responsiveness of the hand kinematic smoother.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Exponential responsiveness toward the raw position, per second.
    pub position_factor: f32,
    /// Much slower responsiveness toward the rest pose while untracked.
    pub rest_factor: f32,
    /// Spherical responsiveness toward the raw direction, per second.
    pub direction_factor: f32,
    /// Pose the hand decays toward while tracking is lost.
    pub rest_position: Vec3,
    /// Capacity of the bounded velocity history.
    pub history_capacity: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            position_factor: 12.0,
            rest_factor: 2.0,
            direction_factor: 18.0,
            rest_position: Vec3::new(0.0, 1.0, 0.0),
            history_capacity: 8,
        }
    }
}

impl SmoothingConfig {
    /// Validates the configuration, rejecting malformed smoothing factors.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("position_factor", self.position_factor)?;
        require_positive("rest_factor", self.rest_factor)?;
        require_positive("direction_factor", self.direction_factor)?;
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "history_capacity",
            });
        }
        Ok(())
    }
}

/// Deterministic mapping from grid cells to world-space positions.
///
/// The mapping is a linear offset plus spacing constants with no randomness,
/// so chart data stays pure grid coordinates until spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    /// Horizontal spacing between adjacent columns, in world units.
    pub column_spacing: f32,
    /// Height of the bottom row above the floor, in world units.
    pub base_height: f32,
    /// Vertical spacing between adjacent rows, in world units.
    pub row_spacing: f32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            column_spacing: 0.6,
            base_height: 0.8,
            row_spacing: 0.55,
        }
    }
}

impl GridLayout {
    /// Validates the configuration, rejecting degenerate spacing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_positive("column_spacing", self.column_spacing)?;
        require_positive("row_spacing", self.row_spacing)?;
        Ok(())
    }

    /// World-space position of a grid cell on the player plane (`z = 0`).
    ///
    /// Columns are centered around the approach axis so the grid straddles
    /// the player symmetrically.
    #[must_use]
    pub fn world_position(&self, cell: GridCell) -> Vec3 {
        let center_offset = (GRID_COLUMNS as f32 - 1.0) / 2.0;
        Vec3::new(
            (cell.column() as f32 - center_offset) * self.column_spacing,
            self.base_height + cell.row() as f32 * self.row_spacing,
            0.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GameplayConfig, GridLayout, ScoringConfig, SmoothingConfig};
    use crate::GridCell;

    #[test]
    fn default_configs_validate() {
        GameplayConfig::default().validate().expect("gameplay");
        ScoringConfig::default().validate().expect("scoring");
        SmoothingConfig::default().validate().expect("smoothing");
        GridLayout::default().validate().expect("layout");
    }

    #[test]
    fn negative_approach_speed_is_rejected() {
        let config = GameplayConfig {
            approach_speed: -1.0,
            ..GameplayConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "approach_speed",
                value: -1.0,
            })
        );
    }

    #[test]
    fn inverted_collision_window_is_rejected() {
        let config = GameplayConfig {
            collision_near_z: 2.0,
            collision_far_z: -2.0,
            ..GameplayConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedWindow { .. })
        ));
    }

    #[test]
    fn zero_history_capacity_is_rejected() {
        let config = SmoothingConfig {
            history_capacity: 0,
            ..SmoothingConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity {
                field: "history_capacity",
            })
        );
    }

    #[test]
    fn grid_columns_are_centered() {
        let layout = GridLayout::default();
        let leftmost = layout.world_position(GridCell::new(0, 0));
        let rightmost = layout.world_position(GridCell::new(3, 0));
        assert!((leftmost.x + rightmost.x).abs() < 1e-6);
        assert!(leftmost.x < 0.0);
    }

    #[test]
    fn grid_rows_rise_with_index() {
        let layout = GridLayout::default();
        let bottom = layout.world_position(GridCell::new(1, 0));
        let top = layout.world_position(GridCell::new(1, 2));
        assert!(top.y > bottom.y);
        assert!((top.y - bottom.y - 2.0 * layout.row_spacing).abs() < 1e-6);
    }

    #[test]
    fn travel_time_derives_from_geometry() {
        let config = GameplayConfig::default();
        assert!((config.travel_time() - 2.0).abs() < 1e-6);
    }
}
