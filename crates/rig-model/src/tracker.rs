//! Per-axis landmark extraction configuration.
//!
//! Tracker settings are edited on the group but treated as read-only for
//! the duration of a session: the consumer snapshots them into a
//! [`TrackerConfigSet`] once per tick and hands that immutable value to
//! the acquisition thread.

use serde::{Deserialize, Serialize};

use crate::landmark::LANDMARK_COUNT;

/// Which control-point component an axis config drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// How a raw scalar is extracted from a landmark frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractionMode {
    /// Axis is not tracked; raw value is 0.
    #[default]
    None,
    /// Distance between two configured landmarks over face width.
    TwoPointDistance,
    /// Landmark delta projected onto a face-local basis vector.
    OnePointProjection,
    /// Iris offset within the eye opening.
    Iris,
}

/// Extraction settings for one group axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisTrackerConfig {
    pub mode: ExtractionMode,

    /// Source landmark indices (`0..478`). Which one each extraction
    /// mode consumes depends on the mode; iris uses `point_b` to select
    /// the eye.
    pub point_a: usize,
    pub point_b: usize,

    /// Raw input range: values at or below `in_min` map to `out_min`,
    /// at or above `in_max` to `out_max`.
    pub in_min: f64,
    pub in_max: f64,

    /// Output range of the linear rescale.
    pub out_min: f64,
    pub out_max: f64,

    /// Multiplier applied after normalization.
    pub gain: f64,

    /// Exponent of the iris sign-preserving power curve.
    pub exponent: f64,

    /// Optional output EMA factor in `(0.0, 1.0]`; `None` disables
    /// temporal smoothing.
    pub smoothing: Option<f64>,
}

impl Default for AxisTrackerConfig {
    fn default() -> Self {
        Self {
            mode: ExtractionMode::None,
            point_a: 0,
            point_b: 0,
            in_min: 0.0,
            in_max: 1.0,
            out_min: 0.0,
            out_max: 1.0,
            gain: 1.0,
            exponent: 1.2,
            smoothing: None,
        }
    }
}

impl AxisTrackerConfig {
    /// Check ranges serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.point_a >= LANDMARK_COUNT || self.point_b >= LANDMARK_COUNT {
            return Err(format!(
                "landmark index out of range (points {}, {}; max {})",
                self.point_a,
                self.point_b,
                LANDMARK_COUNT - 1
            ));
        }
        if let Some(factor) = self.smoothing {
            if !(factor > 0.0 && factor <= 1.0) {
                return Err(format!("smoothing factor {factor} outside (0, 1]"));
            }
        }
        Ok(())
    }

    /// Whether this axis produces values at all.
    pub fn is_active(&self) -> bool {
        self.mode != ExtractionMode::None
    }
}

/// Tracker settings for one group, keyed by its UID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupTrackerConfig {
    pub uid: String,
    pub x: AxisTrackerConfig,
    pub y: AxisTrackerConfig,
}

impl GroupTrackerConfig {
    pub fn axis(&self, axis: Axis) -> &AxisTrackerConfig {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Immutable snapshot of every group's tracker settings, built once per
/// consumer tick and published to the acquisition thread.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackerConfigSet {
    pub groups: Vec<GroupTrackerConfig>,
}

impl TrackerConfigSet {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups with at least one tracked axis.
    pub fn active_groups(&self) -> impl Iterator<Item = &GroupTrackerConfig> {
        self.groups
            .iter()
            .filter(|g| g.x.is_active() || g.y.is_active())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_axis_config_is_inert_and_valid() {
        let config = AxisTrackerConfig::default();
        assert!(!config.is_active());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range_landmark() {
        let config = AxisTrackerConfig {
            point_a: LANDMARK_COUNT,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_smoothing() {
        let config = AxisTrackerConfig {
            smoothing: Some(0.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
