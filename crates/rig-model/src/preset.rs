//! Global presets: named snapshots of every control point in the rig.

use serde::{Deserialize, Serialize};

/// One group's saved control-point coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetState {
    pub object: String,
    pub group: String,
    pub x: f64,
    pub y: f64,
}

/// A named collection of control-point states across the whole rig.
///
/// Recall writes each state back through the clamping setter and
/// re-evaluates the affected groups; groups that no longer exist are
/// skipped.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub states: Vec<PresetState>,
}

impl Preset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            states: Vec::new(),
        }
    }
}
