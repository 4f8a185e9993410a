//! Persisted group settings.
//!
//! The exchange format is `{"group_name": ..., "mappings": [...]}` with
//! exactly the [`Mapping`] field set, so a file written by one session
//! round-trips unchanged through another. File dialogs and host-side
//! import/export flows live with the host; this module owns the format.

use serde::{Deserialize, Serialize};

use crate::group::{Group, Mapping};

/// On-disk form of one group's mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupConfig {
    pub group_name: String,
    pub mappings: Vec<Mapping>,
}

impl GroupConfig {
    /// Capture a group's persistable settings.
    pub fn from_group(group: &Group) -> Self {
        Self {
            group_name: group.name.clone(),
            mappings: group.mappings.clone(),
        }
    }

    /// Build a fresh group from imported settings. Control point starts
    /// centered; tracker configuration is not part of the exchange format
    /// and stays at defaults.
    pub fn into_group(self) -> Group {
        Group {
            name: self.group_name,
            mappings: self.mappings,
            ..Group::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Structural problems with the imported settings.
    pub fn validate(&self) -> Vec<String> {
        self.clone().into_group().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::{BlendMode, TargetRef, TransformProperty};

    #[test]
    fn test_group_config_round_trip() {
        let mut group = Group::new("Mouth");
        group.mappings.push(Mapping {
            target: TargetRef::Bone {
                bone: "jaw".to_string(),
                property: TransformProperty::Rotation,
                axis: 2,
            },
            anchor_x: 0.0,
            anchor_y: -1.0,
            radius: 1.5,
            blend_mode: BlendMode::AxisY,
            magnitude: 0.4,
        });
        group.mappings.push(Mapping::new(
            TargetRef::Channel {
                channel: "smile".to_string(),
            },
            1.0,
            0.0,
        ));

        let config = GroupConfig::from_group(&group);
        let json = config.to_json().unwrap();
        let restored = GroupConfig::from_json(&json).unwrap();
        assert_eq!(config, restored);
        assert_eq!(restored.into_group().mappings, group.mappings);
    }

    #[test]
    fn test_blend_mode_wire_names() {
        let json = serde_json::to_string(&BlendMode::AxisX).unwrap();
        assert_eq!(json, "\"AXIS_X\"");
        let mode: BlendMode = serde_json::from_str("\"RADIAL\"").unwrap();
        assert_eq!(mode, BlendMode::Radial);
    }

    #[test]
    fn test_rejects_unknown_json() {
        assert!(GroupConfig::from_json("{\"mappings\": 3}").is_err());
        assert!(GroupConfig::from_json("not json").is_err());
    }
}
