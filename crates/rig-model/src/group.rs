//! Groups, mappings, and the 2D control point they share.

use serde::{Deserialize, Serialize};

/// Anchors within this epsilon of an axis let `AUTO` collapse to a
/// single-axis falloff.
pub const AXIS_EPSILON: f64 = 0.001;

/// The live 2D driver value for a group.
///
/// Both components are clamped to `[-1.0, 1.0]` on every write; external
/// producers (UDP, tracker, preset recall) all go through [`ControlPoint::set`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlPoint {
    x: f64,
    y: f64,
}

impl ControlPoint {
    /// Create a control point, clamping both components.
    pub fn new(x: f64, y: f64) -> Self {
        let mut point = Self::default();
        point.set(x, y);
        point
    }

    /// Write both components, re-clamping into `[-1.0, 1.0]`.
    pub fn set(&mut self, x: f64, y: f64) {
        self.x = x.clamp(-1.0, 1.0);
        self.y = y.clamp(-1.0, 1.0);
    }

    /// Return to center.
    pub fn reset(&mut self) {
        self.x = 0.0;
        self.y = 0.0;
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Transform component a continuous mapping drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformProperty {
    Location,
    Rotation,
    Scale,
}

/// What a mapping writes to.
///
/// Bone and object transform targets are continuous additive: deltas from
/// mappings sharing a target are summed. Channel targets are named
/// discrete outputs combined by maximum weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetRef {
    /// A pose-bone property on the owning armature object.
    Bone {
        bone: String,
        property: TransformProperty,
        axis: usize,
    },

    /// A transform property on the owning object itself.
    Object {
        property: TransformProperty,
        axis: usize,
    },

    /// A named weight channel (e.g. a shape key).
    Channel { channel: String },
}

impl TargetRef {
    /// Whether this target is a named discrete channel.
    pub fn is_channel(&self) -> bool {
        matches!(self, TargetRef::Channel { .. })
    }

    /// The transform property driven by a continuous target.
    pub fn transform_property(&self) -> Option<TransformProperty> {
        match self {
            TargetRef::Bone { property, .. } | TargetRef::Object { property, .. } => {
                Some(*property)
            }
            TargetRef::Channel { .. } => None,
        }
    }

    /// The name carried by this target, if any.
    pub fn name(&self) -> Option<&str> {
        match self {
            TargetRef::Bone { bone, .. } => Some(bone),
            TargetRef::Channel { channel } => Some(channel),
            TargetRef::Object { .. } => None,
        }
    }

    /// Same target with its carried name replaced.
    fn with_name(&self, name: String) -> Self {
        match self {
            TargetRef::Bone { property, axis, .. } => TargetRef::Bone {
                bone: name,
                property: *property,
                axis: *axis,
            },
            TargetRef::Channel { .. } => TargetRef::Channel { channel: name },
            TargetRef::Object { .. } => self.clone(),
        }
    }
}

/// Distance metric for a mapping's falloff weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlendMode {
    /// Pick AXIS_X / AXIS_Y / BOX from the anchor position.
    #[default]
    Auto,
    /// Chebyshev distance.
    Box,
    /// Euclidean distance.
    Radial,
    /// Horizontal distance only.
    AxisX,
    /// Vertical distance only.
    AxisY,
}

/// One weighted target entry within a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    /// What this mapping drives.
    pub target: TargetRef,

    /// Anchor position in control-point space scaled by the group limit.
    pub anchor_x: f64,
    pub anchor_y: f64,

    /// Falloff radius; non-positive radii contribute weight 0.
    pub radius: f64,

    /// Falloff distance metric.
    pub blend_mode: BlendMode,

    /// Peak contribution for continuous additive targets. Ignored for
    /// channel targets, whose output is the bare weight.
    pub magnitude: f64,
}

impl Mapping {
    /// A unit-radius mapping anchored at `(anchor_x, anchor_y)`.
    pub fn new(target: TargetRef, anchor_x: f64, anchor_y: f64) -> Self {
        Self {
            target,
            anchor_x,
            anchor_y,
            radius: 1.0,
            blend_mode: BlendMode::Auto,
            magnitude: 1.0,
        }
    }
}

/// Named bundle of one control point, its mappings, and per-axis tracker
/// configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub control: ControlPoint,
    pub mappings: Vec<Mapping>,

    /// Landmark extraction settings for the horizontal axis.
    pub tracker_x: crate::tracker::AxisTrackerConfig,
    /// Landmark extraction settings for the vertical axis.
    pub tracker_y: crate::tracker::AxisTrackerConfig,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Per-group normalization scale: the largest anchor component
    /// magnitude across all mappings, floored at 1.0.
    pub fn limit(&self) -> f64 {
        self.mappings
            .iter()
            .flat_map(|m| [m.anchor_x.abs(), m.anchor_y.abs()])
            .fold(1.0, f64::max)
    }

    /// Structural problems a host UI should surface before a session.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.name.is_empty() {
            issues.push("group has no name".to_string());
        }
        for (index, mapping) in self.mappings.iter().enumerate() {
            if mapping.radius <= 0.0 {
                issues.push(format!(
                    "mapping {index} has non-positive radius {}",
                    mapping.radius
                ));
            }
        }
        if let Err(issue) = self.tracker_x.validate() {
            issues.push(format!("tracker x: {issue}"));
        }
        if let Err(issue) = self.tracker_y.validate() {
            issues.push(format!("tracker y: {issue}"));
        }
        issues
    }
}

/// Derive symmetric mappings for suffixed target names.
///
/// Targets ending in `.L`/`.R` (or `_L`/`_R`, ` L`/` R`) produce a
/// counterpart with the suffix swapped and `anchor_x` flipped. Targets
/// whose mirrored name is already mapped in the group are skipped, as are
/// object targets (no name to mirror). Whether the mirrored bone/channel
/// actually exists is for the host to check.
pub fn mirrored_mappings(group: &Group) -> Vec<Mapping> {
    let mut mirrored = Vec::new();
    for mapping in &group.mappings {
        let Some(name) = mapping.target.name() else {
            continue;
        };
        let Some(counterpart) = mirror_name(name) else {
            continue;
        };
        let target = mapping.target.with_name(counterpart);
        let already_mapped = group
            .mappings
            .iter()
            .chain(mirrored.iter())
            .any(|existing: &Mapping| existing.target == target);
        if already_mapped {
            continue;
        }
        mirrored.push(Mapping {
            target,
            anchor_x: -mapping.anchor_x,
            anchor_y: mapping.anchor_y,
            radius: mapping.radius,
            blend_mode: mapping.blend_mode,
            magnitude: mapping.magnitude,
        });
    }
    mirrored
}

fn mirror_name(name: &str) -> Option<String> {
    for (left, right) in [(".L", ".R"), ("_L", "_R"), (" L", " R")] {
        if let Some(stem) = name.strip_suffix(left) {
            return Some(format!("{stem}{right}"));
        }
        if let Some(stem) = name.strip_suffix(right) {
            return Some(format!("{stem}{left}"));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(name: &str) -> TargetRef {
        TargetRef::Channel {
            channel: name.to_string(),
        }
    }

    #[test]
    fn test_control_point_clamps_on_write() {
        let mut point = ControlPoint::default();
        point.set(2.5, -7.0);
        assert_eq!(point.x(), 1.0);
        assert_eq!(point.y(), -1.0);
    }

    #[test]
    fn test_limit_floors_at_one() {
        let group = Group::new("Mouth");
        assert_eq!(group.limit(), 1.0);
    }

    #[test]
    fn test_limit_takes_largest_anchor_component() {
        let mut group = Group::new("Mouth");
        group.mappings.push(Mapping::new(channel("wide"), 2.0, 0.0));
        group
            .mappings
            .push(Mapping::new(channel("open"), 0.0, -3.0));
        assert_eq!(group.limit(), 3.0);
    }

    #[test]
    fn test_mirrored_mapping_flips_anchor_x() {
        let mut group = Group::new("Brows");
        group
            .mappings
            .push(Mapping::new(channel("brow_up.L"), 0.75, 0.5));

        let mirrored = mirrored_mappings(&group);
        assert_eq!(mirrored.len(), 1);
        assert_eq!(mirrored[0].target, channel("brow_up.R"));
        assert_eq!(mirrored[0].anchor_x, -0.75);
        assert_eq!(mirrored[0].anchor_y, 0.5);
    }

    #[test]
    fn test_mirror_skips_existing_and_unsuffixed() {
        let mut group = Group::new("Brows");
        group
            .mappings
            .push(Mapping::new(channel("brow_up.L"), 0.75, 0.5));
        group
            .mappings
            .push(Mapping::new(channel("brow_up.R"), -0.75, 0.5));
        group.mappings.push(Mapping::new(channel("jaw"), 0.0, -1.0));

        assert!(mirrored_mappings(&group).is_empty());
    }

    #[test]
    fn test_validate_flags_bad_radius() {
        let mut group = Group::new("Mouth");
        let mut mapping = Mapping::new(channel("open"), 0.0, 1.0);
        mapping.radius = 0.0;
        group.mappings.push(mapping);
        assert_eq!(group.validate().len(), 1);
    }
}
