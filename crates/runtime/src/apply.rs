//! Applying blend output through the host.

use rigpad_processing_core::compute;
use rigpad_rig_model::{Group, Rig, TransformProperty};

use crate::host::AnimationHost;

/// Run one blend pass for a group and apply the output.
///
/// Location and rotation targets receive the delta directly; scale
/// targets receive `1.0 + delta` since their rest value is 1. A failed
/// apply (unresolved bone, missing channel) skips that entry only.
pub fn apply_group(object: &str, group: &Group, host: &mut dyn AnimationHost) {
    let output = compute(group, group.control);

    for (target, delta) in &output.transforms {
        let value = match target.transform_property() {
            Some(TransformProperty::Scale) => 1.0 + delta,
            _ => *delta,
        };
        if let Err(e) = host.apply_transform(object, target, value) {
            tracing::debug!(object, ?target, error = %e, "Skipping unresolved transform target");
        }
    }

    for (channel, weight) in &output.channels {
        if let Err(e) = host.apply_channel(object, channel, *weight) {
            tracing::debug!(object, channel, error = %e, "Skipping unresolved channel");
        }
    }
}

/// Re-run the blend pass for every group in the rig.
///
/// Invoked by the consumer tick and by the host's frame-change hook when
/// control points are driven by keyframed playback; there are no
/// per-property reactive callbacks anywhere else.
pub fn reevaluate_all(rig: &Rig, host: &mut dyn AnimationHost) {
    for object in &rig.objects {
        for group in &object.groups {
            apply_group(&object.name, group, host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use rigpad_rig_model::{
        BlendMode, ControlPoint, Mapping, RigObject, TargetRef, TransformProperty,
    };

    fn scale_target() -> TargetRef {
        TargetRef::Object {
            property: TransformProperty::Scale,
            axis: 0,
        }
    }

    fn location_target() -> TargetRef {
        TargetRef::Bone {
            bone: "head".to_string(),
            property: TransformProperty::Location,
            axis: 1,
        }
    }

    fn test_group() -> Group {
        let mut group = Group::new("Mouth");
        let mut scale = Mapping::new(scale_target(), 0.0, 0.0);
        scale.blend_mode = BlendMode::Radial;
        scale.magnitude = 0.5;
        let mut location = Mapping::new(location_target(), 0.0, 0.0);
        location.blend_mode = BlendMode::Radial;
        location.magnitude = 0.5;
        group.mappings.push(scale);
        group.mappings.push(location);
        group.control = ControlPoint::new(0.0, 0.0);
        group
    }

    #[test]
    fn test_scale_baseline_is_one_plus_delta() {
        let group = test_group();
        let mut host = RecordingHost::new();
        apply_group("Face", &group, &mut host);

        // Both weights are 1.0 at the shared anchor: delta 0.5 each.
        assert_eq!(host.transform("Face", &scale_target()), Some(1.5));
        assert_eq!(host.transform("Face", &location_target()), Some(0.5));
    }

    #[test]
    fn test_failed_apply_skips_entry_only() {
        let mut group = test_group();
        group.mappings.push(Mapping::new(
            TargetRef::Channel {
                channel: "ghost".to_string(),
            },
            0.0,
            0.0,
        ));
        group.mappings.push(Mapping::new(
            TargetRef::Channel {
                channel: "smile".to_string(),
            },
            0.0,
            0.0,
        ));

        let mut host = RecordingHost::new().without("ghost");
        apply_group("Face", &group, &mut host);

        assert!(host.channel("Face", "ghost").is_none());
        assert!(host.channel("Face", "smile").is_some());
        assert!(host.transform("Face", &location_target()).is_some());
    }

    #[test]
    fn test_reevaluate_all_touches_every_group() {
        let mut object = RigObject::new("Face");
        object.groups.push(test_group());
        let mut second = Group::new("Brows");
        second.mappings.push(Mapping::new(
            TargetRef::Channel {
                channel: "brow_up".to_string(),
            },
            0.0,
            1.0,
        ));
        object.groups.push(second);
        let rig = Rig {
            objects: vec![object],
            presets: Vec::new(),
        };

        let mut host = RecordingHost::new();
        reevaluate_all(&rig, &mut host);
        assert!(host.transform("Face", &location_target()).is_some());
        assert!(host.channel("Face", "brow_up").is_some());
    }
}
