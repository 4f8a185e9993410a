//! User-facing operators expressed through the host seam.
//!
//! These run on the same cooperative scheduler as the consumer tick, in
//! between ticks, so the single-writer rule for rig state holds.

use rigpad_common::error::{RigpadError, RigpadResult};
use rigpad_rig_model::{group_uid, mirrored_mappings, Group, Preset, PresetState, Rig};

use crate::apply::{apply_group, reevaluate_all};
use crate::host::AnimationHost;

/// Write exact coordinates given in limit-scaled space.
///
/// The edit dialog shows `control * limit`, so the inverse divides by
/// the limit before the clamping write.
pub fn edit_control_scaled(object: &str, group: &mut Group, x: f64, y: f64, host: &mut dyn AnimationHost) {
    let limit = group.limit();
    group.control.set(x / limit, y / limit);
    apply_group(object, group, host);
}

/// Reset one group's control point to center and re-apply.
pub fn reset_group(object: &str, group: &mut Group, host: &mut dyn AnimationHost) {
    group.control.reset();
    apply_group(object, group, host);
}

/// Reset every control point across the rig.
pub fn reset_all(rig: &mut Rig, host: &mut dyn AnimationHost) {
    rig.for_each_group_mut(|object, group| {
        group.control.reset();
        apply_group(object, group, host);
    });
    host.request_redraw();
}

/// Keyframe a group's control point at the current frame.
pub fn keyframe_control(object: &str, group: &Group, host: &mut dyn AnimationHost) -> RigpadResult<()> {
    host.keyframe_control(object, &group.name, group.control)
}

/// Re-run the blend pass for the whole rig.
///
/// Hook this to the host's frame-change notification so keyframed
/// control points keep driving their targets during playback and
/// scrubbing.
pub fn on_frame_change(rig: &Rig, host: &mut dyn AnimationHost) {
    reevaluate_all(rig, host);
}

/// Append the mirrored counterparts of a group's suffixed mappings.
/// Returns how many were added.
pub fn mirror_group(group: &mut Group) -> usize {
    let mirrored = mirrored_mappings(group);
    let count = mirrored.len();
    group.mappings.extend(mirrored);
    count
}

/// Snapshot every control point in the rig into the preset at `index`.
pub fn capture_preset(rig: &mut Rig, index: usize) -> RigpadResult<()> {
    let states: Vec<PresetState> = rig
        .objects
        .iter()
        .flat_map(|object| {
            object.groups.iter().map(|group| PresetState {
                object: object.name.clone(),
                group: group.name.clone(),
                x: group.control.x(),
                y: group.control.y(),
            })
        })
        .collect();

    let preset = preset_mut(rig, index)?;
    preset.states = states;
    Ok(())
}

/// Write a preset's saved coordinates back and re-apply the affected
/// groups. States naming groups that no longer exist are skipped.
pub fn recall_preset(rig: &mut Rig, index: usize, host: &mut dyn AnimationHost) -> RigpadResult<()> {
    let states = preset_mut(rig, index)?.states.clone();
    for state in &states {
        let uid = group_uid(&state.object, &state.group);
        if let Some((object, group)) = rig.find_group_mut(&uid) {
            let object = object.to_string();
            group.control.set(state.x, state.y);
            apply_group(&object, group, host);
        }
    }
    host.request_redraw();
    Ok(())
}

/// Recall a preset and keyframe every affected mapping target.
pub fn keyframe_preset(rig: &mut Rig, index: usize, host: &mut dyn AnimationHost) -> RigpadResult<()> {
    recall_preset(rig, index, host)?;
    let states = preset_mut(rig, index)?.states.clone();
    for state in &states {
        let uid = group_uid(&state.object, &state.group);
        if let Some((object, group)) = rig.find_group_mut(&uid) {
            let object = object.to_string();
            for mapping in &group.mappings {
                if let Err(e) = host.keyframe_target(&object, &mapping.target) {
                    tracing::debug!(object, target = ?mapping.target, error = %e,
                        "Skipping keyframe for unresolved target");
                }
            }
        }
    }
    Ok(())
}

/// Bake a frame range into target keyframes.
///
/// Steps the host playhead through `start..=end`, re-applies the group
/// at each frame, and keyframes every mapping target. The playhead is
/// restored afterwards. Returns the number of keyframes inserted.
pub fn bake_group(
    object: &str,
    group: &Group,
    start: i32,
    end: i32,
    step: u32,
    host: &mut dyn AnimationHost,
) -> RigpadResult<usize> {
    if end < start {
        return Err(RigpadError::session(format!(
            "bad bake range {start}..{end}"
        )));
    }
    let step = step.max(1) as i32;
    let original_frame = host.current_frame();

    let mut inserted = 0;
    let mut frame = start;
    while frame <= end {
        host.set_frame(frame)?;
        apply_group(object, group, host);
        for mapping in &group.mappings {
            match host.keyframe_target(object, &mapping.target) {
                Ok(()) => inserted += 1,
                Err(e) => {
                    tracing::debug!(object, target = ?mapping.target, error = %e,
                        "Skipping keyframe for unresolved target");
                }
            }
        }
        frame += step;
    }

    host.set_frame(original_frame)?;
    Ok(inserted)
}

fn preset_mut(rig: &mut Rig, index: usize) -> RigpadResult<&mut Preset> {
    let count = rig.presets.len();
    rig.presets
        .get_mut(index)
        .ok_or_else(|| RigpadError::session(format!("no preset at index {index} (have {count})")))
}
