//! The weighted influence blending engine.
//!
//! Maps a group's 2D control point plus its mapping table into per-target
//! output values. Continuous transform targets accumulate by summing
//! `weight * magnitude` across mappings that share a target; named
//! channels combine by maximum weight, and every channel referenced by
//! the group appears in the output even at weight 0 so stale channels
//! reset each pass.

use rigpad_rig_model::{BlendMode, ControlPoint, Group, Mapping, TargetRef, AXIS_EPSILON};

/// Everything one blend pass wants the host to apply.
///
/// Entries keep first-appearance order, so repeated passes over an
/// unchanged group produce identical output sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlendOutput {
    /// Continuous additive targets with their summed deltas.
    pub transforms: Vec<(TargetRef, f64)>,

    /// Named channels with their max-combined weights.
    pub channels: Vec<(String, f64)>,
}

impl BlendOutput {
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty() && self.channels.is_empty()
    }
}

/// Resolve a mapping's effective falloff metric.
///
/// `AUTO` collapses to a single-axis metric when the anchor sits on that
/// axis (the off-axis component within [`AXIS_EPSILON`], the on-axis one
/// beyond it) and to `BOX` otherwise.
pub fn resolved_blend_mode(mapping: &Mapping) -> BlendMode {
    match mapping.blend_mode {
        BlendMode::Auto => {
            let on_x = mapping.anchor_y.abs() < AXIS_EPSILON && mapping.anchor_x.abs() > AXIS_EPSILON;
            let on_y = mapping.anchor_x.abs() < AXIS_EPSILON && mapping.anchor_y.abs() > AXIS_EPSILON;
            if on_x {
                BlendMode::AxisX
            } else if on_y {
                BlendMode::AxisY
            } else {
                BlendMode::Box
            }
        }
        mode => mode,
    }
}

/// Falloff weight for a distance under the given radius.
///
/// Linear falloff clamped to `[0, 1]`; a non-positive radius yields 0
/// rather than dividing.
pub fn falloff_weight(distance: f64, radius: f64) -> f64 {
    if radius > 0.0 {
        (1.0 - distance / radius).max(0.0)
    } else {
        0.0
    }
}

/// Run one blend pass for a group.
///
/// Pure: no side effects, no host access. Target resolution failures are
/// a host concern — every mapping contributes here and the host skips
/// entries it cannot apply.
pub fn compute(group: &Group, control: ControlPoint) -> BlendOutput {
    let limit = group.limit();
    let val_x = control.x() * limit;
    let val_y = control.y() * limit;

    let mut output = BlendOutput::default();

    for mapping in &group.mappings {
        let distance = match resolved_blend_mode(mapping) {
            BlendMode::AxisX => (val_x - mapping.anchor_x).abs(),
            BlendMode::AxisY => (val_y - mapping.anchor_y).abs(),
            BlendMode::Box => {
                (val_x - mapping.anchor_x)
                    .abs()
                    .max((val_y - mapping.anchor_y).abs())
            }
            BlendMode::Radial | BlendMode::Auto => {
                (val_x - mapping.anchor_x).hypot(val_y - mapping.anchor_y)
            }
        };
        let weight = falloff_weight(distance, mapping.radius);

        match &mapping.target {
            TargetRef::Channel { channel } => {
                match output.channels.iter_mut().find(|(name, _)| name == channel) {
                    Some((_, combined)) => *combined = combined.max(weight),
                    None => output.channels.push((channel.clone(), weight)),
                }
            }
            target => {
                let delta = weight * mapping.magnitude;
                match output
                    .transforms
                    .iter_mut()
                    .find(|(key, _)| key == target)
                {
                    Some((_, sum)) => *sum += delta,
                    None => output.transforms.push((target.clone(), delta)),
                }
            }
        }
    }

    output
}
