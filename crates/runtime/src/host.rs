//! The host animation system seam.
//!
//! The blend engine never mutates host state itself; everything flows
//! through [`AnimationHost`]. Each apply is fallible so an unresolved
//! bone or missing channel skips that one entry without aborting the
//! pass.

use std::collections::HashMap;
use std::collections::HashSet;

use rigpad_common::error::{RigpadError, RigpadResult};
use rigpad_rig_model::{ControlPoint, TargetRef, Vec2};

/// Per-tick diagnostic state for the host UI.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Human-readable producer rate, e.g. `"FPS: 29"`.
    pub fps_text: String,

    /// Raw pre-normalization axis values per group UID.
    pub raw_axes: Vec<(String, Vec2)>,
}

/// Collaborator interface to the host animation system.
pub trait AnimationHost {
    /// Write a continuous transform value resolved from a target
    /// reference. The value already carries the apply contract:
    /// location/rotation receive the delta directly, scale receives
    /// `1.0 + delta`.
    fn apply_transform(&mut self, object: &str, target: &TargetRef, value: f64)
        -> RigpadResult<()>;

    /// Write a named weight channel value.
    fn apply_channel(&mut self, object: &str, channel: &str, value: f64) -> RigpadResult<()>;

    /// Insert a keyframe for a group's control point at the current frame.
    fn keyframe_control(
        &mut self,
        object: &str,
        group: &str,
        point: ControlPoint,
    ) -> RigpadResult<()>;

    /// Insert a keyframe for a mapping target at the current frame.
    fn keyframe_target(&mut self, object: &str, target: &TargetRef) -> RigpadResult<()>;

    /// Move the host playhead (used by baking).
    fn set_frame(&mut self, frame: i32) -> RigpadResult<()>;

    /// The host playhead position.
    fn current_frame(&self) -> i32;

    /// Receive updated diagnostic state.
    fn publish_diagnostics(&mut self, diagnostics: &Diagnostics);

    /// Ask the host to redraw its viewports.
    fn request_redraw(&mut self);
}

/// Host that traces every apply; used by the CLI demo session.
#[derive(Debug, Default)]
pub struct LoggingHost {
    frame: i32,
}

impl AnimationHost for LoggingHost {
    fn apply_transform(
        &mut self,
        object: &str,
        target: &TargetRef,
        value: f64,
    ) -> RigpadResult<()> {
        tracing::debug!(object, ?target, value, "apply transform");
        Ok(())
    }

    fn apply_channel(&mut self, object: &str, channel: &str, value: f64) -> RigpadResult<()> {
        tracing::debug!(object, channel, value, "apply channel");
        Ok(())
    }

    fn keyframe_control(
        &mut self,
        object: &str,
        group: &str,
        point: ControlPoint,
    ) -> RigpadResult<()> {
        tracing::debug!(object, group, x = point.x(), y = point.y(), "keyframe control");
        Ok(())
    }

    fn keyframe_target(&mut self, object: &str, target: &TargetRef) -> RigpadResult<()> {
        tracing::debug!(object, ?target, "keyframe target");
        Ok(())
    }

    fn set_frame(&mut self, frame: i32) -> RigpadResult<()> {
        self.frame = frame;
        Ok(())
    }

    fn current_frame(&self) -> i32 {
        self.frame
    }

    fn publish_diagnostics(&mut self, diagnostics: &Diagnostics) {
        tracing::debug!(fps = %diagnostics.fps_text, "diagnostics");
    }

    fn request_redraw(&mut self) {}
}

/// In-memory host double that records every interaction.
///
/// Backs the runtime's own tests and headless smoke runs: applied values
/// are kept per target, keyframes and frame changes are logged in order,
/// and configurable "missing" names make individual applies fail the way
/// an unresolved bone or channel would.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub transforms: HashMap<(String, TargetRef), f64>,
    pub channels: HashMap<(String, String), f64>,
    /// Every channel apply in order, for counting blend passes.
    pub channel_history: Vec<(String, f64)>,
    pub control_keyframes: Vec<(String, String, f64, f64)>,
    pub target_keyframes: Vec<(String, TargetRef)>,
    pub frame_history: Vec<i32>,
    pub diagnostics: Vec<Diagnostics>,
    pub redraws: usize,
    frame: i32,

    /// Bone/channel names the host pretends not to know.
    pub missing: HashSet<String>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a bone or channel name as unresolvable.
    pub fn without(mut self, name: &str) -> Self {
        self.missing.insert(name.to_string());
        self
    }

    fn check_known(&self, name: Option<&str>) -> RigpadResult<()> {
        match name {
            Some(name) if self.missing.contains(name) => {
                Err(RigpadError::host(format!("unknown target {name}")))
            }
            _ => Ok(()),
        }
    }

    /// Last applied channel value, if any.
    pub fn channel(&self, object: &str, channel: &str) -> Option<f64> {
        self.channels
            .get(&(object.to_string(), channel.to_string()))
            .copied()
    }

    /// Last applied transform value, if any.
    pub fn transform(&self, object: &str, target: &TargetRef) -> Option<f64> {
        self.transforms
            .get(&(object.to_string(), target.clone()))
            .copied()
    }
}

impl AnimationHost for RecordingHost {
    fn apply_transform(
        &mut self,
        object: &str,
        target: &TargetRef,
        value: f64,
    ) -> RigpadResult<()> {
        self.check_known(target.name())?;
        self.transforms
            .insert((object.to_string(), target.clone()), value);
        Ok(())
    }

    fn apply_channel(&mut self, object: &str, channel: &str, value: f64) -> RigpadResult<()> {
        self.check_known(Some(channel))?;
        self.channels
            .insert((object.to_string(), channel.to_string()), value);
        self.channel_history.push((channel.to_string(), value));
        Ok(())
    }

    fn keyframe_control(
        &mut self,
        object: &str,
        group: &str,
        point: ControlPoint,
    ) -> RigpadResult<()> {
        self.control_keyframes
            .push((object.to_string(), group.to_string(), point.x(), point.y()));
        Ok(())
    }

    fn keyframe_target(&mut self, object: &str, target: &TargetRef) -> RigpadResult<()> {
        self.check_known(target.name())?;
        self.target_keyframes
            .push((object.to_string(), target.clone()));
        Ok(())
    }

    fn set_frame(&mut self, frame: i32) -> RigpadResult<()> {
        self.frame = frame;
        self.frame_history.push(frame);
        Ok(())
    }

    fn current_frame(&self) -> i32 {
        self.frame
    }

    fn publish_diagnostics(&mut self, diagnostics: &Diagnostics) {
        self.diagnostics.push(diagnostics.clone());
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }
}
