//! The signal conditioning pipeline.
//!
//! Turns raw per-frame landmark geometry into smoothed, normalized axis
//! scalars in `[-1, 1]`. Two pieces of state persist across frames for
//! the lifetime of a conditioner (one session): the per-eye iris EMA and
//! the optional per-(group, axis) output EMA.

use std::collections::HashMap;

use rigpad_rig_model::{Axis, AxisTrackerConfig, ExtractionMode, Landmark, LandmarkFrame};

/// Fixed landmark indices spanning the face horizontally (ear to ear).
pub const FACE_EDGE_RIGHT: usize = 234;
pub const FACE_EDGE_LEFT: usize = 454;
/// Fixed landmark indices spanning the face vertically (forehead, chin).
pub const FACE_TOP: usize = 10;
pub const FACE_BOTTOM: usize = 152;

/// Projection raw values are scaled up so useful input ranges stay in
/// the same order of magnitude as the distance modes.
const PROJECTION_SCALE: f64 = 10.0;

/// Iris EMA factor, applied before curve shaping.
const IRIS_EMA_FACTOR: f64 = 0.3;

/// Eyelid gap below this fraction of eye width freezes the iris EMA.
const LID_GAP_RATIO: f64 = 0.05;

/// Landmark indices describing one eye region.
#[derive(Debug, Clone, Copy)]
pub struct EyeLandmarks {
    pub iris: usize,
    pub inner: usize,
    pub outer: usize,
    pub top: usize,
    pub bottom: usize,
}

pub const EYE_RIGHT: EyeLandmarks = EyeLandmarks {
    iris: 468,
    inner: 133,
    outer: 33,
    top: 159,
    bottom: 145,
};

pub const EYE_LEFT: EyeLandmarks = EyeLandmarks {
    iris: 473,
    inner: 362,
    outer: 263,
    top: 386,
    bottom: 374,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EyeSide {
    Right = 0,
    Left = 1,
}

/// Iris configs name the eye through `point_b`: the left outer corner or
/// left upper lid selects the left eye, anything else the right.
fn eye_side(point_b: usize) -> EyeSide {
    if point_b == EYE_LEFT.outer || point_b == EYE_LEFT.top {
        EyeSide::Left
    } else {
        EyeSide::Right
    }
}

/// Per-frame face geometry shared by every axis extraction.
///
/// Measured once per captured frame; the width is floored so downstream
/// divisions are safe even on degenerate frames.
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    /// Ear-to-ear distance, floored at 1.0 when degenerate.
    pub width: f64,
    /// Face-local horizontal basis vector.
    pub basis_x: (f64, f64, f64),
    /// Face-local vertical basis vector.
    pub basis_y: (f64, f64, f64),
}

impl FaceMetrics {
    pub fn measure(frame: &LandmarkFrame) -> Self {
        let right = frame.point(FACE_EDGE_RIGHT).unwrap_or_default();
        let left = frame.point(FACE_EDGE_LEFT).unwrap_or_default();
        let top = frame.point(FACE_TOP).unwrap_or_default();
        let bottom = frame.point(FACE_BOTTOM).unwrap_or_default();

        Self {
            width: non_zero(right.distance(&left), 1.0),
            basis_x: left.delta(&right),
            basis_y: bottom.delta(&top),
        }
    }
}

/// One conditioned axis sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConditionedSample {
    /// Final drive value in `[-1, 1]`.
    pub value: f64,
    /// Raw extracted scalar before normalization, for diagnostics.
    pub raw: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct IrisEma {
    x: f64,
    y: f64,
}

/// Stateful raw-to-drive conditioning for every configured axis.
///
/// One conditioner lives for one session; dropping it discards all
/// filter state.
#[derive(Debug, Default)]
pub struct SignalConditioner {
    iris_ema: [IrisEma; 2],
    smoothed: HashMap<(String, Axis), f64>,
}

impl SignalConditioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Condition one axis of one group from the current frame.
    ///
    /// `group_uid` keys the optional output EMA so distinct groups never
    /// share smoothing state.
    pub fn condition(
        &mut self,
        frame: &LandmarkFrame,
        face: &FaceMetrics,
        group_uid: &str,
        axis: Axis,
        config: &AxisTrackerConfig,
    ) -> ConditionedSample {
        let raw = match config.mode {
            ExtractionMode::None => 0.0,
            ExtractionMode::TwoPointDistance => pair(frame, config)
                .map(|(a, b)| a.distance(&b) / face.width)
                .unwrap_or(0.0),
            ExtractionMode::OnePointProjection => pair(frame, config)
                .map(|(a, b)| {
                    let (vx, vy, vz) = a.delta(&b);
                    let basis = match axis {
                        Axis::X => face.basis_x,
                        Axis::Y => face.basis_y,
                    };
                    let dot = vx * basis.0 + vy * basis.1 + vz * basis.2;
                    (dot / face.width) * PROJECTION_SCALE
                })
                .unwrap_or(0.0),
            ExtractionMode::Iris => self.iris_raw(frame, axis, config),
        };

        // Distance is unsigned; every other mode normalizes the
        // magnitude and carries the sign through.
        let normalized = if config.mode == ExtractionMode::TwoPointDistance {
            normalize(raw, config)
        } else {
            normalize(raw.abs(), config) * 1.0_f64.copysign(raw)
        };

        let mut value = normalized * config.gain;

        if let Some(factor) = config.smoothing {
            let state = self
                .smoothed
                .entry((group_uid.to_string(), axis))
                .or_insert(value);
            *state += (value - *state) * factor;
            value = *state;
        }

        ConditionedSample {
            value: value.clamp(-1.0, 1.0),
            raw,
        }
    }

    /// Iris offset with blink gating, pre-curve EMA, and the
    /// sign-preserving power curve.
    fn iris_raw(&mut self, frame: &LandmarkFrame, axis: Axis, config: &AxisTrackerConfig) -> f64 {
        let side = eye_side(config.point_b);
        let eye = match side {
            EyeSide::Right => EYE_RIGHT,
            EyeSide::Left => EYE_LEFT,
        };

        let points = (
            frame.point(eye.iris),
            frame.point(eye.inner),
            frame.point(eye.outer),
            frame.point(eye.top),
            frame.point(eye.bottom),
        );
        if let (Some(iris), Some(inner), Some(outer), Some(top), Some(bottom)) = points {
            let eye_width = non_zero((inner.x - outer.x).abs(), 1.0);
            let eye_height = non_zero((top.y - bottom.y).abs(), 0.1);

            // Blink gate: a nearly closed lid would fold lid motion into
            // the vertical offset, so the EMA holds instead.
            if eye_height > LID_GAP_RATIO * eye_width {
                let instant = match axis {
                    Axis::X => (iris.x - (inner.x + outer.x) / 2.0) / eye_width,
                    Axis::Y => (iris.y - (top.y + bottom.y) / 2.0) / eye_width * 2.0,
                };
                let ema = &mut self.iris_ema[side as usize];
                let slot = match axis {
                    Axis::X => &mut ema.x,
                    Axis::Y => &mut ema.y,
                };
                *slot += IRIS_EMA_FACTOR * (instant - *slot);
            }
        }

        let ema = self.iris_ema[side as usize];
        let held = match axis {
            Axis::X => ema.x,
            Axis::Y => ema.y,
        };
        held.abs().powf(config.exponent).copysign(held)
    }
}

fn pair(frame: &LandmarkFrame, config: &AxisTrackerConfig) -> Option<(Landmark, Landmark)> {
    Some((frame.point(config.point_a)?, frame.point(config.point_b)?))
}

/// Clamp into the input range and linearly rescale into the output range.
pub fn normalize(value: f64, config: &AxisTrackerConfig) -> f64 {
    let (in_min, in_max) = (config.in_min, config.in_max);
    let (out_min, out_max) = (config.out_min, config.out_max);
    if in_max <= in_min {
        return out_min;
    }
    if value <= in_min {
        out_min
    } else if value >= in_max {
        out_max
    } else {
        out_min + (out_max - out_min) * (value - in_min) / (in_max - in_min)
    }
}

fn non_zero(value: f64, fallback: f64) -> f64 {
    if value == 0.0 {
        fallback
    } else {
        value
    }
}
