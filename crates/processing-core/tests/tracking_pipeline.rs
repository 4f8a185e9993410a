//! Conditioning and blending chained the way the acquisition loop and
//! consumer use them: frames → axis scalars → control point → outputs.

use rigpad_processing_core::blend::compute;
use rigpad_processing_core::condition::{FACE_EDGE_LEFT, FACE_EDGE_RIGHT};
use rigpad_processing_core::{FaceMetrics, SignalConditioner};
use rigpad_rig_model::{
    Axis, AxisTrackerConfig, BlendMode, ControlPoint, ExtractionMode, Group, Landmark,
    LandmarkFrame, Mapping, TargetRef, LANDMARK_COUNT,
};

const MOUTH_TOP: usize = 13;
const MOUTH_BOTTOM: usize = 14;

/// A face one unit wide with a configurable mouth opening.
fn frame_with_opening(opening: f64) -> LandmarkFrame {
    let mut points = vec![Landmark::default(); LANDMARK_COUNT];
    points[FACE_EDGE_RIGHT] = Landmark::new(0.0, 0.5, 0.0);
    points[FACE_EDGE_LEFT] = Landmark::new(1.0, 0.5, 0.0);
    points[MOUTH_TOP] = Landmark::new(0.5, 0.6, 0.0);
    points[MOUTH_BOTTOM] = Landmark::new(0.5, 0.6 + opening, 0.0);
    LandmarkFrame::new(points)
}

fn mouth_axis_config() -> AxisTrackerConfig {
    AxisTrackerConfig {
        mode: ExtractionMode::TwoPointDistance,
        point_a: MOUTH_TOP,
        point_b: MOUTH_BOTTOM,
        in_min: 0.0,
        in_max: 0.1,
        out_min: -1.0,
        out_max: 1.0,
        ..Default::default()
    }
}

fn mouth_group() -> Group {
    let mut group = Group::new("Mouth");
    let mut open = Mapping::new(
        TargetRef::Channel {
            channel: "mouth_open".to_string(),
        },
        0.0,
        1.0,
    );
    open.blend_mode = BlendMode::AxisY;
    group.mappings.push(open);
    group
}

#[test]
fn frames_drive_the_channel_through_the_whole_chain() {
    let config = mouth_axis_config();
    let group = mouth_group();
    let mut conditioner = SignalConditioner::new();

    // Openings sweep from closed to the top of the input range; the
    // resulting channel weight must rise monotonically with them.
    let mut previous_weight = -1.0;
    for (step, opening) in [0.0, 0.025, 0.05, 0.075, 0.1].iter().enumerate() {
        let frame = frame_with_opening(*opening);
        let face = FaceMetrics::measure(&frame);
        let sample = conditioner.condition(&frame, &face, "Face_Mouth", Axis::Y, &config);

        let mut driven = group.clone();
        driven.control = ControlPoint::new(0.0, sample.value);
        let output = compute(&driven, driven.control);

        let (_, weight) = &output.channels[0];
        assert!(
            *weight >= previous_weight,
            "step {step}: weight {weight} regressed from {previous_weight}"
        );
        previous_weight = *weight;
    }

    // Fully open: drive value 1.0 lands on the anchor.
    assert!((previous_weight - 1.0).abs() < 1e-9);
}

#[test]
fn smoothing_trails_a_step_change_across_frames() {
    let mut config = mouth_axis_config();
    config.out_min = 0.0;
    config.smoothing = Some(0.5);
    let mut conditioner = SignalConditioner::new();

    // Hold closed, then snap open: the smoothed value must approach 1.0
    // geometrically rather than jumping.
    let closed = frame_with_opening(0.0);
    let face = FaceMetrics::measure(&closed);
    let seeded = conditioner.condition(&closed, &face, "Face_Mouth", Axis::Y, &config);
    assert_eq!(seeded.value, 0.0);

    let open = frame_with_opening(0.1);
    let face = FaceMetrics::measure(&open);
    let first = conditioner.condition(&open, &face, "Face_Mouth", Axis::Y, &config);
    assert!((first.value - 0.5).abs() < 1e-9);
    let second = conditioner.condition(&open, &face, "Face_Mouth", Axis::Y, &config);
    assert!((second.value - 0.75).abs() < 1e-9);
    // The raw extraction itself is unsmoothed.
    assert!((second.raw - 0.1).abs() < 1e-9);
}
