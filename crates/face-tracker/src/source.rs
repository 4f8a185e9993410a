//! Landmark sources.
//!
//! The detection model is a black-box collaborator: a source owns its
//! capture device and hands over one [`LandmarkFrame`] per blocking
//! read. Real camera backends live outside this workspace; the
//! deterministic synthetic source below drives demos and tests.

use std::time::Duration;

use rigpad_common::error::RigpadResult;
use rigpad_processing_core::condition::{
    EYE_RIGHT, FACE_BOTTOM, FACE_EDGE_LEFT, FACE_EDGE_RIGHT, FACE_TOP,
};
use rigpad_rig_model::{Landmark, LandmarkFrame, LANDMARK_COUNT};

/// Trait for landmark capture backends.
///
/// `next_frame` blocks until the device produces a frame. `Ok(None)`
/// means the frame carried no detectable face; the loop skips it and
/// reads again. Opening the device happens in the backend constructor,
/// so a missing device fails the session before any thread spawns.
pub trait LandmarkSource: Send {
    /// Blocking read of the next frame's landmarks.
    fn next_frame(&mut self) -> RigpadResult<Option<LandmarkFrame>>;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Deferred source constructor, invoked during session startup so open
/// failures map onto the STARTING → STOPPED error path.
pub type OpenSource = Box<dyn FnOnce() -> RigpadResult<Box<dyn LandmarkSource>> + Send>;

/// Upper- and lower-lip landmark indices, animated by the synthetic
/// source and useful as TWO_POINT_DISTANCE endpoints.
pub const LIP_TOP: usize = 13;
pub const LIP_BOTTOM: usize = 14;

/// Deterministic face that opens and closes its mouth and sweeps its
/// gaze, at a fixed simulated capture rate.
pub struct SyntheticSource {
    frame_count: u64,
    frame_interval: Duration,
}

impl SyntheticSource {
    /// A source ticking at the given simulated capture rate.
    pub fn new(fps: u32) -> Self {
        Self {
            frame_count: 0,
            frame_interval: Duration::from_secs(1) / fps.max(1),
        }
    }

    /// An opener for session startup.
    pub fn opener(fps: u32) -> OpenSource {
        Box::new(move || Ok(Box::new(SyntheticSource::new(fps)) as Box<dyn LandmarkSource>))
    }

    fn frame_at(&self, t: f64) -> LandmarkFrame {
        let mut points = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];

        // Face span and vertical axis.
        points[FACE_EDGE_RIGHT] = Landmark::new(0.2, 0.5, 0.0);
        points[FACE_EDGE_LEFT] = Landmark::new(0.8, 0.5, 0.0);
        points[FACE_TOP] = Landmark::new(0.5, 0.2, 0.0);
        points[FACE_BOTTOM] = Landmark::new(0.5, 0.85, 0.0);

        // Mouth opening oscillates between closed and ~12% of face width.
        let opening = 0.036 * (1.0 - (t * 0.8).cos());
        points[LIP_TOP] = Landmark::new(0.5, 0.68, 0.0);
        points[LIP_BOTTOM] = Landmark::new(0.5, 0.68 + opening, 0.0);

        // Right eye with a slow horizontal gaze sweep.
        let gaze = 0.02 * (t * 0.5).sin();
        points[EYE_RIGHT.outer] = Landmark::new(0.35, 0.42, 0.0);
        points[EYE_RIGHT.inner] = Landmark::new(0.45, 0.42, 0.0);
        points[EYE_RIGHT.top] = Landmark::new(0.40, 0.405, 0.0);
        points[EYE_RIGHT.bottom] = Landmark::new(0.40, 0.435, 0.0);
        points[EYE_RIGHT.iris] = Landmark::new(0.40 + gaze, 0.42, 0.0);

        LandmarkFrame::new(points)
    }
}

impl LandmarkSource for SyntheticSource {
    fn next_frame(&mut self) -> RigpadResult<Option<LandmarkFrame>> {
        // Simulate the device's native rate.
        std::thread::sleep(self.frame_interval);
        let t = self.frame_count as f64 * self.frame_interval.as_secs_f64();
        self.frame_count += 1;
        Ok(Some(self.frame_at(t)))
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
