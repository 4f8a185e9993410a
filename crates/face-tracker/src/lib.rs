//! Rigpad Face Tracker
//!
//! The acquisition side of the tracking pipeline: a dedicated producer
//! thread that blocking-reads landmark frames from a [`LandmarkSource`],
//! conditions every configured group axis, and publishes the newest
//! complete [`TrackerSnapshot`] into a shared overwrite cell.
//!
//! The thread runs at the source's native rate, unbounded by the
//! consumer cadence; the consumer only ever sees the most recent
//! snapshot. Configuration flows the other way through a second cell —
//! producers never touch rig state.

pub mod snapshot;
pub mod source;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use rigpad_common::clock::FpsEstimator;
use rigpad_common::error::RigpadResult;
use rigpad_processing_core::condition::FaceMetrics;
use rigpad_processing_core::SignalConditioner;
use rigpad_rig_model::{Axis, LandmarkFrame, TrackerConfigSet, Vec2};

pub use snapshot::{Latest, TrackerSnapshot};
pub use source::{LandmarkSource, OpenSource, SyntheticSource};

/// The acquisition producer loop.
///
/// Owns the capture source and all per-session filter state; dropping
/// the loop (normal exit or panic unwind) releases the device.
pub struct AcquisitionLoop {
    source: Box<dyn LandmarkSource>,
    configs: Latest<Arc<TrackerConfigSet>>,
    snapshots: Latest<TrackerSnapshot>,
    running: Arc<AtomicBool>,
    conditioner: SignalConditioner,
    fps: FpsEstimator,
}

impl AcquisitionLoop {
    pub fn new(
        source: Box<dyn LandmarkSource>,
        configs: Latest<Arc<TrackerConfigSet>>,
        snapshots: Latest<TrackerSnapshot>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            source,
            configs,
            snapshots,
            running,
            conditioner: SignalConditioner::new(),
            fps: FpsEstimator::new(),
        }
    }

    /// Spawn the loop on its own named thread.
    pub fn spawn(self) -> RigpadResult<JoinHandle<()>> {
        let handle = std::thread::Builder::new()
            .name("rigpad-acquisition".to_string())
            .spawn(move || self.run())?;
        Ok(handle)
    }

    /// Run until the shared flag clears. Consumes the loop so the source
    /// is released on return.
    pub fn run(mut self) {
        tracing::info!(source = %self.source.name(), "Acquisition loop started");

        while self.running.load(Ordering::Relaxed) {
            match self.source.next_frame() {
                Ok(Some(frame)) => self.process(&frame),
                Ok(None) => {
                    // Frame without a detectable face: keep the rate
                    // estimate honest but publish nothing.
                    self.fps.tick();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Frame read failed");
                }
            }
        }

        tracing::info!("Acquisition loop stopped");
    }

    fn process(&mut self, frame: &LandmarkFrame) {
        let fps = self.fps.tick();

        let Some(configs) = self.configs.peek() else {
            return;
        };

        let face = FaceMetrics::measure(frame);
        let mut vectors = HashMap::new();
        let mut raw = HashMap::new();

        for group in configs.active_groups() {
            let x = self
                .conditioner
                .condition(frame, &face, &group.uid, Axis::X, &group.x);
            let y = self
                .conditioner
                .condition(frame, &face, &group.uid, Axis::Y, &group.y);
            vectors.insert(group.uid.clone(), Vec2::new(x.value, y.value));
            raw.insert(group.uid.clone(), Vec2::new(x.raw, y.raw));
        }

        self.snapshots.publish(TrackerSnapshot {
            vectors,
            raw,
            landmarks: frame.positions_2d(),
            fps,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigpad_rig_model::{AxisTrackerConfig, ExtractionMode, GroupTrackerConfig, Landmark};
    use source::{LIP_BOTTOM, LIP_TOP};
    use std::time::{Duration, Instant};

    fn mouth_config() -> Arc<TrackerConfigSet> {
        Arc::new(TrackerConfigSet {
            groups: vec![GroupTrackerConfig {
                uid: "Face_Mouth".to_string(),
                x: AxisTrackerConfig::default(),
                y: AxisTrackerConfig {
                    mode: ExtractionMode::TwoPointDistance,
                    point_a: LIP_TOP,
                    point_b: LIP_BOTTOM,
                    in_min: 0.0,
                    in_max: 0.12,
                    out_min: 0.0,
                    out_max: 1.0,
                    ..Default::default()
                },
            }],
        })
    }

    #[test]
    fn test_loop_publishes_snapshots_and_stops_on_flag() {
        let configs = Latest::new();
        configs.publish(mouth_config());
        let snapshots: Latest<TrackerSnapshot> = Latest::new();
        let running = Arc::new(AtomicBool::new(true));

        let acquisition = AcquisitionLoop::new(
            Box::new(SyntheticSource::new(500)),
            configs,
            snapshots.clone(),
            running.clone(),
        );
        let handle = acquisition.spawn().unwrap();

        // Wait for at least one published snapshot.
        let deadline = Instant::now() + Duration::from_secs(2);
        let snapshot = loop {
            if let Some(snapshot) = snapshots.take() {
                break snapshot;
            }
            assert!(Instant::now() < deadline, "no snapshot published in time");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert!(snapshot.vectors.contains_key("Face_Mouth"));
        assert!(snapshot.raw.contains_key("Face_Mouth"));
        assert_eq!(
            snapshot.landmarks.len(),
            rigpad_rig_model::LANDMARK_COUNT
        );

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }

    #[test]
    fn test_inert_groups_are_not_published() {
        struct OneFrame(bool);
        impl LandmarkSource for OneFrame {
            fn next_frame(&mut self) -> RigpadResult<Option<LandmarkFrame>> {
                std::thread::sleep(Duration::from_millis(1));
                if self.0 {
                    return Ok(None);
                }
                self.0 = true;
                Ok(Some(LandmarkFrame::new(vec![
                    Landmark::default();
                    rigpad_rig_model::LANDMARK_COUNT
                ])))
            }
            fn name(&self) -> &str {
                "one-frame"
            }
        }

        let configs = Latest::new();
        // All axes NONE: the group is configured but inert.
        configs.publish(Arc::new(TrackerConfigSet {
            groups: vec![GroupTrackerConfig {
                uid: "Face_Idle".to_string(),
                x: AxisTrackerConfig::default(),
                y: AxisTrackerConfig::default(),
            }],
        }));
        let snapshots: Latest<TrackerSnapshot> = Latest::new();
        let running = Arc::new(AtomicBool::new(true));

        let acquisition = AcquisitionLoop::new(
            Box::new(OneFrame(false)),
            configs,
            snapshots.clone(),
            running.clone(),
        );
        let handle = acquisition.spawn().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        let snapshot = loop {
            if let Some(snapshot) = snapshots.take() {
                break snapshot;
            }
            assert!(Instant::now() < deadline, "no snapshot published in time");
            std::thread::sleep(Duration::from_millis(5));
        };

        assert!(snapshot.vectors.is_empty());
        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
    }
}
