//! The fixed-cadence consumer loop.
//!
//! One tick merges the newest producer output into the rig's control
//! points, runs the blend engine, and forwards everything to the host.
//! Ticks run on the host's cooperative single-threaded scheduler, so
//! each invocation is short and never blocks: the snapshot cell is
//! take-only and the remote queue is drained with only the newest entry
//! kept.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Duration;

use rigpad_common::clock::TickInterval;
use rigpad_face_tracker::{Latest, TrackerSnapshot};
use rigpad_remote_control::{drain_latest, RemoteMessage, ReplyHandle};
use rigpad_rig_model::{group_uid, Rig, TrackerConfigSet, Vec2};

use crate::apply::apply_group;
use crate::host::{AnimationHost, Diagnostics};

/// What a tick tells the scheduler driving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Re-arm for the next tick.
    Continue,
    /// The running flag cleared; unregister the driver.
    Stopped,
}

/// Consumer-side handles to both producer channels.
///
/// Built by the session at start; the caller owns the rig and the host
/// and drives `tick` at the session cadence. The consumer is the single
/// writer of rig state — producers only ever see the config cell.
pub struct ConsumerLoop {
    running: Arc<AtomicBool>,
    gate: TickInterval,
    configs: Latest<Arc<TrackerConfigSet>>,
    snapshots: Latest<TrackerSnapshot>,
    remote: Option<Receiver<RemoteMessage>>,
    reply: Option<ReplyHandle>,
}

impl ConsumerLoop {
    pub(crate) fn new(
        running: Arc<AtomicBool>,
        interval: Duration,
        configs: Latest<Arc<TrackerConfigSet>>,
        snapshots: Latest<TrackerSnapshot>,
        remote: Option<Receiver<RemoteMessage>>,
        reply: Option<ReplyHandle>,
    ) -> Self {
        Self {
            running,
            gate: TickInterval::new(interval),
            configs,
            snapshots,
            remote,
            reply,
        }
    }

    /// Run one consumer tick.
    ///
    /// Callable from a host render loop at any rate: the internal gate
    /// bounds the actual work to the session cadence.
    pub fn tick(&mut self, rig: &mut Rig, host: &mut dyn AnimationHost) -> TickOutcome {
        if !self.running.load(Ordering::Relaxed) {
            return TickOutcome::Stopped;
        }
        if !self.gate.due() {
            return TickOutcome::Continue;
        }

        // Tracker settings flow host → producer, snapshotted once per
        // tick as an immutable value.
        self.configs.publish(Arc::new(rig.tracker_configs()));

        let mut dirty = false;

        if let Some(snapshot) = self.snapshots.take() {
            self.apply_snapshot(&snapshot, rig, host);
            dirty = true;
        }

        if let Some(receiver) = &self.remote {
            if let Some(message) = drain_latest(receiver) {
                dirty |= self.apply_remote(message, rig, host);
            }
        }

        if dirty {
            host.request_redraw();
        }

        TickOutcome::Continue
    }

    /// Drive ticks at the session cadence on the current task until the
    /// running flag clears.
    ///
    /// Convenience driver for hosts whose cooperative scheduler is a
    /// current-thread async runtime; consuming `self` unregisters the
    /// loop once it observes the stop.
    pub async fn run(mut self, rig: &mut Rig, host: &mut dyn AnimationHost) {
        let mut ticker = tokio::time::interval(self.gate.interval());
        loop {
            ticker.tick().await;
            if self.tick(rig, host) == TickOutcome::Stopped {
                break;
            }
        }
    }

    fn apply_snapshot(
        &mut self,
        snapshot: &TrackerSnapshot,
        rig: &mut Rig,
        host: &mut dyn AnimationHost,
    ) {
        for object in &mut rig.objects {
            let object_name = object.name.clone();
            for group in &mut object.groups {
                let uid = group_uid(&object_name, &group.name);
                if let Some(vector) = snapshot.vectors.get(&uid) {
                    group.control.set(vector.x, vector.y);
                    apply_group(&object_name, group, host);
                }
            }
        }

        let mut raw_axes: Vec<(String, Vec2)> = snapshot
            .raw
            .iter()
            .map(|(uid, raw)| (uid.clone(), *raw))
            .collect();
        raw_axes.sort_by(|a, b| a.0.cmp(&b.0));
        host.publish_diagnostics(&Diagnostics {
            fps_text: format!("FPS: {:.0}", snapshot.fps),
            raw_axes,
        });
    }

    /// Apply one coalesced remote message. Returns whether rig state
    /// changed.
    fn apply_remote(
        &mut self,
        message: RemoteMessage,
        rig: &mut Rig,
        host: &mut dyn AnimationHost,
    ) -> bool {
        match message {
            RemoteMessage::GroupsRequest { reply_to } => {
                if let Some(reply) = &self.reply {
                    if let Err(e) = reply.send_groups(reply_to, rig.group_uids()) {
                        tracing::warn!(error = %e, "Failed to answer GET_GROUPS");
                    }
                }
                false
            }
            RemoteMessage::ActiveVector(vector) => {
                let mut changed = false;
                for object in &mut rig.objects {
                    let object_name = object.name.clone();
                    if let Some(group) = object.active_group_mut() {
                        group.control.set(vector.x, vector.y);
                        apply_group(&object_name, group, host);
                        changed = true;
                    }
                }
                changed
            }
            RemoteMessage::GroupVectors(vectors) => {
                let mut changed = false;
                for object in &mut rig.objects {
                    let object_name = object.name.clone();
                    for group in &mut object.groups {
                        let uid = group_uid(&object_name, &group.name);
                        if let Some(vector) = vectors.get(&uid) {
                            group.control.set(vector.x, vector.y);
                            apply_group(&object_name, group, host);
                            changed = true;
                        }
                    }
                }
                changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingHost;
    use crate::session::{SessionConfig, TrackingSession};

    #[tokio::test(flavor = "current_thread")]
    async fn test_async_driver_exits_when_flag_clears() {
        let mut session = TrackingSession::new(SessionConfig {
            remote_port: None,
            tick_interval_ms: 10,
        });
        let consumer = session.start(None).unwrap();

        let mut rig = Rig::default();
        let mut host = RecordingHost::new();
        let flag = session.running_flag();

        tokio::join!(
            consumer.run(&mut rig, &mut host),
            async {
                tokio::time::sleep(Duration::from_millis(40)).await;
                flag.store(false, Ordering::SeqCst);
            }
        );
        // Reaching this point means the driver observed the cleared flag.
        session.stop();
    }
}
