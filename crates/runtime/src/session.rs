//! Tracking session lifecycle.
//!
//! A session owns every shared flag, cell, and producer thread — there
//! are no module-level globals. The state machine is
//! `Stopped → Starting → Running → Stopping → Stopped`, with `Starting`
//! falling straight back to `Stopped` on device or socket errors before
//! anything is spawned or registered.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use rigpad_common::error::{RigpadError, RigpadResult};
use rigpad_face_tracker::{AcquisitionLoop, Latest, OpenSource};
use rigpad_remote_control::RemoteListener;

use crate::consumer::ConsumerLoop;

/// State of a tracking session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No producers running, nothing registered.
    Stopped,
    /// Device/socket initialization in progress.
    Starting,
    /// Producers and consumer active.
    Running,
    /// Flag cleared; waiting for producers to observe it.
    Stopping,
}

/// Configuration for starting a tracking session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// UDP port for the remote listener; `None` disables remote input.
    pub remote_port: Option<u16>,

    /// Consumer tick cadence in milliseconds.
    pub tick_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            remote_port: Some(5000),
            tick_interval_ms: 50,
        }
    }
}

/// A tracking session coordinating the producers and the consumer loop.
pub struct TrackingSession {
    config: SessionConfig,
    state: SessionState,
    running: Arc<AtomicBool>,
    started_wall: Option<String>,
    acquisition: Option<JoinHandle<()>>,
    listener: Option<JoinHandle<()>>,
}

impl TrackingSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            state: SessionState::Stopped,
            running: Arc::new(AtomicBool::new(false)),
            started_wall: None,
            acquisition: None,
            listener: None,
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The shared running flag, for drivers that want their own checks.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// The configured tick cadence.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.config.tick_interval_ms.max(1))
    }

    /// Wall-clock time the session entered `Running`, RFC 3339.
    pub fn started_at(&self) -> Option<&str> {
        self.started_wall.as_deref()
    }

    /// Start the session's producers and hand back the consumer loop.
    ///
    /// `source` opens the landmark device during `Starting`; pass `None`
    /// for a remote-only session. Any initialization failure returns the
    /// session to `Stopped` with nothing spawned.
    pub fn start(&mut self, source: Option<OpenSource>) -> RigpadResult<ConsumerLoop> {
        if self.state != SessionState::Stopped {
            return Err(RigpadError::session("session already started"));
        }
        self.state = SessionState::Starting;
        tracing::info!("Starting tracking session");

        // Socket first, then the capture device; an early return drops
        // whatever was initialized so far without spawning threads.
        let remote = match self.config.remote_port {
            Some(port) => match RemoteListener::bind(port, self.running.clone()) {
                Ok(bound) => Some(bound),
                Err(e) => {
                    self.state = SessionState::Stopped;
                    return Err(e);
                }
            },
            None => None,
        };

        let landmark_source = match source {
            Some(open) => match open() {
                Ok(opened) => Some(opened),
                Err(e) => {
                    self.state = SessionState::Stopped;
                    return Err(e);
                }
            },
            None => None,
        };

        let configs = Latest::new();
        let snapshots = Latest::new();
        self.running.store(true, Ordering::SeqCst);

        if let Some(opened) = landmark_source {
            let acquisition = AcquisitionLoop::new(
                opened,
                configs.clone(),
                snapshots.clone(),
                self.running.clone(),
            );
            match acquisition.spawn() {
                Ok(handle) => self.acquisition = Some(handle),
                Err(e) => {
                    self.abort_start();
                    return Err(e);
                }
            }
            tracing::info!("Acquisition thread started");
        }

        let (remote_receiver, reply) = match remote {
            Some((bound_listener, receiver, reply)) => match bound_listener.spawn() {
                Ok(handle) => {
                    self.listener = Some(handle);
                    tracing::info!("Remote listener thread started");
                    (Some(receiver), Some(reply))
                }
                Err(e) => {
                    self.abort_start();
                    return Err(e);
                }
            },
            None => (None, None),
        };

        self.started_wall = Some(chrono::Utc::now().to_rfc3339());
        self.state = SessionState::Running;
        tracing::info!(
            started_at = self.started_wall.as_deref().unwrap_or_default(),
            "Tracking session running"
        );

        Ok(ConsumerLoop::new(
            self.running.clone(),
            self.tick_interval(),
            configs,
            snapshots,
            remote_receiver,
            reply,
        ))
    }

    /// Stop the session: clear the flag, then join the producers.
    ///
    /// Producers observe the flag within one blocking-read timeout and
    /// release their device/socket; the consumer's next re-arm check
    /// returns [`crate::TickOutcome::Stopped`].
    pub fn stop(&mut self) {
        if self.state == SessionState::Stopped {
            return;
        }
        self.state = SessionState::Stopping;
        tracing::info!("Stopping tracking session");
        self.running.store(false, Ordering::SeqCst);

        if let Some(handle) = self.acquisition.take() {
            if handle.join().is_err() {
                tracing::warn!("Acquisition thread panicked");
            }
        }
        if let Some(handle) = self.listener.take() {
            if handle.join().is_err() {
                tracing::warn!("Remote listener thread panicked");
            }
        }

        self.state = SessionState::Stopped;
        tracing::info!("Tracking session stopped");
    }

    /// Unwind a partially started session back to `Stopped`.
    fn abort_start(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.acquisition.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.listener.take() {
            let _ = handle.join();
        }
        self.state = SessionState::Stopped;
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if self.state != SessionState::Stopped {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::TickOutcome;
    use crate::host::RecordingHost;
    use rigpad_rig_model::Rig;

    #[test]
    fn test_minimal_session_lifecycle() {
        let mut session = TrackingSession::new(SessionConfig {
            remote_port: None,
            tick_interval_ms: 50,
        });
        assert_eq!(session.state(), SessionState::Stopped);

        let mut consumer = session.start(None).unwrap();
        assert_eq!(session.state(), SessionState::Running);
        assert!(session.started_at().is_some());

        let mut rig = Rig::default();
        let mut host = RecordingHost::new();
        assert_eq!(consumer.tick(&mut rig, &mut host), TickOutcome::Continue);

        session.stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(consumer.tick(&mut rig, &mut host), TickOutcome::Stopped);
    }

    #[test]
    fn test_double_start_is_an_error() {
        let mut session = TrackingSession::new(SessionConfig {
            remote_port: None,
            tick_interval_ms: 50,
        });
        let _consumer = session.start(None).unwrap();
        assert!(session.start(None).is_err());
        // Still running: the failed start must not have torn it down.
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_source_open_failure_returns_to_stopped() {
        let mut session = TrackingSession::new(SessionConfig {
            remote_port: None,
            tick_interval_ms: 50,
        });
        let failing: OpenSource =
            Box::new(|| Err(RigpadError::tracker("camera 0 unavailable")));
        assert!(session.start(Some(failing)).is_err());
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!session.running_flag().load(Ordering::SeqCst));

        // The failure leaves nothing behind; a later start succeeds.
        let _consumer = session.start(None).unwrap();
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_invalid_port_returns_to_stopped() {
        let mut session = TrackingSession::new(SessionConfig {
            remote_port: Some(80),
            tick_interval_ms: 50,
        });
        assert!(session.start(None).is_err());
        assert_eq!(session.state(), SessionState::Stopped);
    }
}
