//! Shared cells between the acquisition thread and the consumer.
//!
//! Both directions use single-slot overwrite semantics: the producer
//! publishes its newest complete snapshot (latest write wins) and the
//! consumer publishes the newest tracker configuration. Neither side
//! ever blocks on the other beyond the slot mutex.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rigpad_rig_model::Vec2;

/// A single-slot cell holding the most recent value.
///
/// `publish` overwrites whatever is stored; `take` consumes the stored
/// value so a reader acts on each publication at most once; `peek`
/// clones without consuming (used for configuration, which readers want
/// on every iteration).
#[derive(Debug)]
pub struct Latest<T> {
    slot: Arc<Mutex<Option<T>>>,
}

impl<T> Clone for Latest<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> Default for Latest<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Latest<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Store a value, discarding any unconsumed predecessor.
    pub fn publish(&self, value: T) {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Some(value);
        }
    }

    /// Remove and return the stored value, if any.
    pub fn take(&self) -> Option<T> {
        self.slot.lock().ok().and_then(|mut slot| slot.take())
    }
}

impl<T: Clone> Latest<T> {
    /// Clone the stored value without consuming it.
    pub fn peek(&self) -> Option<T> {
        self.slot.lock().ok().and_then(|slot| slot.clone())
    }
}

/// One complete acquisition result, published per captured frame.
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    /// Conditioned drive vector per tracked group UID.
    pub vectors: HashMap<String, Vec2>,

    /// Raw pre-normalization axis values per tracked group UID, for
    /// diagnostics display.
    pub raw: HashMap<String, Vec2>,

    /// 2D landmark positions for overlay rendering.
    pub landmarks: Vec<(f64, f64)>,

    /// Producer-side frames-per-second estimate.
    pub fps: f64,
}
