//! Rigpad Rig Model
//!
//! Defines the core data contracts for Rigpad:
//! - **Groups and mappings:** a named 2D control point plus the weighted
//!   falloff targets it drives
//! - **Tracker configuration:** per-group, per-axis landmark extraction
//!   settings, snapshotted into an immutable per-tick set
//! - **Landmark frames:** ordered normalized 3D points from the capture
//!   collaborator
//! - **Rig:** the objects/groups document plus the preset store
//! - **Persisted config:** the JSON group-settings exchange format
//!
//! Control-point components are clamped to `[-1.0, 1.0]`; mapping anchors
//! live in control-point space scaled by the group's derived limit.

pub mod config;
pub mod group;
pub mod landmark;
pub mod preset;
pub mod rig;
pub mod tracker;

pub use config::*;
pub use group::*;
pub use landmark::*;
pub use preset::*;
pub use rig::*;
pub use tracker::*;
