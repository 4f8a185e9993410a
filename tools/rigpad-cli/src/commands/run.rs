//! Run a tracking session against a built-in demo rig.

use rigpad_face_tracker::source::{LIP_BOTTOM, LIP_TOP};
use rigpad_face_tracker::SyntheticSource;
use rigpad_rig_model::{
    AxisTrackerConfig, BlendMode, ExtractionMode, Group, Mapping, Rig, RigObject, TargetRef,
};
use rigpad_runtime::host::LoggingHost;
use rigpad_runtime::{SessionConfig, TickOutcome, TrackingSession};

pub async fn run(
    port: u16,
    remote: bool,
    tracker: bool,
    capture_fps: u32,
    tick_ms: u64,
) -> anyhow::Result<()> {
    println!("Starting tracking session");
    println!("  Remote: {}", if remote { "enabled" } else { "disabled" });
    println!("  Tracker: {}", if tracker { "synthetic" } else { "disabled" });
    if remote {
        println!("  Port: {port}");
    }
    println!("  Tick: {tick_ms} ms");
    println!();

    let mut session = TrackingSession::new(SessionConfig {
        remote_port: remote.then_some(port),
        tick_interval_ms: tick_ms,
    });

    let source = tracker.then(|| SyntheticSource::opener(capture_fps));
    let mut consumer = session.start(source)?;

    let mut rig = demo_rig();
    let mut host = LoggingHost::default();

    println!("Groups: {}", rig.group_uids().join(", "));
    println!("Press Ctrl+C to stop...");
    println!();

    let mut interval = tokio::time::interval(session.tick_interval());
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if consumer.tick(&mut rig, &mut host) == TickOutcome::Stopped {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                session.stop();
            }
        }
    }

    let mouth = &rig.objects[0].groups[0];
    println!(
        "Final control point: ({:.3}, {:.3})",
        mouth.control.x(),
        mouth.control.y()
    );
    println!("Session stopped.");
    Ok(())
}

/// One face object with a mouth group: two weight channels plus a jaw
/// bone, the vertical axis tracked from the synthetic lip distance.
fn demo_rig() -> Rig {
    let mut mouth = Group::new("Mouth");

    let mut open = Mapping::new(
        TargetRef::Channel {
            channel: "mouth_open".to_string(),
        },
        0.0,
        1.0,
    );
    open.blend_mode = BlendMode::AxisY;
    mouth.mappings.push(open);

    let mut smile = Mapping::new(
        TargetRef::Channel {
            channel: "smile".to_string(),
        },
        1.0,
        0.0,
    );
    smile.blend_mode = BlendMode::AxisX;
    mouth.mappings.push(smile);

    let mut jaw = Mapping::new(
        TargetRef::Bone {
            bone: "jaw".to_string(),
            property: rigpad_rig_model::TransformProperty::Rotation,
            axis: 0,
        },
        0.0,
        1.0,
    );
    jaw.blend_mode = BlendMode::AxisY;
    jaw.magnitude = 0.35;
    mouth.mappings.push(jaw);

    mouth.tracker_y = AxisTrackerConfig {
        mode: ExtractionMode::TwoPointDistance,
        point_a: LIP_TOP,
        point_b: LIP_BOTTOM,
        in_min: 0.0,
        in_max: 0.12,
        out_min: 0.0,
        out_max: 1.0,
        smoothing: Some(0.25),
        ..Default::default()
    };

    let mut face = RigObject::new("Face");
    face.groups.push(mouth);
    Rig {
        objects: vec![face],
        presets: Vec::new(),
    }
}
