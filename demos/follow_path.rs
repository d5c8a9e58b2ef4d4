//! Drives a scheduler from a fake 60 Hz host loop and prints the object's
//! coordinates as it flies a short path over Manhattan.
//!
//! Run with `RUST_LOG=debug` to see scheduler logging.

use glam::DVec3;

use geomotion::animation::{CommandKind, CompletionCallback};
use geomotion::{
    AnimationScheduler, Clock, FollowPathOptions, FrameRequests, ManualClock, Model, ObjectEvent,
    TargetState,
};

const FRAME_MS: f64 = 1000.0 / 60.0;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let clock = ManualClock::new(0.0);
    let frames = FrameRequests::new();
    let mut scheduler = AnimationScheduler::new(Box::new(clock.clone()), Box::new(frames.clone()));
    let events = scheduler.subscribe();

    let drone = scheduler.enroll(Model::new("drone"));
    scheduler.set_coords(drone, DVec3::new(-74.0104, 40.7033, 50.0))?;

    let path = [
        DVec3::new(-74.0104, 40.7033, 50.0),
        DVec3::new(-73.9967, 40.7306, 120.0),
        DVec3::new(-73.9857, 40.7484, 200.0),
        DVec3::new(-73.9654, 40.7829, 80.0),
    ];
    let on_arrival: CompletionCallback = Box::new(|_| println!("arrived"));
    scheduler.follow_path(
        drone,
        &path,
        FollowPathOptions {
            duration_ms: Some(2000.0),
            track_heading: true,
        },
        Some(on_arrival),
    )?;

    let mut landed = false;
    while scheduler.queue_len(drone).unwrap_or(0) > 0 {
        clock.advance(FRAME_MS);
        scheduler.tick(clock.now_ms());

        for event in events.try_iter() {
            match event {
                ObjectEvent::Changed { coordinates, .. } => {
                    println!(
                        "t={:>7.1}ms  lng={:.5} lat={:.5} alt={:.1}",
                        clock.now_ms(),
                        coordinates.x,
                        coordinates.y,
                        coordinates.z
                    );
                }
                ObjectEvent::CommandCompleted {
                    kind: CommandKind::FollowPath,
                    ..
                } if !landed => {
                    println!("path finished, landing");
                    landed = true;
                    scheduler.set(
                        drone,
                        TargetState::new().with_translate(DVec3::new(0.0, 0.0, -80.0)),
                        500.0,
                    )?;
                }
                _ => {}
            }
        }
    }

    println!("frames requested: {}", frames.total_requested());
    Ok(())
}
