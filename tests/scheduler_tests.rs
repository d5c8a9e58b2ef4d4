//! Scheduler Tests
//!
//! Tests for:
//! - Enrollment, idempotent re-enrollment and unenrollment
//! - Immediate and animated `set` (scale, position, rotation, quaternion)
//! - Path following with and without heading
//! - Tick ordering, expiration and completion callbacks
//! - Clip playback, frame requests and the Running state
//! - Validation errors, events, meter units and settings

use std::cell::{Cell, RefCell};
use std::f64::consts::FRAC_PI_4;
use std::rc::Rc;
use std::sync::Arc;

use glam::{DQuat, DVec3};

use geomotion::animation::clip::{AnimationClip, Track, TrackData};
use geomotion::animation::command::{CommandKind, CompletionCallback};
use geomotion::animation::tracks::{InterpolationMode, KeyframeTrack};
use geomotion::animation::TargetPath;
use geomotion::geo::projection::lnglats_to_world;
use geomotion::{
    AnimationScheduler, ClipOptions, Curve, FollowPathOptions, FrameRequests, GeoMotionError,
    ManualClock, Model, Node, ObjectEvent, ObjectHandle, SchedulerSettings, SchedulerState,
    TargetState, Units, project_to_world, projected_units_per_meter,
};

// ============================================================================
// Helpers
// ============================================================================

const EPSILON: f64 = 1e-6;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn vec3_approx(a: DVec3, b: DVec3) -> bool {
    (a - b).abs().max_element() < EPSILON
}

struct Harness {
    scheduler: AnimationScheduler,
    clock: ManualClock,
    frames: FrameRequests,
}

fn harness() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();

    let clock = ManualClock::new(0.0);
    let frames = FrameRequests::new();
    let scheduler = AnimationScheduler::new(Box::new(clock.clone()), Box::new(frames.clone()));
    Harness {
        scheduler,
        clock,
        frames,
    }
}

/// A callback that counts its invocations.
fn counter() -> (Rc<Cell<u32>>, CompletionCallback) {
    let count = Rc::new(Cell::new(0));
    let inner = Rc::clone(&count);
    let callback: CompletionCallback = Box::new(move |_| inner.set(inner.get() + 1));
    (count, callback)
}

fn scale_of(h: &Harness, handle: ObjectHandle) -> DVec3 {
    h.scheduler.object(handle).unwrap().transform().scale
}

fn position_of(h: &Harness, handle: ObjectHandle) -> DVec3 {
    h.scheduler.object(handle).unwrap().transform().position
}

fn rotation_of(h: &Harness, handle: ObjectHandle) -> DQuat {
    h.scheduler.object(handle).unwrap().transform().rotation
}

fn rigged_model() -> Model {
    let mut model = Model::new("walker");
    model.add_node(Node::new("hips"), None);
    model
}

fn walk_clip(name: &str) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name,
        vec![Track::new(
            "hips",
            TargetPath::Translation,
            TrackData::Vector3(KeyframeTrack::new(
                vec![0.0, 1.0],
                vec![DVec3::ZERO, DVec3::new(0.0, 2.0, 0.0)],
                InterpolationMode::Linear,
            )),
        )],
    ))
}

fn enroll_rigged(h: &mut Harness) -> ObjectHandle {
    h.scheduler
        .enroll_with_clips(rigged_model(), vec![walk_clip("idle"), walk_clip("walk")], 0)
}

fn drain_events(rx: &flume::Receiver<ObjectEvent>) -> Vec<ObjectEvent> {
    rx.try_iter().collect()
}

// ============================================================================
// Enrollment
// ============================================================================

#[test]
fn enroll_tracks_coordinates_of_initial_position() {
    let mut h = harness();
    let coords = DVec3::new(-74.0, 40.0, 50.0);
    let mut model = Model::new("box");
    model.transform.position = project_to_world(coords);

    let handle = h.scheduler.enroll(model);

    assert!(h.scheduler.is_enrolled(handle));
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert!(vec3_approx(h.scheduler.coordinates(handle).unwrap(), coords));
}

#[test]
fn enroll_same_model_twice_returns_same_handle() {
    let mut h = harness();
    let model = Model::new("box");

    let first = h.scheduler.enroll(model.clone());
    h.scheduler.set(first, TargetState::new().with_uniform_scale(2.0), 1000.0).unwrap();

    let second = h.scheduler.enroll(model);
    assert_eq!(first, second);
    assert_eq!(h.scheduler.len(), 1);
    // The existing object was left alone.
    assert_eq!(h.scheduler.queue_len(first), Some(1));
}

#[test]
fn unenroll_discards_queue_without_callbacks() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let (count, callback) = counter();

    h.scheduler
        .set_with_callback(handle, TargetState::new().with_uniform_scale(2.0), 1000.0, Some(callback))
        .unwrap();

    let model = h.scheduler.unenroll(handle);
    assert!(model.is_some());
    assert!(h.scheduler.unenroll(handle).is_none());

    h.scheduler.tick(5000.0);
    assert_eq!(count.get(), 0);
    assert!(h.scheduler.is_empty());

    let err = h.scheduler.set(handle, TargetState::new().with_uniform_scale(1.0), 0.0);
    assert!(matches!(err, Err(GeoMotionError::NotEnrolled(_))));
}

// ============================================================================
// Tick basics
// ============================================================================

#[test]
fn tick_with_empty_queues_is_a_no_op() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let rx = h.scheduler.subscribe();
    let repaint = h.scheduler.repaint_flag();
    let before = position_of(&h, handle);

    h.scheduler.tick(100.0);

    assert!(drain_events(&rx).is_empty());
    assert!(!repaint.is_set());
    assert_eq!(position_of(&h, handle), before);
    assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
    assert_eq!(h.scheduler.last_tick(), Some(100.0));
    assert_eq!(h.frames.total_requested(), 0);
}

#[test]
fn immediate_set_applies_and_fires_callback_synchronously() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let (count, callback) = counter();
    let target = DVec3::new(-73.97, 40.78, 0.0);

    h.scheduler
        .set_with_callback(handle, TargetState::new().with_coords(target), 0.0, Some(callback))
        .unwrap();

    assert_eq!(count.get(), 1);
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert_eq!(h.scheduler.coordinates(handle), Some(target));
    assert_eq!(position_of(&h, handle), project_to_world(target));
    assert!(h.scheduler.repaint_flag().is_set());
}

#[test]
fn immediate_set_stops_running_commands() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let (count, callback) = counter();

    h.scheduler
        .set_with_callback(handle, TargetState::new().with_uniform_scale(4.0), 1000.0, Some(callback))
        .unwrap();
    h.scheduler
        .set_coords(handle, DVec3::new(10.0, 10.0, 0.0))
        .unwrap();

    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    h.scheduler.tick(2000.0);
    assert_eq!(count.get(), 0, "stopped command must not complete");
    assert_eq!(scale_of(&h, handle), DVec3::ONE);
}

// ============================================================================
// Animated set
// ============================================================================

#[test]
fn scale_interpolates_and_lands_exactly() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let (count, callback) = counter();

    h.scheduler
        .set_with_callback(handle, TargetState::new().with_uniform_scale(2.0), 1000.0, Some(callback))
        .unwrap();

    h.scheduler.tick(500.0);
    assert!(vec3_approx(scale_of(&h, handle), DVec3::splat(1.5)));
    assert_eq!(count.get(), 0);

    h.scheduler.tick(1000.0);
    assert_eq!(scale_of(&h, handle), DVec3::splat(2.0));
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert_eq!(count.get(), 1);

    // Nothing left to complete.
    h.scheduler.tick(1500.0);
    assert_eq!(count.get(), 1);
}

#[test]
fn position_moves_halfway_in_world_space() {
    let mut h = harness();
    let start = DVec3::new(-74.0, 40.0, 0.0);
    let end = DVec3::new(-73.0, 41.0, 0.0);
    let handle = h.scheduler.enroll(Model::new("box"));
    h.scheduler.set_coords(handle, start).unwrap();

    h.clock.set(1000.0);
    h.scheduler.set(handle, TargetState::new().with_coords(end), 1000.0).unwrap();

    h.scheduler.tick(1500.0);
    let mid = (project_to_world(start) + project_to_world(end)) * 0.5;
    assert!(vec3_approx(position_of(&h, handle), mid), "got {}", position_of(&h, handle));

    h.scheduler.tick(2000.0);
    assert_eq!(position_of(&h, handle), project_to_world(end));
    assert!(vec3_approx(h.scheduler.coordinates(handle).unwrap(), end));
}

#[test]
fn translate_is_relative_to_current_coordinates() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    h.scheduler.set_coords(handle, DVec3::new(-74.0, 40.0, 0.0)).unwrap();

    h.scheduler.set_translate(handle, DVec3::new(1.0, -0.5, 10.0)).unwrap();

    let coords = h.scheduler.coordinates(handle).unwrap();
    assert!(vec3_approx(coords, DVec3::new(-73.0, 39.5, 10.0)), "got {coords}");
}

#[test]
fn world_space_fields_keep_coordinates_in_sync() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let start = DVec3::new(-74.0, 40.0, 0.0);
    h.scheduler.set_coords(handle, start).unwrap();

    let offset = DVec3::new(-500.0, 0.0, 0.0);
    h.scheduler
        .set(handle, TargetState::new().with_world_translate(offset), 0.0)
        .unwrap();
    let moved = h.scheduler.coordinates(handle).unwrap();
    // Mirrored x: a negative world offset moves east.
    assert!(moved.x > start.x);
    assert!(vec3_approx(position_of(&h, handle), project_to_world(start) + offset));

    let target = project_to_world(DVec3::new(-72.0, 41.0, 0.0));
    h.scheduler
        .set(handle, TargetState::new().with_world_coordinates(target), 0.0)
        .unwrap();
    assert!(vec3_approx(h.scheduler.coordinates(handle).unwrap(), DVec3::new(-72.0, 41.0, 0.0)));
}

#[test]
fn set_rotation_applies_immediately() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));

    h.scheduler.set_rotation(handle, DVec3::new(0.0, 90.0, 0.0)).unwrap();

    let expected = DQuat::from_rotation_y(2.0 * FRAC_PI_4);
    assert!(rotation_of(&h, handle).abs_diff_eq(expected, 1e-12));
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
}

#[test]
fn rotation_interpolates_in_degrees() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));

    h.scheduler
        .set(handle, TargetState::new().with_rotation(DVec3::new(0.0, 0.0, 90.0)), 1000.0)
        .unwrap();

    h.scheduler.tick(500.0);
    let expected = DQuat::from_rotation_z(FRAC_PI_4);
    assert!(rotation_of(&h, handle).abs_diff_eq(expected, 1e-9));

    h.scheduler.tick(1000.0);
    let expected = DQuat::from_rotation_z(2.0 * FRAC_PI_4);
    assert!(rotation_of(&h, handle).abs_diff_eq(expected, 1e-9));
}

#[test]
fn quaternion_target_wins_over_rotation() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));

    let target = TargetState::new()
        .with_rotation(DVec3::new(45.0, 0.0, 0.0))
        .with_quaternion(DVec3::new(0.0, 2.0, 0.0), FRAC_PI_4);
    h.scheduler.set(handle, target, 0.0).unwrap();

    // Axis is normalized before use.
    assert!(rotation_of(&h, handle).abs_diff_eq(DQuat::from_rotation_y(FRAC_PI_4), 1e-12));
}

#[test]
fn overlapping_commands_older_write_is_observed_last() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));

    h.scheduler.set(handle, TargetState::new().with_uniform_scale(2.0), 1000.0).unwrap();
    h.scheduler.set(handle, TargetState::new().with_uniform_scale(3.0), 1000.0).unwrap();

    h.scheduler.tick(500.0);
    // Newer command writes 2.0, then the older one overwrites with 1.5.
    assert!(vec3_approx(scale_of(&h, handle), DVec3::splat(1.5)));
}

#[test]
fn objects_are_visited_in_reverse_enrollment_order() {
    let mut h = harness();
    let first = h.scheduler.enroll(Model::new("first"));
    let second = h.scheduler.enroll(Model::new("second"));
    let rx = h.scheduler.subscribe();

    h.scheduler.set(first, TargetState::new().with_uniform_scale(2.0), 1000.0).unwrap();
    h.scheduler.set(second, TargetState::new().with_uniform_scale(2.0), 1000.0).unwrap();
    h.scheduler.tick(500.0);

    let order: Vec<ObjectHandle> = drain_events(&rx)
        .into_iter()
        .filter_map(|e| match e {
            ObjectEvent::Changed { handle, .. } => Some(handle),
            _ => None,
        })
        .collect();
    assert_eq!(order, vec![second, first]);
    assert_eq!(h.scheduler.handles(), &[first, second]);
}

#[test]
fn repaint_flag_raised_by_active_ticks() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let repaint = h.scheduler.repaint_flag();

    h.scheduler.set(handle, TargetState::new().with_uniform_scale(2.0), 1000.0).unwrap();
    assert!(repaint.take());

    h.scheduler.tick(250.0);
    assert!(repaint.take());

    h.scheduler.tick(1000.0);
    assert!(repaint.take());

    h.scheduler.tick(1250.0);
    assert!(!repaint.take());
}

// ============================================================================
// Path following
// ============================================================================

fn sample_path() -> Vec<DVec3> {
    vec![
        DVec3::new(-74.0, 40.0, 0.0),
        DVec3::new(-73.0, 41.0, 0.0),
        DVec3::new(-72.0, 40.0, 0.0),
    ]
}

#[test]
fn follow_path_starts_and_ends_on_path() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));
    let (count, callback) = counter();
    let path = sample_path();

    h.scheduler
        .follow_path(
            handle,
            &path,
            FollowPathOptions {
                duration_ms: Some(3000.0),
                ..Default::default()
            },
            Some(callback),
        )
        .unwrap();

    h.scheduler.tick(0.0);
    assert!(vec3_approx(position_of(&h, handle), project_to_world(path[0])));

    h.scheduler.tick(1500.0);
    let curve = Curve::new(lnglats_to_world(&path));
    assert!(vec3_approx(position_of(&h, handle), curve.point_at(0.5)));
    assert_eq!(count.get(), 0);

    h.scheduler.tick(3000.0);
    assert_eq!(position_of(&h, handle), project_to_world(path[2]));
    assert!(vec3_approx(h.scheduler.coordinates(handle).unwrap(), path[2]));
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert_eq!(count.get(), 1);
}

#[test]
fn follow_path_heading_aligns_up_axis_with_tangent() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));
    let path = sample_path();

    h.scheduler
        .follow_path(
            handle,
            &path,
            FollowPathOptions {
                duration_ms: Some(3000.0),
                track_heading: true,
            },
            None,
        )
        .unwrap();
    h.scheduler.tick(1000.0);

    let curve = Curve::new(lnglats_to_world(&path));
    let tangent = curve.tangent_at(1.0 / 3.0);
    let facing = rotation_of(&h, handle) * DVec3::Y;
    assert!(vec3_approx(facing, tangent), "facing {facing}, tangent {tangent}");
}

#[test]
fn follow_path_due_south_keeps_heading_finite() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));
    let rx = h.scheduler.subscribe();
    // North maps to -y, so a southbound meridian runs along +y.
    let path = [DVec3::new(-74.0, 41.0, 0.0), DVec3::new(-74.0, 40.0, 0.0)];

    h.scheduler
        .follow_path(
            handle,
            &path,
            FollowPathOptions {
                duration_ms: Some(1000.0),
                track_heading: true,
            },
            None,
        )
        .unwrap();

    h.scheduler.tick(500.0);
    assert!(rotation_of(&h, handle).is_finite());
    assert!(vec3_approx(rotation_of(&h, handle) * DVec3::Y, DVec3::Y));

    h.scheduler.tick(1000.0);
    assert!(rotation_of(&h, handle).is_finite());

    for event in drain_events(&rx) {
        if let ObjectEvent::Changed { rotation, .. } = event {
            assert!(rotation.is_finite(), "got {rotation}");
        }
    }

    // A later animated rotation starts from a finite pose.
    h.clock.set(1000.0);
    h.scheduler
        .set(handle, TargetState::new().with_rotation(DVec3::new(0.0, 0.0, 90.0)), 1000.0)
        .unwrap();
    h.scheduler.tick(1500.0);
    assert!(rotation_of(&h, handle).is_finite());
}

#[test]
fn follow_path_due_north_turns_half_way_around() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));
    let path = [DVec3::new(-74.0, 40.0, 0.0), DVec3::new(-74.0, 41.0, 0.0)];

    h.scheduler
        .follow_path(
            handle,
            &path,
            FollowPathOptions {
                duration_ms: Some(1000.0),
                track_heading: true,
            },
            None,
        )
        .unwrap();
    h.scheduler.tick(500.0);

    let facing = rotation_of(&h, handle) * DVec3::Y;
    assert!(vec3_approx(facing, DVec3::NEG_Y), "got {facing}");
}

#[test]
fn follow_path_without_heading_keeps_rotation() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));

    h.scheduler
        .follow_path(
            handle,
            &sample_path(),
            FollowPathOptions {
                duration_ms: Some(3000.0),
                track_heading: false,
            },
            None,
        )
        .unwrap();

    h.scheduler.tick(1000.0);
    assert_eq!(rotation_of(&h, handle), DQuat::IDENTITY);
    h.scheduler.tick(3000.0);
    assert_eq!(rotation_of(&h, handle), DQuat::IDENTITY);
}

#[test]
fn follow_path_uses_default_duration_from_settings() {
    let mut h = harness();
    let settings = SchedulerSettings {
        default_follow_duration_ms: 400.0,
        ..Default::default()
    };
    h.scheduler = AnimationScheduler::new(Box::new(h.clock.clone()), Box::new(h.frames.clone()))
        .with_settings(settings);
    let handle = h.scheduler.enroll(Model::new("plane"));

    h.scheduler
        .follow_path(handle, &sample_path(), FollowPathOptions::default(), None)
        .unwrap();

    let expiration = h
        .scheduler
        .object(handle)
        .unwrap()
        .commands()
        .next()
        .and_then(|c| c.expiration());
    assert_eq!(expiration, Some(400.0));
}

#[test]
fn single_point_path_parks_object() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("plane"));
    let spot = DVec3::new(2.35, 48.85, 0.0);

    h.scheduler
        .follow_path(
            handle,
            &[spot],
            FollowPathOptions {
                duration_ms: Some(100.0),
                track_heading: false,
            },
            None,
        )
        .unwrap();

    h.scheduler.tick(50.0);
    assert_eq!(position_of(&h, handle), project_to_world(spot));
}

// ============================================================================
// Clip playback
// ============================================================================

#[test]
fn clip_command_starts_frame_driving() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    let rx = h.scheduler.subscribe();

    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();
    assert_eq!(h.scheduler.state(), SchedulerState::Stopped);

    h.scheduler.tick(0.0);
    assert!(matches!(h.scheduler.state(), SchedulerState::Running(_)));
    assert!(h.frames.has_pending());
    assert_eq!(h.scheduler.is_playing(handle), Some(true));
    assert!(drain_events(&rx).contains(&ObjectEvent::PlayingChanged {
        handle,
        playing: true
    }));

    // Indefinite playback keeps requesting frames.
    h.frames.drain();
    h.scheduler.tick(16.0);
    assert!(h.frames.has_pending());
    assert_eq!(h.scheduler.queue_len(handle), Some(1));
}

#[test]
fn clip_playback_advances_mixer_by_frame_delta() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.clock.set(1000.0);
    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();

    h.scheduler.tick(1000.0);
    h.scheduler.tick(1250.0);

    let object = h.scheduler.object(handle).unwrap();
    let hips = object.model().node(0).unwrap();
    // 0.25 s into a 1 s clip moving 0 -> 2
    assert!(approx(hips.transform.position.y, 0.5), "got {}", hips.transform.position);
    assert!(approx(object.clips().unwrap().actions()[0].time, 0.25));
}

#[test]
fn cancel_frames_returns_to_stopped() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();
    h.scheduler.tick(0.0);

    h.scheduler.cancel_frames();
    assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
    assert!(!h.frames.has_pending());

    // Once the clip is stopped, nothing restarts frame driving.
    h.scheduler.stop(handle).unwrap();
    h.scheduler.tick(16.0);
    assert_eq!(h.scheduler.state(), SchedulerState::Stopped);
    assert_eq!(h.scheduler.is_playing(handle), Some(false));
}

#[test]
fn running_state_survives_empty_queues() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.scheduler
        .play_default_clip(
            handle,
            ClipOptions {
                duration_ms: Some(100.0),
                ..Default::default()
            },
        )
        .unwrap();

    h.scheduler.tick(0.0);
    h.scheduler.tick(100.0);
    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert_eq!(h.scheduler.is_playing(handle), Some(false));

    let before = h.frames.total_requested();
    h.scheduler.tick(116.0);
    assert!(matches!(h.scheduler.state(), SchedulerState::Running(_)));
    assert_eq!(h.frames.total_requested(), before + 1);
}

#[test]
fn clip_options_switch_clip_and_speed() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);

    h.scheduler
        .play_default_clip(
            handle,
            ClipOptions {
                clip_index: Some(1),
                speed: Some(2.0),
                duration_ms: None,
            },
        )
        .unwrap();

    let player = h.scheduler.object(handle).unwrap().clips().unwrap();
    assert_eq!(player.active_clip(), 1);
    assert!(approx(player.speed(), 1.0));

    h.scheduler.tick(0.0);
    let player = h.scheduler.object(handle).unwrap().clips().unwrap();
    assert!(approx(player.speed(), 2.0));
}

#[test]
fn first_clip_tick_advances_from_command_start() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();

    h.scheduler.tick(16.0);

    let time = h.scheduler.object(handle).unwrap().clips().unwrap().actions()[0].time;
    assert!(approx(time, 0.016), "got {time}");
}

#[test]
fn queued_clip_speed_does_not_touch_playing_clip() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();
    h.scheduler.tick(0.0);
    h.scheduler.tick(100.0);

    h.clock.set(100.0);
    h.scheduler
        .play_default_clip(
            handle,
            ClipOptions {
                speed: Some(2.0),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(approx(h.scheduler.object(handle).unwrap().clips().unwrap().speed(), 1.0));

    // The newer command drives this frame at double speed.
    h.scheduler.tick(200.0);
    let time = h.scheduler.object(handle).unwrap().clips().unwrap().actions()[0].time;
    assert!(approx(time, 0.3), "got {time}");
}

#[test]
fn invalid_clip_index_keeps_current_clip() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);

    h.scheduler
        .play_default_clip(
            handle,
            ClipOptions {
                clip_index: Some(9),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(h.scheduler.queue_len(handle), Some(1));
    assert_eq!(h.scheduler.object(handle).unwrap().clips().unwrap().active_clip(), 0);

    assert!(!h.scheduler.set_active_clip(handle, 9).unwrap());
    assert!(h.scheduler.set_active_clip(handle, 1).unwrap());
}

#[test]
fn pause_and_resume_clips() {
    let mut h = harness();
    let handle = enroll_rigged(&mut h);
    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();
    h.scheduler.tick(0.0);

    h.scheduler.pause_clips(handle).unwrap();
    h.scheduler.tick(500.0);
    let time = h.scheduler.object(handle).unwrap().clips().unwrap().actions()[0].time;
    assert!(approx(time, 0.0));

    h.scheduler.resume_clips(handle).unwrap();
    h.scheduler.tick(600.0);
    let time = h.scheduler.object(handle).unwrap().clips().unwrap().actions()[0].time;
    assert!(approx(time, 0.1));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn rejected_commands_are_not_enqueued() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));

    assert!(matches!(
        h.scheduler.set(handle, TargetState::new(), 100.0),
        Err(GeoMotionError::MissingTarget)
    ));
    assert!(matches!(
        h.scheduler.set(handle, TargetState::new().with_uniform_scale(2.0), -1.0),
        Err(GeoMotionError::InvalidDuration(_))
    ));
    assert!(matches!(
        h.scheduler.set(handle, TargetState::new().with_uniform_scale(2.0), f64::NAN),
        Err(GeoMotionError::InvalidDuration(_))
    ));
    assert!(matches!(
        h.scheduler.follow_path(handle, &[], FollowPathOptions::default(), None),
        Err(GeoMotionError::EmptyPath)
    ));
    assert!(matches!(
        h.scheduler.play_default_clip(handle, ClipOptions::default()),
        Err(GeoMotionError::NoAnimationClips(_))
    ));
    assert!(matches!(
        h.scheduler.pause_clips(handle),
        Err(GeoMotionError::NoAnimationClips(_))
    ));

    assert_eq!(h.scheduler.queue_len(handle), Some(0));
}

#[test]
fn unknown_handle_is_rejected() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    h.scheduler.unenroll(handle);

    assert!(matches!(
        h.scheduler.follow_path(handle, &sample_path(), FollowPathOptions::default(), None),
        Err(GeoMotionError::NotEnrolled(_))
    ));
    assert!(matches!(h.scheduler.stop(handle), Err(GeoMotionError::NotEnrolled(_))));
    assert!(h.scheduler.coordinates(handle).is_none());
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn changed_event_reports_new_pose() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let rx = h.scheduler.subscribe();
    let coords = DVec3::new(-74.0, 40.0, 0.0);

    h.scheduler.set_coords(handle, coords).unwrap();

    let events = drain_events(&rx);
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[1],
        ObjectEvent::CommandCompleted {
            handle,
            kind: CommandKind::SetState,
        }
    );
    match &events[0] {
        ObjectEvent::Changed {
            handle: h2,
            coordinates,
            position,
            ..
        } => {
            assert_eq!(*h2, handle);
            assert_eq!(*coordinates, coords);
            assert_eq!(*position, project_to_world(coords));
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn immediate_set_emits_completion_after_callback() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let rx = h.scheduler.subscribe();
    let (count, callback) = counter();

    h.scheduler
        .set_with_callback(handle, TargetState::new().with_uniform_scale(3.0), 0.0, Some(callback))
        .unwrap();

    assert_eq!(count.get(), 1);
    let completed: Vec<ObjectEvent> = drain_events(&rx)
        .into_iter()
        .filter(|e| matches!(e, ObjectEvent::CommandCompleted { .. }))
        .collect();
    assert_eq!(
        completed,
        vec![ObjectEvent::CommandCompleted {
            handle,
            kind: CommandKind::SetState,
        }]
    );
}

#[test]
fn completion_event_allows_chaining() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let rx = h.scheduler.subscribe();

    h.scheduler.set(handle, TargetState::new().with_uniform_scale(2.0), 100.0).unwrap();
    h.scheduler.tick(100.0);

    let completed = drain_events(&rx).into_iter().any(|e| {
        e == ObjectEvent::CommandCompleted {
            handle,
            kind: CommandKind::SetState,
        }
    });
    assert!(completed);

    h.clock.set(100.0);
    h.scheduler.set(handle, TargetState::new().with_uniform_scale(1.0), 100.0).unwrap();
    h.scheduler.tick(200.0);
    assert_eq!(scale_of(&h, handle), DVec3::ONE);
}

#[test]
fn callbacks_fire_once_each_in_queue_order_reversed() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("box"));
    let fired = Rc::new(RefCell::new(Vec::new()));

    for name in ["older", "newer"] {
        let fired = Rc::clone(&fired);
        let callback: CompletionCallback = Box::new(move |_: ObjectHandle| fired.borrow_mut().push(name));
        h.scheduler
            .set_with_callback(
                handle,
                TargetState::new().with_uniform_scale(2.0),
                100.0,
                Some(callback),
            )
            .unwrap();
    }

    h.scheduler.tick(100.0);
    h.scheduler.tick(200.0);
    assert_eq!(*fired.borrow(), vec!["newer", "older"]);
}

// ============================================================================
// Units & settings
// ============================================================================

#[test]
fn meter_models_rescale_with_latitude() {
    let mut h = harness();
    let handle = h.scheduler.enroll(Model::new("tower").with_units(Units::Meters));

    let equator = projected_units_per_meter(0.0);
    assert!(vec3_approx(scale_of(&h, handle), DVec3::splat(equator)));

    h.scheduler.set_coords(handle, DVec3::new(0.0, 60.0, 0.0)).unwrap();
    let at_sixty = scale_of(&h, handle);
    assert!(approx(at_sixty.x / equator, 2.0), "got {}", at_sixty.x / equator);

    h.scheduler
        .set(handle, TargetState::new().with_uniform_scale(3.0), 0.0)
        .unwrap();
    assert_eq!(h.scheduler.object(handle).unwrap().base_scale(), DVec3::splat(3.0));
    assert!(vec3_approx(
        scale_of(&h, handle),
        DVec3::splat(3.0 * projected_units_per_meter(60.0))
    ));
}

#[test]
fn settings_load_partial_json() {
    let settings = SchedulerSettings::from_json(
        r#"{ "default_clip_speed": 2.0, "default_clip_duration_ms": 1500.0 }"#,
    )
    .unwrap();

    assert!(approx(settings.default_clip_speed, 2.0));
    assert_eq!(settings.default_clip_duration_ms, Some(1500.0));
    assert!(approx(settings.default_follow_duration_ms, 1000.0));
    assert_eq!(settings.up_axis, DVec3::Y);

    assert!(matches!(
        SchedulerSettings::from_json("{ not json"),
        Err(GeoMotionError::JsonError(_))
    ));
}

#[test]
fn clip_duration_defaults_from_settings() {
    let mut h = harness();
    let settings = SchedulerSettings {
        default_clip_duration_ms: Some(250.0),
        ..Default::default()
    };
    h.scheduler = AnimationScheduler::new(Box::new(h.clock.clone()), Box::new(h.frames.clone()))
        .with_settings(settings);
    let handle = enroll_rigged(&mut h);

    h.scheduler.play_default_clip(handle, ClipOptions::default()).unwrap();
    h.scheduler.tick(0.0);
    h.scheduler.tick(250.0);

    assert_eq!(h.scheduler.queue_len(handle), Some(0));
    assert_eq!(h.scheduler.is_playing(handle), Some(false));
}
