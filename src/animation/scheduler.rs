//! Animation scheduler
//!
//! Owns every enrolled object and advances their command queues once per
//! host frame.
//!
//! # Tick order
//!
//! A tick reads `now` once. Objects are visited in reverse enrollment order
//! and each object's queue in reverse queue order, so removals never disturb
//! the indices still to be visited. Every command is evaluated on its own;
//! when two commands write the same attribute in one tick, the older one
//! writes last.
//!
//! # Frame driving
//!
//! The scheduler is [`SchedulerState::Stopped`] until a clip command is first
//! observed active. From then on it is `Running` and requests another frame
//! from the [`FrameHost`] at the end of every tick, until
//! [`AnimationScheduler::cancel_frames`] cancels the outstanding token.

use std::sync::Arc;

use glam::{DQuat, DVec3};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use uuid::Uuid;

use crate::animation::applier::{apply_state, resolve_position};
use crate::animation::clip::AnimationClip;
use crate::animation::command::{
    AnimationCommand, ClipParams, CommandAction, CommandKind, CommandStep, CompletionCallback,
    FollowPathParams, LinearRate, SetStateParams,
};
use crate::animation::events::{EventBus, ObjectEvent};
use crate::animation::object::AnimatedObject;
use crate::animation::player::ClipPlayer;
use crate::animation::state::TargetState;
use crate::animation::ObjectHandle;
use crate::errors::{GeoMotionError, Result};
use crate::geo::projection::{lnglats_to_world, to_radians};
use crate::geo::Curve;
use crate::scene::Model;
use crate::settings::SchedulerSettings;
use crate::utils::{Clock, FrameHost, FrameRequests, FrameToken, RepaintFlag, SystemClock};

/// Whether continuous frame-driven playback is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    /// Holds the outstanding frame request.
    Running(FrameToken),
}

/// Options for [`AnimationScheduler::follow_path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowPathOptions {
    /// Falls back to [`SchedulerSettings::default_follow_duration_ms`].
    pub duration_ms: Option<f64>,
    /// Orient the object along the path tangent.
    pub track_heading: bool,
}

impl Default for FollowPathOptions {
    fn default() -> Self {
        Self {
            duration_ms: None,
            track_heading: true,
        }
    }
}

/// Options for [`AnimationScheduler::play_default_clip`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ClipOptions {
    /// Clip to make active before playing. Invalid indices are logged and ignored.
    pub clip_index: Option<usize>,
    /// Falls back to [`SchedulerSettings::default_clip_speed`]. Takes effect
    /// once the command is active; the clip switch above happens at enqueue.
    pub speed: Option<f64>,
    /// Falls back to [`SchedulerSettings::default_clip_duration_ms`];
    /// `None` there too means play until stopped.
    pub duration_ms: Option<f64>,
}

/// Mutable state shared by all objects during one tick.
struct TickContext<'a> {
    events: &'a mut EventBus,
    repaint: bool,
    clip_active: bool,
}

/// The per-frame driver for every animated object.
pub struct AnimationScheduler {
    objects: SlotMap<ObjectHandle, AnimatedObject>,
    /// Enrollment order; ticks walk it backwards.
    order: Vec<ObjectHandle>,
    by_model: FxHashMap<Uuid, ObjectHandle>,

    state: SchedulerState,
    clock: Box<dyn Clock>,
    frames: Box<dyn FrameHost>,
    repaint: RepaintFlag,
    events: EventBus,
    settings: SchedulerSettings,

    last_tick: Option<f64>,
}

impl AnimationScheduler {
    #[must_use]
    pub fn new(clock: Box<dyn Clock>, frames: Box<dyn FrameHost>) -> Self {
        Self {
            objects: SlotMap::with_key(),
            order: Vec::new(),
            by_model: FxHashMap::default(),
            state: SchedulerState::Stopped,
            clock,
            frames,
            repaint: RepaintFlag::new(),
            events: EventBus::new(),
            settings: SchedulerSettings::default(),
            last_tick: None,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SchedulerSettings) -> Self {
        self.settings = settings;
        self
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SchedulerSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// A handle on the shared repaint flag for the renderer to poll.
    #[must_use]
    pub fn repaint_flag(&self) -> RepaintFlag {
        self.repaint.clone()
    }

    #[inline]
    #[must_use]
    pub fn last_tick(&self) -> Option<f64> {
        self.last_tick
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    #[must_use]
    pub fn is_enrolled(&self, handle: ObjectHandle) -> bool {
        self.objects.contains_key(handle)
    }

    #[must_use]
    pub fn object(&self, handle: ObjectHandle) -> Option<&AnimatedObject> {
        self.objects.get(handle)
    }

    #[must_use]
    pub fn coordinates(&self, handle: ObjectHandle) -> Option<DVec3> {
        self.objects.get(handle).map(AnimatedObject::coordinates)
    }

    #[must_use]
    pub fn queue_len(&self, handle: ObjectHandle) -> Option<usize> {
        self.objects.get(handle).map(AnimatedObject::queue_len)
    }

    #[must_use]
    pub fn is_playing(&self, handle: ObjectHandle) -> Option<bool> {
        self.objects.get(handle).map(AnimatedObject::is_playing)
    }

    /// Enrolled handles in enrollment order.
    #[must_use]
    pub fn handles(&self) -> &[ObjectHandle] {
        &self.order
    }

    /// Opens a channel receiving every [`ObjectEvent`] from now on.
    pub fn subscribe(&mut self) -> flume::Receiver<ObjectEvent> {
        self.events.subscribe()
    }

    // ========================================================================
    // Enrollment
    // ========================================================================

    /// Enrolls a model without clips.
    pub fn enroll(&mut self, model: Model) -> ObjectHandle {
        self.enroll_with_clips(model, Vec::new(), 0)
    }

    /// Enrolls a model with its animation clips.
    ///
    /// Enrolling a model whose identity is already enrolled returns the
    /// existing handle and leaves that object untouched.
    pub fn enroll_with_clips(
        &mut self,
        model: Model,
        clips: Vec<Arc<AnimationClip>>,
        default_clip: usize,
    ) -> ObjectHandle {
        if let Some(&handle) = self.by_model.get(&model.id()) {
            log::debug!("Model '{}' is already enrolled as {handle:?}", model.name);
            return handle;
        }

        let id = model.id();
        let player = ClipPlayer::new(&model, clips, default_clip);
        log::debug!(
            "Enrolling model '{}' ({} clips)",
            model.name,
            player.as_ref().map_or(0, ClipPlayer::clip_count)
        );

        let handle = self.objects.insert(AnimatedObject::new(model, player));
        self.order.push(handle);
        self.by_model.insert(id, handle);
        handle
    }

    /// Removes an object, discarding its queue without firing callbacks.
    ///
    /// Returns the model, or `None` if the handle was not enrolled.
    pub fn unenroll(&mut self, handle: ObjectHandle) -> Option<Model> {
        let object = self.objects.remove(handle)?;
        self.order.retain(|&h| h != handle);
        self.by_model.remove(&object.model.id());

        log::debug!(
            "Unenrolled model '{}', discarding {} queued commands",
            object.model.name,
            object.queue.len()
        );
        Some(object.model)
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Moves `handle` toward `target` over `duration_ms`.
    ///
    /// A zero duration stops the object's current commands and applies the
    /// target before returning, emitting `Changed` then `CommandCompleted`.
    pub fn set(&mut self, handle: ObjectHandle, target: TargetState, duration_ms: f64) -> Result<()> {
        self.set_with_callback(handle, target, duration_ms, None)
    }

    /// [`set`](Self::set) with a callback fired once the target is reached.
    pub fn set_with_callback(
        &mut self,
        handle: ObjectHandle,
        target: TargetState,
        duration_ms: f64,
        on_complete: Option<CompletionCallback>,
    ) -> Result<()> {
        validate_duration(duration_ms)?;
        if target.is_empty() {
            return Err(GeoMotionError::MissingTarget);
        }
        if !self.objects.contains_key(handle) {
            return Err(GeoMotionError::NotEnrolled(handle));
        }

        if duration_ms == 0.0 {
            self.stop(handle)?;
            let object = self
                .objects
                .get_mut(handle)
                .ok_or(GeoMotionError::NotEnrolled(handle))?;
            apply_state(handle, object, &target, &mut self.events);
            if let Some(callback) = on_complete {
                callback(handle);
            }
            self.events.emit(&ObjectEvent::CommandCompleted {
                handle,
                kind: CommandKind::SetState,
            });
            self.repaint.request();
            return Ok(());
        }

        let start = self.clock.now_ms();
        let object = self.object_mut(handle)?;
        let params = build_set_state(object, target, duration_ms);

        let command = AnimationCommand::new(CommandAction::SetState(params), start, duration_ms)
            .with_callback(on_complete);
        log::debug!("Queued {:?} on {handle:?}", command);
        object.queue.push(command);

        self.repaint.request();
        Ok(())
    }

    /// Places the object at `coords` `(lng, lat, alt)` immediately.
    pub fn set_coords(&mut self, handle: ObjectHandle, coords: DVec3) -> Result<()> {
        self.set(handle, TargetState::new().with_coords(coords), 0.0)
    }

    /// Sets the XYZ Euler rotation (degrees) immediately.
    pub fn set_rotation(&mut self, handle: ObjectHandle, degrees: DVec3) -> Result<()> {
        self.set(handle, TargetState::new().with_rotation(degrees), 0.0)
    }

    /// Offsets the object by `(dlng, dlat, dalt)` immediately.
    pub fn set_translate(&mut self, handle: ObjectHandle, delta: DVec3) -> Result<()> {
        self.set(handle, TargetState::new().with_translate(delta), 0.0)
    }

    /// Moves the object along `path` (`(lng, lat, alt)` points).
    pub fn follow_path(
        &mut self,
        handle: ObjectHandle,
        path: &[DVec3],
        options: FollowPathOptions,
        on_complete: Option<CompletionCallback>,
    ) -> Result<()> {
        let duration_ms = options
            .duration_ms
            .unwrap_or(self.settings.default_follow_duration_ms);
        validate_duration(duration_ms)?;
        if path.is_empty() {
            return Err(GeoMotionError::EmptyPath);
        }
        if !self.objects.contains_key(handle) {
            return Err(GeoMotionError::NotEnrolled(handle));
        }

        let curve = Curve::with_resolution(
            lnglats_to_world(path),
            self.settings.arc_length_divisions,
            self.settings.tangent_delta,
        );
        let params = FollowPathParams {
            curve,
            track_heading: options.track_heading,
            up_axis: self.settings.up_axis,
        };

        let start = self.clock.now_ms();
        let command = AnimationCommand::new(CommandAction::FollowPath(params), start, duration_ms)
            .with_callback(on_complete);
        log::debug!("Queued {:?} on {handle:?} ({} points)", command, path.len());
        self.object_mut(handle)?.queue.push(command);

        self.repaint.request();
        Ok(())
    }

    /// Plays the object's active clip, optionally switching clips first.
    pub fn play_default_clip(&mut self, handle: ObjectHandle, options: ClipOptions) -> Result<()> {
        let duration_ms = options
            .duration_ms
            .or(self.settings.default_clip_duration_ms)
            .unwrap_or(f64::INFINITY);
        if duration_ms.is_nan() || duration_ms < 0.0 {
            return Err(GeoMotionError::InvalidDuration(duration_ms));
        }
        let speed = options.speed.unwrap_or(self.settings.default_clip_speed);

        let start = self.clock.now_ms();
        let object = self.object_mut(handle)?;
        let Some(player) = object.clips.as_mut() else {
            return Err(GeoMotionError::NoAnimationClips(handle));
        };

        if let Some(index) = options.clip_index {
            player.set_active_clip(index);
        }

        let command = AnimationCommand::new(
            CommandAction::PlayDefaultClip(ClipParams { speed }),
            start,
            duration_ms,
        );
        log::debug!("Queued {:?} on {handle:?}", command);
        object.queue.push(command);

        self.repaint.request();
        Ok(())
    }

    /// Makes clip `index` the active one without queueing playback.
    ///
    /// Returns `false` (after logging) when `index` is out of range.
    pub fn set_active_clip(&mut self, handle: ObjectHandle, index: usize) -> Result<bool> {
        let object = self.object_mut(handle)?;
        let player = object
            .clips
            .as_mut()
            .ok_or(GeoMotionError::NoAnimationClips(handle))?;
        Ok(player.set_active_clip(index))
    }

    pub fn pause_clips(&mut self, handle: ObjectHandle) -> Result<()> {
        let object = self.object_mut(handle)?;
        let player = object
            .clips
            .as_mut()
            .ok_or(GeoMotionError::NoAnimationClips(handle))?;
        player.pause_all();
        Ok(())
    }

    pub fn resume_clips(&mut self, handle: ObjectHandle) -> Result<()> {
        let object = self.object_mut(handle)?;
        let player = object
            .clips
            .as_mut()
            .ok_or(GeoMotionError::NoAnimationClips(handle))?;
        player.resume_all();
        Ok(())
    }

    /// Clears the object's queue and halts clip playback.
    ///
    /// Pending callbacks are dropped. The frame token is left alone; use
    /// [`cancel_frames`](Self::cancel_frames) to stop frame requests.
    pub fn stop(&mut self, handle: ObjectHandle) -> Result<()> {
        let object = self
            .objects
            .get_mut(handle)
            .ok_or(GeoMotionError::NotEnrolled(handle))?;

        object.queue.clear();
        halt_clips(handle, object, &mut self.events);
        Ok(())
    }

    /// Cancels the outstanding frame request and returns to `Stopped`.
    pub fn cancel_frames(&mut self) {
        if let SchedulerState::Running(token) = self.state {
            self.frames.cancel_frame(token);
            self.state = SchedulerState::Stopped;
            log::debug!("Cancelled frame request {token:?}");
        }
    }

    // ========================================================================
    // Tick
    // ========================================================================

    /// Advances every enrolled object to `now` (milliseconds).
    pub fn tick(&mut self, now: f64) {
        let mut ctx = TickContext {
            events: &mut self.events,
            repaint: false,
            clip_active: false,
        };

        for index in (0..self.order.len()).rev() {
            let handle = self.order[index];
            if let Some(object) = self.objects.get_mut(handle) {
                advance_object(handle, object, now, &mut ctx);
            }
        }

        let TickContext {
            repaint,
            clip_active,
            ..
        } = ctx;

        match self.state {
            SchedulerState::Stopped if clip_active => {
                let token = self.frames.request_frame();
                self.state = SchedulerState::Running(token);
                log::debug!("Scheduler running, frame {token:?}");
            }
            SchedulerState::Running(_) => {
                self.state = SchedulerState::Running(self.frames.request_frame());
            }
            SchedulerState::Stopped => {}
        }

        if repaint {
            self.repaint.request();
        }
        self.last_tick = Some(now);
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut AnimatedObject> {
        self.objects
            .get_mut(handle)
            .ok_or(GeoMotionError::NotEnrolled(handle))
    }
}

impl Default for AnimationScheduler {
    /// System clock and a [`FrameRequests`] host nobody drains.
    fn default() -> Self {
        Self::new(Box::new(SystemClock::new()), Box::new(FrameRequests::new()))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn validate_duration(duration_ms: f64) -> Result<()> {
    if duration_ms.is_finite() && duration_ms >= 0.0 {
        Ok(())
    } else {
        Err(GeoMotionError::InvalidDuration(duration_ms))
    }
}

/// Captures start values and rates for an animated `set`.
fn build_set_state(object: &AnimatedObject, target: TargetState, duration_ms: f64) -> SetStateParams {
    let transform = &object.model.transform;
    let mut end_state = TargetState::new();

    let rotation = target.rotation.map(|degrees| {
        end_state.rotation = Some(degrees);
        LinearRate::new(transform.rotation_euler(), to_radians(degrees), duration_ms)
    });

    let scale = target.scale.map(|end| {
        end_state.scale = Some(end);
        LinearRate::new(object.base_scale, end, duration_ms)
    });

    let quaternion = target.quaternion.map(|(axis, angle)| {
        end_state.quaternion = Some((axis, angle));
        (transform.rotation, DQuat::from_axis_angle(axis.normalize(), angle))
    });

    let path = resolve_position(&target, transform.position, object.coordinates).map(
        |(end_position, _)| {
            end_state.world_coordinates = Some(end_position);
            Curve::new(vec![transform.position, end_position])
        },
    );

    SetStateParams {
        rotation,
        scale,
        quaternion,
        path,
        end_state,
    }
}

/// Runs one object's queue for this tick.
fn advance_object(handle: ObjectHandle, object: &mut AnimatedObject, now: f64, ctx: &mut TickContext<'_>) {
    let mut index = object.queue.len();

    while index > 0 {
        index -= 1;

        let Some(expiration) = object.queue[index].expiration else {
            object.queue.remove(index);
            continue;
        };

        if now >= expiration {
            let mut command = object.queue.remove(index);
            command.expiration = None;
            finish_command(handle, object, command, ctx);
            ctx.repaint = true;
            continue;
        }

        let step = object.queue[index].step(now);
        match step {
            CommandStep::Apply(state) => apply_state(handle, object, &state, ctx.events),
            CommandStep::AdvanceClip { start, speed } => {
                advance_clip(handle, object, now, start, speed, ctx.events);
                ctx.clip_active = true;
            }
        }
        ctx.repaint = true;
    }
}

/// Terminal resolution of an expired command.
fn finish_command(
    handle: ObjectHandle,
    object: &mut AnimatedObject,
    command: AnimationCommand,
    ctx: &mut TickContext<'_>,
) {
    let kind = command.kind();
    let AnimationCommand {
        action,
        on_complete,
        ..
    } = command;

    match action {
        CommandAction::SetState(params) => {
            apply_state(handle, object, &params.end_state, ctx.events);
        }
        CommandAction::FollowPath(params) => {
            apply_state(handle, object, &params.end_state(), ctx.events);
        }
        CommandAction::PlayDefaultClip(_) => halt_clips(handle, object, ctx.events),
    }

    if let Some(callback) = on_complete {
        callback(handle);
    }

    log::trace!("{kind:?} on {handle:?} completed");
    ctx.events.emit(&ObjectEvent::CommandCompleted { handle, kind });
}

/// Activates clips and advances the mixer by the time since the object's last clip tick.
///
/// The first active tick measures from the command's `start`.
fn advance_clip(
    handle: ObjectHandle,
    object: &mut AnimatedObject,
    now: f64,
    start: f64,
    speed: f64,
    events: &mut EventBus,
) {
    let last = object.last_clip_tick.unwrap_or(start);
    let delta_ms = (now - last).max(0.0);
    object.last_clip_tick = Some(now);

    if let Some(player) = object.clips.as_mut() {
        player.activate_all();
        player.set_speed(speed);
        player.update(delta_ms / 1000.0, &mut object.model);
        object.model.update_world_matrices();
    }

    set_playing(handle, object, true, events);
}

fn halt_clips(handle: ObjectHandle, object: &mut AnimatedObject, events: &mut EventBus) {
    if let Some(player) = object.clips.as_mut() {
        player.deactivate_all();
    }
    object.last_clip_tick = None;
    set_playing(handle, object, false, events);
}

fn set_playing(handle: ObjectHandle, object: &mut AnimatedObject, playing: bool, events: &mut EventBus) {
    if object.playing != playing {
        object.playing = playing;
        events.emit(&ObjectEvent::PlayingChanged { handle, playing });
    }
}
