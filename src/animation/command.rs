//! Queued animation commands
//!
//! An [`AnimationCommand`] is one directive sitting in an object's queue.
//! Interpolation parameters are resolved when the command is created (start
//! values, per-millisecond rates, curves, absolute end state) so that a tick
//! only has to evaluate them at the current time.

use std::fmt;

use glam::{DQuat, DVec3};

use crate::animation::state::TargetState;
use crate::animation::ObjectHandle;
use crate::geo::projection::to_degrees;
use crate::geo::Curve;

/// Invoked once when a command expires. Never invoked for discarded commands.
pub type CompletionCallback = Box<dyn FnOnce(ObjectHandle)>;

/// Which variant a command is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    SetState,
    FollowPath,
    PlayDefaultClip,
}

/// A linearly interpolated vector: `start + per_ms · elapsed`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRate {
    pub start: DVec3,
    pub per_ms: DVec3,
}

impl LinearRate {
    #[must_use]
    pub fn new(start: DVec3, end: DVec3, duration_ms: f64) -> Self {
        Self {
            start,
            per_ms: (end - start) / duration_ms,
        }
    }

    #[inline]
    #[must_use]
    pub fn at(&self, elapsed_ms: f64) -> DVec3 {
        self.start + self.per_ms * elapsed_ms
    }
}

/// Interpolation toward an end state.
#[derive(Debug, Clone)]
pub struct SetStateParams {
    /// Euler rotation in radians.
    pub rotation: Option<LinearRate>,
    pub scale: Option<LinearRate>,
    pub quaternion: Option<(DQuat, DQuat)>,
    /// World-space move from the position at enqueue time.
    pub path: Option<Curve>,
    /// Absolute state applied at expiration.
    pub end_state: TargetState,
}

/// Motion along a precomputed world-space curve.
#[derive(Debug, Clone)]
pub struct FollowPathParams {
    pub curve: Curve,
    pub track_heading: bool,
    pub up_axis: DVec3,
}

impl FollowPathParams {
    /// Pose on the curve at arc-length `progress`.
    #[must_use]
    pub fn sample(&self, progress: f64) -> TargetState {
        let state = TargetState::new().with_world_coordinates(self.curve.point_at(progress));
        if self.track_heading {
            let (axis, angle) = heading_axis_angle(self.up_axis, self.curve.tangent_at(progress));
            state.with_quaternion(axis, angle)
        } else {
            state
        }
    }

    /// Final pose: exactly the last path point.
    #[must_use]
    pub fn end_state(&self) -> TargetState {
        let last = self.curve.points().last().copied().unwrap_or(DVec3::ZERO);
        let state = TargetState::new().with_world_coordinates(last);
        if self.track_heading {
            let (axis, angle) = heading_axis_angle(self.up_axis, self.curve.tangent_at(1.0));
            state.with_quaternion(axis, angle)
        } else {
            state
        }
    }
}

/// Shortest-arc rotation taking `up` onto `tangent`, as an axis-angle pair.
///
/// Parallel and anti-parallel tangents stay finite. A zero-length `up` or
/// `tangent` yields the identity rotation.
#[must_use]
pub fn heading_axis_angle(up: DVec3, tangent: DVec3) -> (DVec3, f64) {
    match (up.try_normalize(), tangent.try_normalize()) {
        (Some(up), Some(tangent)) => DQuat::from_rotation_arc(up, tangent).to_axis_angle(),
        _ => (DVec3::Y, 0.0),
    }
}

/// Skeletal clip playback. `speed` is applied while the command is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipParams {
    pub speed: f64,
}

#[derive(Debug, Clone)]
pub enum CommandAction {
    SetState(SetStateParams),
    FollowPath(FollowPathParams),
    PlayDefaultClip(ClipParams),
}

/// What a tick should do for a still-active command.
#[derive(Debug, Clone)]
pub(crate) enum CommandStep {
    Apply(TargetState),
    /// Advances clip playback; `start` stands in for the previous clip tick
    /// on the first active frame.
    AdvanceClip { start: f64, speed: f64 },
}

/// One queued directive.
pub struct AnimationCommand {
    pub(crate) start: f64,
    pub(crate) expiration: Option<f64>,
    pub(crate) action: CommandAction,
    pub(crate) on_complete: Option<CompletionCallback>,
}

impl AnimationCommand {
    /// A command running from `start` for `duration_ms`.
    ///
    /// An infinite duration never expires.
    #[must_use]
    pub fn new(action: CommandAction, start: f64, duration_ms: f64) -> Self {
        Self {
            start,
            expiration: Some(start + duration_ms),
            action,
            on_complete: None,
        }
    }

    #[must_use]
    pub fn with_callback(mut self, on_complete: Option<CompletionCallback>) -> Self {
        self.on_complete = on_complete;
        self
    }

    #[must_use]
    pub fn kind(&self) -> CommandKind {
        match self.action {
            CommandAction::SetState(_) => CommandKind::SetState,
            CommandAction::FollowPath(_) => CommandKind::FollowPath,
            CommandAction::PlayDefaultClip(_) => CommandKind::PlayDefaultClip,
        }
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn expiration(&self) -> Option<f64> {
        self.expiration
    }

    #[inline]
    #[must_use]
    pub fn action(&self) -> &CommandAction {
        &self.action
    }

    /// Duration in ms, or `None` once the expiration has been cleared.
    #[must_use]
    pub fn duration(&self) -> Option<f64> {
        self.expiration.map(|e| e - self.start)
    }

    /// `(now - start) / duration`, unclamped.
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        match self.duration() {
            Some(d) if d > 0.0 => (now - self.start) / d,
            _ => 1.0,
        }
    }

    /// Evaluates the command at `now`, which must precede its expiration.
    pub(crate) fn step(&self, now: f64) -> CommandStep {
        let elapsed = now - self.start;
        let progress = self.progress(now);

        match &self.action {
            CommandAction::SetState(params) => {
                let mut state = TargetState::new();

                if let Some(rate) = &params.rotation {
                    state.rotation = Some(to_degrees(rate.at(elapsed)));
                }
                if let Some(rate) = &params.scale {
                    state.scale = Some(rate.at(elapsed));
                }
                if let Some((from, to)) = params.quaternion {
                    let (axis, angle) = from.slerp(to, progress).to_axis_angle();
                    state.quaternion = Some((axis, angle));
                }
                if let Some(curve) = &params.path {
                    state.world_coordinates = Some(curve.point(progress));
                }

                CommandStep::Apply(state)
            }
            CommandAction::FollowPath(params) => CommandStep::Apply(params.sample(progress)),
            CommandAction::PlayDefaultClip(params) => CommandStep::AdvanceClip {
                start: self.start,
                speed: params.speed,
            },
        }
    }
}

impl fmt::Debug for AnimationCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationCommand")
            .field("kind", &self.kind())
            .field("start", &self.start)
            .field("expiration", &self.expiration)
            .field("has_callback", &self.on_complete.is_some())
            .finish_non_exhaustive()
    }
}
