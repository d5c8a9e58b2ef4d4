#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Animation scheduling for 3D objects placed on a web map.
//!
//! Objects are enrolled into an [`AnimationScheduler`], receive declarative
//! commands ("reach this state over 800 ms", "follow this path", "play the
//! walk clip"), and are advanced once per host frame by
//! [`AnimationScheduler::tick`]. All transforms live in Mercator world space
//! produced by [`geo::project_to_world`].

pub mod animation;
pub mod errors;
pub mod geo;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{
    AnimationClip, AnimationScheduler, ClipOptions, FollowPathOptions, ObjectEvent, ObjectHandle,
    SchedulerState, TargetState,
};
pub use errors::{GeoMotionError, Result};
pub use geo::{project_to_world, projected_units_per_meter, unproject_from_world, Curve};
pub use scene::{Model, Node, Transform, Units};
pub use settings::SchedulerSettings;
pub use utils::{Clock, FrameHost, FrameRequests, FrameToken, ManualClock, RepaintFlag, SystemClock};
