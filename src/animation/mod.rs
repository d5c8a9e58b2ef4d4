//! Animation scheduling
//!
//! - [`AnimationScheduler`]: owns enrolled objects and advances their queues
//! - [`AnimationCommand`]: one queued directive (`SetState`, `FollowPath`,
//!   `PlayDefaultClip`)
//! - [`TargetState`]: partial target consumed by the transform applier
//! - [`ClipPlayer`]: skeletal playback over a model's named clips
//! - [`ObjectEvent`]: change, playing and completion notifications

pub mod action;
pub mod applier;
pub mod binding;
pub mod clip;
pub mod command;
pub mod events;
pub mod mixer;
pub mod object;
pub mod player;
pub mod scheduler;
pub mod state;
pub mod tracks;
pub mod values;

use slotmap::new_key_type;

new_key_type! {
    /// Identifies an enrolled object.
    pub struct ObjectHandle;
}

pub use action::{AnimationAction, LoopMode};
pub use binding::{Binder, PropertyBinding, TargetPath};
pub use clip::{AnimationClip, Track, TrackData, TrackMeta};
pub use command::{AnimationCommand, CommandKind, CompletionCallback};
pub use events::ObjectEvent;
pub use mixer::AnimationMixer;
pub use object::AnimatedObject;
pub use player::ClipPlayer;
pub use scheduler::{AnimationScheduler, ClipOptions, FollowPathOptions, SchedulerState};
pub use state::TargetState;
pub use tracks::{InterpolationMode, KeyframeTrack};
