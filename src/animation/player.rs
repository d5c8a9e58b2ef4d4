//! Skeletal playback adapter
//!
//! Bridges a model's named clips into the scheduler. Every clip gets one
//! [`AnimationAction`] up front, all of them started, and the active clip is
//! selected purely through weights (1 for the active clip, 0 for the rest).
//! Switching clips therefore never re-creates or restarts actions.

use std::sync::Arc;

use crate::animation::action::AnimationAction;
use crate::animation::binding::Binder;
use crate::animation::clip::AnimationClip;
use crate::animation::mixer::AnimationMixer;
use crate::scene::Model;

#[derive(Debug, Clone)]
pub struct ClipPlayer {
    mixer: AnimationMixer,
    active: usize,
    speed: f64,
}

impl ClipPlayer {
    /// Builds one action per clip, bound against `model`.
    ///
    /// Returns `None` when `clips` is empty. A `default_clip` past the end of
    /// `clips` is logged and replaced by clip 0.
    #[must_use]
    pub fn new(model: &Model, clips: Vec<Arc<AnimationClip>>, default_clip: usize) -> Option<Self> {
        if clips.is_empty() {
            return None;
        }

        let active = if default_clip < clips.len() {
            default_clip
        } else {
            log::warn!(
                "Model '{}': default clip index {default_clip} out of range ({} clips), using 0",
                model.name,
                clips.len()
            );
            0
        };

        let mut mixer = AnimationMixer::new();
        for (i, clip) in clips.into_iter().enumerate() {
            let mut action = AnimationAction::new(clip);
            action.bindings = Binder::bind(model, action.clip());
            action.weight = if i == active { 1.0 } else { 0.0 };
            action.play();
            mixer.add_action(action);
        }

        Some(Self {
            mixer,
            active,
            speed: 1.0,
        })
    }

    #[inline]
    #[must_use]
    pub fn active_clip(&self) -> usize {
        self.active
    }

    #[inline]
    #[must_use]
    pub fn clip_count(&self) -> usize {
        self.mixer.actions().len()
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        self.mixer.actions()
    }

    /// Finds a clip index by name.
    #[must_use]
    pub fn clip_index(&self, name: &str) -> Option<usize> {
        self.mixer
            .actions()
            .iter()
            .position(|a| a.clip().name == name)
    }

    /// Makes `index` the only clip with influence.
    ///
    /// Out-of-range indices are logged and leave the current weighting alone.
    /// Returns whether the switch happened.
    pub fn set_active_clip(&mut self, index: usize) -> bool {
        let count = self.clip_count();
        if index >= count {
            log::warn!("Clip index {index} out of range ({count} clips), keeping clip {}", self.active);
            return false;
        }

        for (i, action) in self.mixer.actions_mut().iter_mut().enumerate() {
            action.weight = if i == index { 1.0 } else { 0.0 };
        }
        self.active = index;
        true
    }

    /// Sets the playback rate of every action.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed;
        for action in self.mixer.actions_mut() {
            action.time_scale = speed;
        }
    }

    pub fn pause_all(&mut self) {
        for action in self.mixer.actions_mut() {
            action.paused = true;
        }
    }

    pub fn resume_all(&mut self) {
        for action in self.mixer.actions_mut() {
            action.paused = false;
        }
    }

    /// Starts every action; running actions keep their time.
    pub fn activate_all(&mut self) {
        for action in self.mixer.actions_mut() {
            action.play();
        }
    }

    /// Stops and rewinds every action.
    pub fn deactivate_all(&mut self) {
        for action in self.mixer.actions_mut() {
            action.stop();
        }
    }

    /// Advances playback by `dt` seconds and writes the result into `model`.
    pub fn update(&mut self, dt: f64, model: &mut Model) {
        self.mixer.update(dt, model);
    }
}
