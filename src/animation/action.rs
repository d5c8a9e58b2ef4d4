use std::sync::Arc;

use crate::animation::{
    binding::PropertyBinding,
    clip::{AnimationClip, TrackData},
    tracks::KeyframeCursor,
};
use glam::{DQuat, DVec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

impl LoopMode {
    /// Folds an unbounded playback time into `[0, duration]`.
    ///
    /// Returns the folded time and whether a non-repeating clip hit an end.
    #[must_use]
    pub fn wrap(self, time: f64, duration: f64) -> (f64, bool) {
        match self {
            Self::Once if time >= duration => (duration, true),
            Self::Once if time < 0.0 => (0.0, true),
            Self::Once => (time, false),
            Self::Loop => (time.rem_euclid(duration), false),
            Self::PingPong => {
                let t = time.rem_euclid(duration * 2.0);
                if t > duration {
                    (duration * 2.0 - t, false)
                } else {
                    (t, false)
                }
            }
        }
    }
}

/// Playback state of one clip on one model.
///
/// `running` is the play/stop switch (stopping rewinds), `paused` freezes
/// time without rewinding, and `weight` is the clip's influence when the
/// mixer writes node transforms.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f64,
    pub time_scale: f64,
    pub weight: f64,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub running: bool,

    pub bindings: Vec<PropertyBinding>,

    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            running: false,
            bindings: Vec::new(),
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Starts the action. Already running actions keep their time.
    pub fn play(&mut self) {
        self.running = true;
    }

    /// Stops the action and rewinds it.
    pub fn stop(&mut self) {
        self.running = false;
        self.time = 0.0;
        for cursor in &mut self.track_cursors {
            cursor.last_index = 0;
        }
    }

    /// Whether this action currently contributes to node transforms.
    #[must_use]
    pub fn is_effective(&self) -> bool {
        self.running && !self.paused && self.weight > 0.0
    }

    /// Advances time by `dt` seconds scaled by `time_scale`.
    ///
    /// [`LoopMode::Once`] pauses the action when it runs off either end.
    pub fn update(&mut self, dt: f64) {
        if self.paused || !self.running || self.clip.duration <= 0.0 {
            return;
        }

        let (time, reached_end) = self
            .loop_mode
            .wrap(self.time + dt * self.time_scale, self.clip.duration);
        self.time = time;
        if reached_end {
            self.paused = true;
        }
    }

    /// Samples track `track_index` at the current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        match &track.data {
            TrackData::Vector3(t) => t.sample_with_cursor(self.time, cursor).map(TrackValue::Vector3),
            TrackData::Quaternion(t) => {
                t.sample_with_cursor(self.time, cursor).map(TrackValue::Quaternion)
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum TrackValue {
    Vector3(DVec3),
    Quaternion(DQuat),
}
