use glam::DVec3;
use smallvec::SmallVec;

use crate::animation::command::AnimationCommand;
use crate::animation::player::ClipPlayer;
use crate::geo::projection::{projected_units_per_meter, unproject_from_world};
use crate::scene::{Model, Transform, Units};

/// Per-object queue storage; most objects hold a handful of commands.
pub(crate) type CommandQueue = SmallVec<[AnimationCommand; 4]>;

/// An enrolled object: the model plus everything the scheduler tracks for it.
///
/// Only the scheduler creates these, so an object is always fully enrolled:
/// it has a queue (possibly empty), its tracked coordinates and its clip
/// context if the loader supplied clips.
#[derive(Debug)]
pub struct AnimatedObject {
    pub(crate) model: Model,
    /// `(lng, lat, alt)` matching `model.transform.position`.
    pub(crate) coordinates: DVec3,
    /// Scale as requested by callers, before unit conversion.
    pub(crate) base_scale: DVec3,
    pub(crate) queue: CommandQueue,
    pub(crate) clips: Option<ClipPlayer>,
    pub(crate) playing: bool,
    /// Timestamp of the last clip advance, for per-object deltas.
    pub(crate) last_clip_tick: Option<f64>,
}

impl AnimatedObject {
    pub(crate) fn new(model: Model, clips: Option<ClipPlayer>) -> Self {
        let coordinates = unproject_from_world(model.transform.position);
        let base_scale = model.transform.scale;

        let mut object = Self {
            model,
            coordinates,
            base_scale,
            queue: CommandQueue::new(),
            clips,
            playing: false,
            last_clip_tick: None,
        };
        object.refresh_scale();
        object.model.update_world_matrices();
        object
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> &Model {
        &self.model
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.model.transform
    }

    #[inline]
    #[must_use]
    pub fn coordinates(&self) -> DVec3 {
        self.coordinates
    }

    #[inline]
    #[must_use]
    pub fn base_scale(&self) -> DVec3 {
        self.base_scale
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    #[inline]
    #[must_use]
    pub fn clips(&self) -> Option<&ClipPlayer> {
        self.clips.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Queued commands, oldest first.
    pub fn commands(&self) -> impl Iterator<Item = &AnimationCommand> {
        self.queue.iter()
    }

    /// Re-derives the live scale from `base_scale` and the model's units.
    pub(crate) fn refresh_scale(&mut self) {
        self.model.transform.scale = match self.model.units {
            Units::Scene => self.base_scale,
            Units::Meters => self.base_scale * projected_units_per_meter(self.coordinates.y),
        };
    }
}
