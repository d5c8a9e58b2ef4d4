use rustc_hash::FxHashMap;

use crate::animation::clip::AnimationClip;
use crate::scene::Model;

/// The node property a track writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation, // transform.position
    Rotation,    // transform.rotation
    Scale,       // transform.scale
}

/// Maps track `track_index` of a clip to node `node_index` of a model.
#[derive(Debug, Clone, Copy)]
pub struct PropertyBinding {
    pub track_index: usize,
    pub node_index: usize,
    pub target: TargetPath,
}

/// Resolves a clip's tracks against a model's named nodes.
pub struct Binder;

impl Binder {
    /// Binds every track whose node name exists in `model`.
    ///
    /// Tracks naming unknown nodes are skipped with a warning.
    #[must_use]
    pub fn bind(model: &Model, clip: &AnimationClip) -> Vec<PropertyBinding> {
        let lookup: FxHashMap<&str, usize> = model
            .nodes()
            .iter()
            .enumerate()
            .rev()
            .map(|(i, n)| (n.name.as_str(), i))
            .collect();

        let mut bindings = Vec::with_capacity(clip.tracks.len());

        for (track_index, track) in clip.tracks.iter().enumerate() {
            if let Some(&node_index) = lookup.get(track.meta.node_name.as_str()) {
                bindings.push(PropertyBinding {
                    track_index,
                    node_index,
                    target: track.meta.target,
                });
            } else {
                log::warn!(
                    "Clip '{}': track {track_index} targets unknown node '{}'",
                    clip.name,
                    track.meta.node_name
                );
            }
        }

        bindings
    }
}
