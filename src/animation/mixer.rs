use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binding::TargetPath;
use crate::scene::Model;

/// Advances a model's actions and writes their samples into its nodes.
///
/// Actions with weight below one blend from the node's current value toward
/// the sampled value, so a weight of zero leaves the node untouched.
#[derive(Debug, Clone, Default)]
pub struct AnimationMixer {
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_action(&mut self, action: AnimationAction) -> usize {
        self.actions.push(action);
        self.actions.len() - 1
    }

    #[inline]
    #[must_use]
    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    #[inline]
    pub fn actions_mut(&mut self) -> &mut [AnimationAction] {
        &mut self.actions
    }

    /// Advances all actions by `dt` seconds and applies them to `model`.
    pub fn update(&mut self, dt: f64, model: &mut Model) {
        for action in &mut self.actions {
            action.update(dt);
        }

        for action in &mut self.actions {
            if !action.is_effective() {
                continue;
            }

            let weight = action.weight.min(1.0);
            for i in 0..action.bindings.len() {
                let binding = action.bindings[i];
                let Some(value) = action.sample_track(binding.track_index) else {
                    continue;
                };
                let Some(node) = model.node_mut(binding.node_index) else {
                    continue;
                };
                let transform = &mut node.transform;

                match (value, binding.target) {
                    (TrackValue::Vector3(v), TargetPath::Translation) => {
                        transform.position = transform.position.lerp(v, weight);
                    }
                    (TrackValue::Vector3(v), TargetPath::Scale) => {
                        transform.scale = transform.scale.lerp(v, weight);
                    }
                    (TrackValue::Quaternion(q), TargetPath::Rotation) => {
                        transform.rotation = transform.rotation.slerp(q, weight);
                    }
                    _ => {
                        log::trace!(
                            "Skipping track {} with mismatched target {:?}",
                            binding.track_index,
                            binding.target
                        );
                    }
                }
            }
        }
    }
}
