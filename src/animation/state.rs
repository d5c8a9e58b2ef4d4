use glam::DVec3;

/// A partial target state for an object.
///
/// Every field is optional; the transform applier handles whichever are
/// present in a fixed order (scale, then position-like fields, then
/// rotation-like fields).
///
/// ```rust,ignore
/// let target = TargetState::new()
///     .with_coords(DVec3::new(-73.97, 40.78, 120.0))
///     .with_rotation(DVec3::new(90.0, 0.0, 45.0))
///     .with_uniform_scale(2.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetState {
    /// Absolute scale. For [`Units::Meters`](crate::scene::Units) models this
    /// is in meters.
    pub scale: Option<DVec3>,
    /// Absolute geographic position `(lng, lat, alt)`.
    pub coords: Option<DVec3>,
    /// Geographic offset `(dlng, dlat, dalt)` from the current coordinates.
    pub translate: Option<DVec3>,
    /// Offset in world units from the current position.
    pub world_translate: Option<DVec3>,
    /// Absolute world-space position.
    pub world_coordinates: Option<DVec3>,
    /// XYZ Euler rotation in degrees.
    pub rotation: Option<DVec3>,
    /// Axis and angle (radians). Applied after `rotation`, so it wins.
    pub quaternion: Option<(DVec3, f64)>,
}

impl TargetState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = Some(scale);
        self
    }

    #[must_use]
    pub fn with_uniform_scale(self, scale: f64) -> Self {
        self.with_scale(DVec3::splat(scale))
    }

    #[must_use]
    pub fn with_coords(mut self, coords: DVec3) -> Self {
        self.coords = Some(coords);
        self
    }

    #[must_use]
    pub fn with_translate(mut self, delta: DVec3) -> Self {
        self.translate = Some(delta);
        self
    }

    #[must_use]
    pub fn with_world_translate(mut self, delta: DVec3) -> Self {
        self.world_translate = Some(delta);
        self
    }

    #[must_use]
    pub fn with_world_coordinates(mut self, position: DVec3) -> Self {
        self.world_coordinates = Some(position);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, degrees: DVec3) -> Self {
        self.rotation = Some(degrees);
        self
    }

    #[must_use]
    pub fn with_quaternion(mut self, axis: DVec3, angle: f64) -> Self {
        self.quaternion = Some((axis, angle));
        self
    }

    /// True when no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scale.is_none() && !self.moves() && !self.rotates()
    }

    /// True when any position-like field is set.
    #[must_use]
    pub fn moves(&self) -> bool {
        self.coords.is_some()
            || self.translate.is_some()
            || self.world_translate.is_some()
            || self.world_coordinates.is_some()
    }

    /// True when any rotation-like field is set.
    #[must_use]
    pub fn rotates(&self) -> bool {
        self.rotation.is_some() || self.quaternion.is_some()
    }
}
