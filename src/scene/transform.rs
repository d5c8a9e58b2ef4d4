use glam::{DAffine3, DMat4, DQuat, DVec3, EulerRot};

/// Transform component
///
/// Position, rotation and scale (TRS) of a model or one of its nodes, with a
/// cached local/world matrix pair and shadow-state dirty checking.
/// All values are in world units (`f64`), the same space the projection math
/// produces.
#[derive(Debug, Clone)]
pub struct Transform {
    // === Public TRS ===
    pub position: DVec3,
    pub rotation: DQuat,
    pub scale: DVec3,

    // === Matrix cache ===
    pub(crate) local_matrix: DAffine3,
    pub(crate) world_matrix: DAffine3,

    // === Shadow state ===
    last_position: DVec3,
    last_rotation: DQuat,
    last_scale: DVec3,
    force_update: bool,
}

impl Transform {
    #[must_use]
    pub fn new() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,

            local_matrix: DAffine3::IDENTITY,
            world_matrix: DAffine3::IDENTITY,

            last_position: DVec3::ZERO,
            last_rotation: DQuat::IDENTITY,
            last_scale: DVec3::ONE,
            force_update: true,
        }
    }

    #[must_use]
    pub fn from_trs(position: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            ..Self::new()
        }
    }

    // ========================================================================
    // Dirty-checked matrix update
    // ========================================================================

    /// Recomputes the local matrix if any TRS component changed.
    ///
    /// Returns whether the matrix was rebuilt.
    pub fn update_local_matrix(&mut self) -> bool {
        let changed = self.position != self.last_position
            || self.rotation != self.last_rotation
            || self.scale != self.last_scale
            || self.force_update;

        if changed {
            self.local_matrix =
                DAffine3::from_scale_rotation_translation(self.scale, self.rotation, self.position);

            self.last_position = self.position;
            self.last_rotation = self.rotation;
            self.last_scale = self.scale;
            self.force_update = false;
        }

        changed
    }

    // ========================================================================
    // Getters & Helpers
    // ========================================================================

    /// Sets the rotation from XYZ Euler angles in radians.
    pub fn set_rotation_euler(&mut self, euler: DVec3) {
        self.rotation = DQuat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }

    /// Current rotation as XYZ Euler angles in radians.
    #[must_use]
    pub fn rotation_euler(&self) -> DVec3 {
        let (x, y, z) = self.rotation.to_euler(EulerRot::XYZ);
        DVec3::new(x, y, z)
    }

    /// Sets the rotation from an axis and an angle in radians.
    ///
    /// The axis is used as given; a zero axis yields a non-finite rotation.
    pub fn set_rotation_axis_angle(&mut self, axis: DVec3, angle: f64) {
        self.rotation = DQuat::from_axis_angle(axis, angle);
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> &DAffine3 {
        &self.local_matrix
    }

    #[inline]
    #[must_use]
    pub fn world_matrix(&self) -> &DAffine3 {
        &self.world_matrix
    }

    /// World matrix as `DMat4`, the layout renderers upload.
    #[inline]
    #[must_use]
    pub fn world_matrix_as_mat4(&self) -> DMat4 {
        DMat4::from(self.world_matrix)
    }

    pub fn set_world_matrix(&mut self, mat: DAffine3) {
        self.world_matrix = mat;
    }

    /// Forces the next [`update_local_matrix`](Self::update_local_matrix) to rebuild.
    pub fn mark_dirty(&mut self) {
        self.force_update = true;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
