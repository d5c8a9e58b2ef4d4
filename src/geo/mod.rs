//! Geographic math
//!
//! - [`projection`]: spherical Mercator forward/inverse projection and the
//!   per-latitude units-per-meter factor
//! - [`curve`]: centripetal Catmull-Rom curves used for animated moves and paths

pub mod curve;
pub mod projection;

pub use curve::Curve;
pub use projection::{
    lnglats_to_world, project_lnglat, project_to_world, projected_units_per_meter,
    unproject_from_world, EARTH_CIRCUMFERENCE, MERCATOR_A, WORLD_SIZE,
};
