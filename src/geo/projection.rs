//! Spherical Mercator projection between geographic and world coordinates.
//!
//! World space is the flat Cartesian space every object transform lives in.
//! Horizontal axes come from the Mercator forward projection scaled to
//! [`WORLD_SIZE`]; the vertical axis is altitude in meters scaled by
//! [`projected_units_per_meter`] so that heights stay metrically consistent
//! with the latitude-dependent horizontal stretch.
//!
//! The x axis is mirrored (`x = -λ·R·k`) to match the renderer's world group
//! orientation, and the inverse applies the same mirror.

use std::f64::consts::{FRAC_PI_4, PI};

use glam::DVec3;

/// Side length of the projected world square, in world units.
pub const WORLD_SIZE: f64 = 1_024_000.0;

/// Equatorial earth radius used by spherical Mercator, in meters.
pub const MERCATOR_A: f64 = 6_378_137.0;

/// Earth circumference used for the units-per-meter factor, in meters.
pub const EARTH_CIRCUMFERENCE: f64 = 40_075_000.0;

pub const DEG2RAD: f64 = PI / 180.0;
pub const RAD2DEG: f64 = 180.0 / PI;

/// World units per projected Mercator meter.
pub const PROJECTION_WORLD_SIZE: f64 = WORLD_SIZE / (MERCATOR_A * DEG2RAD * 360.0);

/// Projects `(lng, lat, alt)` into world space.
///
/// Altitude is in meters; a zero altitude maps to `z = 0` without touching the
/// units-per-meter factor, so the poles only blow up the `y` term.
#[must_use]
pub fn project_to_world(coords: DVec3) -> DVec3 {
    let x = -MERCATOR_A * DEG2RAD * coords.x * PROJECTION_WORLD_SIZE;
    let y = -MERCATOR_A * (FRAC_PI_4 + 0.5 * DEG2RAD * coords.y).tan().ln() * PROJECTION_WORLD_SIZE;

    let z = if coords.z == 0.0 {
        0.0
    } else {
        coords.z * projected_units_per_meter(coords.y)
    };

    DVec3::new(x, y, z)
}

/// Projects a longitude/latitude pair with an optional altitude.
#[must_use]
pub fn project_lnglat(lng: f64, lat: f64, altitude: Option<f64>) -> DVec3 {
    project_to_world(DVec3::new(lng, lat, altitude.unwrap_or(0.0)))
}

/// Inverse of [`project_to_world`]: returns `(lng, lat, alt)`.
#[must_use]
pub fn unproject_from_world(world: DVec3) -> DVec3 {
    let lng = -world.x / (MERCATOR_A * DEG2RAD * PROJECTION_WORLD_SIZE);
    let lat = 2.0 * ((world.y / (PROJECTION_WORLD_SIZE * -MERCATOR_A)).exp().atan() - FRAC_PI_4)
        / DEG2RAD;
    let altitude = world.z / projected_units_per_meter(lat);

    DVec3::new(lng, lat, altitude)
}

/// World units per meter at the given latitude.
///
/// `|WORLD_SIZE / cos(lat) / EARTH_CIRCUMFERENCE|`
#[inline]
#[must_use]
pub fn projected_units_per_meter(latitude: f64) -> f64 {
    (WORLD_SIZE / (DEG2RAD * latitude).cos() / EARTH_CIRCUMFERENCE).abs()
}

/// Projects every coordinate of a path.
#[must_use]
pub fn lnglats_to_world(coords: &[DVec3]) -> Vec<DVec3> {
    coords.iter().copied().map(project_to_world).collect()
}

// ============================================================================
// Degree / radian helpers
// ============================================================================

/// Converts an optional-component triple from degrees to radians.
///
/// Missing components are treated as zero.
#[must_use]
pub fn radify(degrees: [Option<f64>; 3]) -> DVec3 {
    DVec3::from_array(degrees.map(|c| c.unwrap_or(0.0) * DEG2RAD))
}

/// Converts an optional-component triple from radians to degrees.
///
/// Missing components are treated as zero.
#[must_use]
pub fn degreeify(radians: [Option<f64>; 3]) -> DVec3 {
    DVec3::from_array(radians.map(|c| c.unwrap_or(0.0) * RAD2DEG))
}

/// Elementwise degrees → radians.
#[inline]
#[must_use]
pub fn to_radians(degrees: DVec3) -> DVec3 {
    degrees * DEG2RAD
}

/// Elementwise radians → degrees.
#[inline]
#[must_use]
pub fn to_degrees(radians: DVec3) -> DVec3 {
    radians * RAD2DEG
}
