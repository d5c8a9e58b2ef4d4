use glam::{DQuat, DVec3, DVec4};

/// Values a keyframe track can interpolate.
pub trait Interpolatable: Copy + Clone + Sized {
    fn interpolate_linear(start: Self, end: Self, t: f64) -> Self;

    fn interpolate_cubic(
        v0: Self,
        out_tangent0: Self,
        in_tangent1: Self,
        v1: Self,
        t: f64,
        dt: f64,
    ) -> Self;
}

/// Hermite basis `(s0, s1, s2, s3)` for `t`.
#[inline]
fn hermite_basis(t: f64) -> (f64, f64, f64, f64) {
    let t2 = t * t;
    let t3 = t2 * t;

    let s2 = -2.0 * t3 + 3.0 * t2;
    let s3 = t3 - t2;
    let s0 = 1.0 - s2;
    let s1 = s3 - t2 + t;

    (s0, s1, s2, s3)
}

impl Interpolatable for f64 {
    fn interpolate_linear(start: Self, end: Self, t: f64) -> Self {
        start + (end - start) * t
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f64, dt: f64) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        s0 * v0 + s1 * out_tangent0 * dt + s2 * v1 + s3 * in_tangent1 * dt
    }
}

impl Interpolatable for DVec3 {
    fn interpolate_linear(start: Self, end: Self, t: f64) -> Self {
        start.lerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f64, dt: f64) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);
        v0 * s0 + out_tangent0 * dt * s1 + v1 * s2 + in_tangent1 * dt * s3
    }
}

impl Interpolatable for DQuat {
    fn interpolate_linear(start: Self, end: Self, t: f64) -> Self {
        start.slerp(end, t)
    }

    fn interpolate_cubic(v0: Self, out_tangent0: Self, in_tangent1: Self, v1: Self, t: f64, dt: f64) -> Self {
        let (s0, s1, s2, s3) = hermite_basis(t);

        let result = DVec4::from(v0) * s0
            + DVec4::from(out_tangent0) * dt * s1
            + DVec4::from(v1) * s2
            + DVec4::from(in_tangent1) * dt * s3;

        DQuat::from_vec4(result).normalize()
    }
}
