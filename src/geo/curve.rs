//! Centripetal Catmull-Rom curves over world-space points.
//!
//! A [`Curve`] is built once from a point sequence and then only sampled.
//! Two parameterizations are exposed:
//!
//! - [`Curve::point`] / [`Curve::tangent`]: the raw spline parameter `t`,
//!   spread evenly over the segments.
//! - [`Curve::point_at`] / [`Curve::tangent_at`]: arc-length parameter `u`,
//!   so equal steps in `u` cover equal distances along the path.
//!
//! End segments use a reflected phantom control point, so a two-point curve
//! is a straight segment.

use glam::DVec3;

/// Default number of samples used to build the arc-length table.
pub const DEFAULT_ARC_LENGTH_DIVISIONS: usize = 200;

/// Default parameter step used for finite-difference tangents.
pub const DEFAULT_TANGENT_DELTA: f64 = 1e-4;

/// Distances below this are treated as coincident when computing knots.
const KNOT_EPSILON: f64 = 1e-4;

/// Cubic `c0 + c1·t + c2·t² + c3·t³` along one axis of one segment.
#[derive(Debug, Clone, Copy, Default)]
struct CubicPoly {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl CubicPoly {
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    /// Non-uniform Catmull-Rom segment between `x1` and `x2`.
    fn nonuniform_catmull_rom(
        x0: f64,
        x1: f64,
        x2: f64,
        x3: f64,
        dt0: f64,
        dt1: f64,
        dt2: f64,
    ) -> Self {
        let mut t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let mut t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        t1 *= dt1;
        t2 *= dt1;
        Self::hermite(x1, x2, t1, t2)
    }

    #[inline]
    fn calc(&self, t: f64) -> f64 {
        let t2 = t * t;
        let t3 = t2 * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t3
    }
}

/// An immutable centripetal Catmull-Rom curve.
#[derive(Debug, Clone)]
pub struct Curve {
    points: Vec<DVec3>,
    /// Cumulative arc lengths at `divisions + 1` evenly spaced `t` samples.
    arc_lengths: Vec<f64>,
    tangent_delta: f64,
}

impl Curve {
    /// Builds a curve with the default arc-length resolution.
    #[must_use]
    pub fn new(points: Vec<DVec3>) -> Self {
        Self::with_resolution(points, DEFAULT_ARC_LENGTH_DIVISIONS, DEFAULT_TANGENT_DELTA)
    }

    /// Builds a curve, precomputing `divisions` arc-length samples.
    ///
    /// An empty point list yields a curve that samples to the origin; callers
    /// are expected to reject empty paths before getting here.
    #[must_use]
    pub fn with_resolution(points: Vec<DVec3>, divisions: usize, tangent_delta: f64) -> Self {
        let mut curve = Self {
            points,
            arc_lengths: Vec::new(),
            tangent_delta,
        };
        curve.arc_lengths = curve.compute_lengths(divisions.max(1));
        curve
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[DVec3] {
        &self.points
    }

    /// Approximate total length of the curve.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.arc_lengths.last().copied().unwrap_or(0.0)
    }

    /// Point at raw spline parameter `t` in `[0, 1]`.
    #[must_use]
    pub fn point(&self, t: f64) -> DVec3 {
        let len = self.points.len();
        match len {
            0 => return DVec3::ZERO,
            1 => return self.points[0],
            _ => {}
        }

        let p = (len - 1) as f64 * t;
        let mut int_point = p.floor().max(0.0) as usize;
        let mut weight = p - int_point as f64;

        if int_point >= len - 1 {
            int_point = len - 2;
            weight = p - int_point as f64;
        }

        let p1 = self.points[int_point];
        let p2 = self.points[int_point + 1];

        let p0 = if int_point > 0 {
            self.points[int_point - 1]
        } else {
            // Reflect the second point through the first.
            (self.points[0] - self.points[1]) + self.points[0]
        };

        let p3 = if int_point + 2 < len {
            self.points[int_point + 2]
        } else {
            (self.points[len - 1] - self.points[len - 2]) + self.points[len - 1]
        };

        // Centripetal knots: sqrt of the chord length.
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        if dt1 < KNOT_EPSILON {
            dt1 = 1.0;
        }
        if dt0 < KNOT_EPSILON {
            dt0 = dt1;
        }
        if dt2 < KNOT_EPSILON {
            dt2 = dt1;
        }

        let px = CubicPoly::nonuniform_catmull_rom(p0.x, p1.x, p2.x, p3.x, dt0, dt1, dt2);
        let py = CubicPoly::nonuniform_catmull_rom(p0.y, p1.y, p2.y, p3.y, dt0, dt1, dt2);
        let pz = CubicPoly::nonuniform_catmull_rom(p0.z, p1.z, p2.z, p3.z, dt0, dt1, dt2);

        DVec3::new(px.calc(weight), py.calc(weight), pz.calc(weight))
    }

    /// Unit tangent at raw spline parameter `t`, by central difference.
    ///
    /// Degenerate curves (a single point) return a non-finite vector.
    #[must_use]
    pub fn tangent(&self, t: f64) -> DVec3 {
        let t1 = (t - self.tangent_delta).max(0.0);
        let t2 = (t + self.tangent_delta).min(1.0);
        (self.point(t2) - self.point(t1)).normalize()
    }

    /// Point at arc-length parameter `u` in `[0, 1]`.
    #[must_use]
    pub fn point_at(&self, u: f64) -> DVec3 {
        self.point(self.u_to_t(u))
    }

    /// Unit tangent at arc-length parameter `u` in `[0, 1]`.
    #[must_use]
    pub fn tangent_at(&self, u: f64) -> DVec3 {
        self.tangent(self.u_to_t(u))
    }

    /// Maps an arc-length fraction to the raw spline parameter.
    #[must_use]
    pub fn u_to_t(&self, u: f64) -> f64 {
        let lengths = &self.arc_lengths;
        let il = lengths.len();
        let total = self.length();
        if il < 2 || total <= 0.0 {
            return u;
        }

        let target = u * total;

        // First index whose cumulative length exceeds the target, minus one.
        let i = lengths.partition_point(|&l| l <= target).saturating_sub(1);

        if i >= il - 1 {
            return 1.0;
        }
        if lengths[i] == target {
            return i as f64 / (il - 1) as f64;
        }

        let before = lengths[i];
        let segment = lengths[i + 1] - before;
        let fraction = if segment > 0.0 {
            (target - before) / segment
        } else {
            0.0
        };

        (i as f64 + fraction) / (il - 1) as f64
    }

    fn compute_lengths(&self, divisions: usize) -> Vec<f64> {
        let mut lengths = Vec::with_capacity(divisions + 1);
        let mut last = self.point(0.0);
        let mut sum = 0.0;
        lengths.push(0.0);

        for d in 1..=divisions {
            let current = self.point(d as f64 / divisions as f64);
            sum += current.distance(last);
            lengths.push(sum);
            last = current;
        }

        lengths
    }
}
