//! Flight-path arcs between points on the globe

use glam::Vec3;
use rand::Rng;

/// How far the control point is lifted off the surface, per unit of chord length
pub const LIFT_FACTOR: f32 = 0.3;

/// Number of segments each arc is sampled into
pub const ARC_SEGMENTS: usize = 50;

/// Quadratic Bézier curve through three control points
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadraticBezier {
    pub start: Vec3,
    pub control: Vec3,
    pub end: Vec3,
}

impl QuadraticBezier {
    /// Evaluate the curve at `t` in [0, 1]
    pub fn point_at(&self, t: f32) -> Vec3 {
        let mt = 1.0 - t;
        self.start * (mt * mt) + self.control * (2.0 * mt * t) + self.end * (t * t)
    }
}

/// An arc drawn between two surface points
#[derive(Clone, Debug)]
pub struct Arc {
    pub start: Vec3,
    pub end: Vec3,
    pub control: Vec3,
    pub points: Vec<Vec3>,
}

impl Arc {
    /// Number of sampled points, the full draw range of the arc
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Build the lifted curve between two points on a sphere of `radius`.
///
/// Uses chord length, not surface distance, to decide the lift.
pub fn lifted_curve(start: Vec3, end: Vec3, radius: f32) -> QuadraticBezier {
    let distance = start.distance(end);
    let control = (start + end).normalize_or_zero() * (radius + distance * LIFT_FACTOR);
    QuadraticBezier { start, control, end }
}

/// Build an arc and sample it into `segments + 1` points
pub fn build_arc(start: Vec3, end: Vec3, radius: f32, segments: usize) -> Arc {
    let curve = lifted_curve(start, end, radius);
    Arc {
        start,
        end,
        control: curve.control,
        points: sample(&curve, segments),
    }
}

/// Evaluate `curve` at `t = i / count` for every `i` in `0..=count`
pub fn sample(curve: &QuadraticBezier, count: usize) -> Vec<Vec3> {
    if count == 0 {
        return vec![curve.start];
    }

    (0..=count)
        .map(|i| {
            // Pin the endpoints exactly instead of trusting float rounding at t = 1
            match i {
                0 => curve.start,
                i if i == count => curve.end,
                i => curve.point_at(i as f32 / count as f32),
            }
        })
        .collect()
}

/// Pick two distinct indices below `len`.
///
/// Returns `None` when fewer than two locations are available.
pub fn pick_endpoints<R: Rng + ?Sized>(rng: &mut R, len: usize) -> Option<(usize, usize)> {
    if len < 2 {
        return None;
    }

    let start = rng.gen_range(0..len);
    let mut end = rng.gen_range(0..len);
    while end == start {
        end = rng.gen_range(0..len);
    }
    Some((start, end))
}

/// Build `count` arcs between randomly chosen distinct locations
pub fn build_arcs<R: Rng + ?Sized>(
    rng: &mut R,
    locations: &[Vec3],
    count: usize,
    radius: f32,
) -> Vec<Arc> {
    let mut arcs = Vec::with_capacity(count);
    for _ in 0..count {
        let Some((a, b)) = pick_endpoints(rng, locations.len()) else {
            break;
        };
        arcs.push(build_arc(locations[a], locations[b], radius, ARC_SEGMENTS));
    }
    arcs
}
