//! Geographic coordinates and their placement on the globe

use glam::Vec3;
use std::f32::consts::{PI, TAU};

/// A latitude/longitude pair in degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    pub latitude: f32,
    pub longitude: f32,
}

impl GeoPoint {
    pub const fn new(latitude: f32, longitude: f32) -> Self {
        Self { latitude, longitude }
    }
}

/// Locations the arcs travel between
pub const LOCATIONS: [GeoPoint; 11] = [
    GeoPoint::new(34.05, -118.24),  // Los Angeles
    GeoPoint::new(40.71, -74.00),   // New York
    GeoPoint::new(48.85, 2.35),     // Paris
    GeoPoint::new(51.50, -0.12),    // London
    GeoPoint::new(-33.86, 151.20),  // Sydney
    GeoPoint::new(35.68, 139.69),   // Tokyo
    GeoPoint::new(-23.55, -46.63),  // Sao Paulo
    GeoPoint::new(19.43, -99.13),   // Mexico City
    GeoPoint::new(39.90, 116.40),   // Beijing
    GeoPoint::new(6.52, 3.37),      // Lagos
    GeoPoint::new(4.71, -74.07),    // Bogota
];

/// Place a geographic point on a sphere of the given radius.
///
/// Longitude is shifted by 180 degrees so that the result lines up with an
/// equirectangular texture whose left edge is the antimeridian. Inputs are
/// not range-checked.
pub fn project(point: GeoPoint, radius: f32) -> Vec3 {
    let phi = (90.0 - point.latitude).to_radians();
    let theta = (point.longitude + 180.0).to_radians();

    Vec3::new(
        -radius * phi.sin() * theta.cos(),
        radius * phi.cos(),
        radius * phi.sin() * theta.sin(),
    )
}

/// Project every location in order
pub fn project_all(points: &[GeoPoint], radius: f32) -> Vec<Vec3> {
    points.iter().map(|&p| project(p, radius)).collect()
}

/// Texture coordinates for a point in globe-local space.
///
/// Inverse of [`project`]: `u` runs west to east starting at the
/// antimeridian, `v` runs from the north pole (0) to the south pole (1).
pub fn texture_uv(local: Vec3) -> (f32, f32) {
    let len = local.length();
    if len <= f32::EPSILON {
        return (0.0, 0.0);
    }

    let u = local.z.atan2(-local.x).rem_euclid(TAU) / TAU;
    let v = (local.y / len).clamp(-1.0, 1.0).acos() / PI;
    (u, v)
}
