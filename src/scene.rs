//! Ray-cast globe scene: camera, lights, material and the frame they render into

use crate::arc::Arc;
use crate::geo::texture_uv;
use crate::texture::{Texture, TextureEvent};
use crate::timeline::{visible_points, ArcAnimation};
use glam::{Quat, Vec3};

pub const GLOBE_RADIUS: f32 = 5.0;

/// Halo shell radius relative to the globe
const ATMOSPHERE_SCALE: f32 = 1.05;
const ATMOSPHERE_TINT: Vec3 = Vec3::new(0.5, 0.7, 1.0);

/// Tolerance when deciding whether something sits behind the globe
const OCCLUSION_EPSILON: f32 = 1e-3;

/// Color from a 0xRRGGBB literal, channels in [0, 1]
macro_rules! hex {
    ($rgb:expr) => {
        Vec3::new(
            (($rgb >> 16) & 0xff) as f32 / 255.0,
            (($rgb >> 8) & 0xff) as f32 / 255.0,
            ($rgb & 0xff) as f32 / 255.0,
        )
    };
}

pub const LINE_COLOR: Vec3 = hex!(0x4488ff);
pub const POINT_COLOR: Vec3 = hex!(0x000000);
/// Flat fill when the texture cannot be loaded
pub const FALLBACK_COLOR: Vec3 = hex!(0x5599dd);
/// Flat fill while the texture is still on its way
pub const PENDING_COLOR: Vec3 = hex!(0xd0e0f0);

/// Output surface size in pixels. A terminal cell is one pixel wide and two tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Supersamples per pixel along each axis, capped at 2
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, pixel_ratio: f32) -> Self {
        Self { width, height, pixel_ratio: pixel_ratio.clamp(1.0, 2.0) }
    }

    pub fn from_terminal(cols: u16, rows: u16, pixel_ratio: f32) -> Self {
        Self::new(cols as u32, rows as u32 * 2, pixel_ratio)
    }

    fn samples_per_axis(&self) -> u32 {
        self.pixel_ratio.round().max(1.0) as u32
    }
}

/// Perspective camera looking at the origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub fn new(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self { fov, aspect, near, far, position: Vec3::new(0.0, 0.0, 15.0) }
    }

    /// Match the aspect ratio to a new viewport. A zero height keeps the old ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (-self.position).normalize_or_zero();
        let mut right = forward.cross(Vec3::Y);
        if right.length_squared() < 1e-8 {
            right = Vec3::X;
        }
        let right = right.normalize();
        let up = right.cross(forward);
        (forward, right, up)
    }

    fn half_height(&self) -> f32 {
        (self.fov.to_radians() * 0.5).tan()
    }

    /// World-space ray direction through normalized device coordinates (y up)
    pub fn ray(&self, ndc_x: f32, ndc_y: f32) -> Vec3 {
        let (forward, right, up) = self.basis();
        let tan = self.half_height();
        (forward + right * (ndc_x * tan * self.aspect) + up * (ndc_y * tan)).normalize()
    }

    /// Project a world point to normalized device coordinates and view depth
    pub fn project(&self, point: Vec3) -> Option<(f32, f32, f32)> {
        let (forward, right, up) = self.basis();
        let v = point - self.position;
        let depth = v.dot(forward);
        if depth < self.near || depth > self.far {
            return None;
        }
        let tan = self.half_height();
        Some((v.dot(right) / (depth * tan * self.aspect), v.dot(up) / (depth * tan), depth))
    }
}

/// Ambient plus one directional light
#[derive(Clone, Copy, Debug)]
pub struct Lighting {
    pub ambient: f32,
    pub directional: f32,
    /// Direction towards the light
    pub direction: Vec3,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: 0.7,
            directional: 0.5,
            direction: Vec3::new(5.0, 5.0, 5.0).normalize(),
        }
    }
}

impl Lighting {
    pub fn shade(&self, albedo: Vec3, normal: Vec3) -> Vec3 {
        let diffuse = normal.dot(self.direction).max(0.0);
        (albedo * (self.ambient + self.directional * diffuse)).clamp(Vec3::ZERO, Vec3::ONE)
    }
}

/// Surface color of the globe, optionally modulated by a texture map
#[derive(Clone)]
pub struct Material {
    pub color: Vec3,
    pub map: Option<Texture>,
}

impl Material {
    pub fn flat(color: Vec3) -> Self {
        Self { color, map: None }
    }

    /// Swap in the fetched texture, or fall back to a flat fill
    pub fn apply(&mut self, event: TextureEvent) {
        match event {
            TextureEvent::Loaded(texture) => {
                self.color = Vec3::ONE;
                self.map = Some(texture);
            }
            TextureEvent::Failed(_) => {
                self.color = FALLBACK_COLOR;
                self.map = None;
            }
        }
    }

    pub fn albedo(&self, u: f32, v: f32) -> Vec3 {
        match &self.map {
            Some(map) => self.color * Vec3::from(map.sample(u, v)),
            None => self.color,
        }
    }
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

/// RGB framebuffer with per-pixel coverage
pub struct Frame {
    width: u32,
    height: u32,
    color: Vec<Vec3>,
    alpha: Vec<f32>,
}

impl Frame {
    pub fn new(width: u32, height: u32) -> Self {
        let len = pixel_count(width, height);
        Self { width, height, color: vec![Vec3::ZERO; len], alpha: vec![0.0; len] }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width || height != self.height {
            *self = Self::new(width, height);
        }
    }

    pub fn clear(&mut self) {
        self.color.fill(Vec3::ZERO);
        self.alpha.fill(0.0);
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Color and coverage at a pixel; `None` outside the frame
    pub fn get(&self, x: u32, y: u32) -> Option<(Vec3, f32)> {
        let i = self.index(x as i32, y as i32)?;
        Some((self.color[i], self.alpha[i]))
    }

    pub fn set(&mut self, x: i32, y: i32, color: Vec3, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.color[i] = color;
            self.alpha[i] = alpha;
        }
    }

    /// Alpha-blend `color` over the pixel
    pub fn blend(&mut self, x: i32, y: i32, color: Vec3, opacity: f32) {
        if let Some(i) = self.index(x, y) {
            self.color[i] = self.color[i].lerp(color, opacity);
            self.alpha[i] = self.alpha[i].max(opacity);
        }
    }

    /// Pixel as 8-bit RGB, or `None` when nothing covers it
    pub fn rgb8(&self, x: u32, y: u32) -> Option<(u8, u8, u8)> {
        let (c, a) = self.get(x, y)?;
        if a <= 0.0 {
            return None;
        }
        let c = c.clamp(Vec3::ZERO, Vec3::ONE) * 255.0;
        Some((c.x.round() as u8, c.y.round() as u8, c.z.round() as u8))
    }
}

/// Near and far hit distances of a unit-direction ray against a sphere at the origin
pub fn intersect_sphere(origin: Vec3, dir: Vec3, radius: f32) -> Option<(f32, f32)> {
    let b = origin.dot(dir);
    let c = origin.length_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let far = -b + sq;
    if far < 0.0 {
        return None;
    }
    Some((-b - sq, far))
}

/// Whether the globe hides `point` from `eye`
pub fn occluded(eye: Vec3, point: Vec3, radius: f32) -> bool {
    let to_point = point - eye;
    let dist = to_point.length();
    if dist <= f32::EPSILON {
        return false;
    }
    match intersect_sphere(eye, to_point / dist, radius) {
        Some((near, _)) => near > 0.0 && near < dist - OCCLUSION_EPSILON,
        None => false,
    }
}

/// Everything drawn each frame. Markers and arcs are stored in globe-local
/// space and spin with the globe.
pub struct Scene {
    pub radius: f32,
    pub rotation_y: f32,
    pub camera: PerspectiveCamera,
    pub lighting: Lighting,
    pub material: Material,
    pub markers: Vec<Vec3>,
    pub arcs: Vec<Arc>,
    pub atmosphere: bool,
}

impl Scene {
    pub fn new(radius: f32, aspect: f32, markers: Vec<Vec3>, arcs: Vec<Arc>) -> Self {
        Self {
            radius,
            rotation_y: 0.0,
            camera: PerspectiveCamera::new(45.0, aspect, 0.1, 100.0),
            lighting: Lighting::default(),
            material: Material::flat(PENDING_COLOR),
            markers,
            arcs,
            atmosphere: true,
        }
    }

    fn spin(&self) -> Quat {
        Quat::from_rotation_y(self.rotation_y)
    }

    /// Rasterize the globe, halo, markers and the visible part of every arc
    pub fn render(&self, viewport: &Viewport, states: &[ArcAnimation], frame: &mut Frame) {
        frame.resize(viewport.width, viewport.height);
        frame.clear();
        if viewport.width == 0 || viewport.height == 0 {
            return;
        }

        let spin = self.spin();
        let unspin = spin.inverse();
        let samples = viewport.samples_per_axis();
        let weight = 1.0 / (samples * samples) as f32;
        let (w, h) = (viewport.width as f32, viewport.height as f32);

        for y in 0..viewport.height {
            for x in 0..viewport.width {
                let mut color = Vec3::ZERO;
                let mut alpha = 0.0;
                for sy in 0..samples {
                    for sx in 0..samples {
                        let px = x as f32 + (sx as f32 + 0.5) / samples as f32;
                        let py = y as f32 + (sy as f32 + 0.5) / samples as f32;
                        let ndc_x = px / w * 2.0 - 1.0;
                        let ndc_y = 1.0 - py / h * 2.0;
                        let (c, a) = self.trace(self.camera.ray(ndc_x, ndc_y), unspin);
                        color += c * weight;
                        alpha += a * weight;
                    }
                }
                // colors stay premultiplied over the terminal's dark background
                if alpha > 0.0 {
                    frame.set(x as i32, y as i32, color, alpha.min(1.0));
                }
            }
        }

        for marker in &self.markers {
            if let Some((px, py)) = self.pixel_of(spin * *marker, viewport) {
                frame.set(px, py, POINT_COLOR, 1.0);
            }
        }

        for (arc, state) in self.arcs.iter().zip(states) {
            if !state.is_visible() {
                continue;
            }
            let world: Vec<Vec3> = visible_points(arc, state).iter().map(|p| spin * *p).collect();
            for pair in world.windows(2) {
                self.draw_segment(pair[0], pair[1], state.opacity, viewport, frame);
            }
        }
    }

    /// Color and coverage seen along one camera ray
    fn trace(&self, dir: Vec3, unspin: Quat) -> (Vec3, f32) {
        let eye = self.camera.position;
        if let Some((near, _)) = intersect_sphere(eye, dir, self.radius) {
            if near > 0.0 {
                let hit = eye + dir * near;
                let normal = hit / self.radius;
                let (u, v) = texture_uv(unspin * hit);
                let albedo = self.material.albedo(u, v);
                return (self.lighting.shade(albedo, normal), 1.0);
            }
        }

        if self.atmosphere {
            if let Some((_, far)) = intersect_sphere(eye, dir, self.radius * ATMOSPHERE_SCALE) {
                let normal = (eye + dir * far).normalize();
                let facing = normal.dot(-dir);
                let intensity = ((0.7 - facing).powi(2) * 0.4).min(1.0);
                if intensity > 0.0 {
                    return (ATMOSPHERE_TINT * intensity, intensity);
                }
            }
        }
        (Vec3::ZERO, 0.0)
    }

    fn pixel_of(&self, world: Vec3, viewport: &Viewport) -> Option<(i32, i32)> {
        if occluded(self.camera.position, world, self.radius) {
            return None;
        }
        let (nx, ny, _) = self.camera.project(world)?;
        let px = ((nx + 1.0) * 0.5 * viewport.width as f32).floor() as i32;
        let py = ((1.0 - ny) * 0.5 * viewport.height as f32).floor() as i32;
        Some((px, py))
    }

    fn draw_segment(&self, a: Vec3, b: Vec3, opacity: f32, viewport: &Viewport, frame: &mut Frame) {
        let (Some(pa), Some(pb)) = (self.screen_of(a, viewport), self.screen_of(b, viewport)) else {
            return;
        };

        // Bresenham, checking occlusion per pixel along the interpolated segment
        let (x0, y0) = (pa.0.floor() as i32, pa.1.floor() as i32);
        let (x1, y1) = (pb.0.floor() as i32, pb.1.floor() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let steps = dx.max(-dy).max(1) as f32;
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);
        let mut step = 0.0;

        loop {
            let world = a.lerp(b, (step / steps).min(1.0));
            if !occluded(self.camera.position, world, self.radius) {
                frame.blend(x, y, LINE_COLOR, opacity);
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
            step += 1.0;
        }
    }

    fn screen_of(&self, world: Vec3, viewport: &Viewport) -> Option<(f32, f32)> {
        let (nx, ny, _) = self.camera.project(world)?;
        Some(((nx + 1.0) * 0.5 * viewport.width as f32, (1.0 - ny) * 0.5 * viewport.height as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arc::{build_arc, ARC_SEGMENTS};
    use crate::geo::{project, GeoPoint};
    use crate::texture::TextureError;
    use crate::timeline::Phase;

    fn scene(arcs: Vec<Arc>) -> Scene {
        Scene::new(GLOBE_RADIUS, 2.0, Vec::new(), arcs)
    }

    #[test]
    fn resize_sets_exact_aspect() {
        let mut cam = PerspectiveCamera::new(45.0, 1.0, 0.1, 100.0);
        cam.resize(123, 45);
        assert_eq!(cam.aspect, 123.0 / 45.0);
        cam.resize(640, 0);
        assert_eq!(cam.aspect, 123.0 / 45.0);
    }

    #[test]
    fn pixel_ratio_is_capped() {
        assert_eq!(Viewport::new(10, 10, 3.0).pixel_ratio, 2.0);
        assert_eq!(Viewport::new(10, 10, 0.5).pixel_ratio, 1.0);
        assert_eq!(Viewport::from_terminal(80, 24, 1.0).height, 48);
    }

    #[test]
    fn projection_and_rays_agree() {
        let cam = PerspectiveCamera::new(45.0, 1.6, 0.1, 100.0);
        let dir = cam.ray(0.3, -0.4);
        let (nx, ny, _) = cam.project(cam.position + dir * 10.0).unwrap();
        assert!((nx - 0.3).abs() < 1e-4);
        assert!((ny + 0.4).abs() < 1e-4);

        let (cx, cy, depth) = cam.project(Vec3::ZERO).unwrap();
        assert!(cx.abs() < 1e-6 && cy.abs() < 1e-6);
        assert!((depth - 15.0).abs() < 1e-5);
    }

    #[test]
    fn far_side_is_occluded() {
        let eye = Vec3::new(0.0, 0.0, 15.0);
        assert!(occluded(eye, Vec3::new(0.0, 0.0, -5.0), 5.0));
        assert!(!occluded(eye, Vec3::new(0.0, 0.0, 5.0), 5.0));
        assert!(!occluded(eye, Vec3::new(0.0, 9.0, 0.0), 5.0));
    }

    #[test]
    fn failed_texture_falls_back_to_flat_color() {
        let mut material = Material::flat(PENDING_COLOR);
        material.apply(TextureEvent::Failed(TextureError::Path("x".into())));
        assert_eq!(material.color, FALLBACK_COLOR);
        assert!(material.map.is_none());
        assert_eq!(material.albedo(0.3, 0.3), FALLBACK_COLOR);
    }

    #[test]
    fn globe_fills_center_and_leaves_corners_empty() {
        let s = scene(Vec::new());
        let viewport = Viewport::new(80, 40, 1.0);
        let mut frame = Frame::new(1, 1);
        s.render(&viewport, &[], &mut frame);

        assert_eq!(frame.width(), 80);
        let (_, center_alpha) = frame.get(40, 20).unwrap();
        assert_eq!(center_alpha, 1.0);
        assert!(frame.rgb8(0, 0).is_none());
    }

    #[test]
    fn revealed_arc_changes_pixels() {
        let a = project(GeoPoint::new(10.0, -100.0), GLOBE_RADIUS);
        let b = project(GeoPoint::new(-10.0, -80.0), GLOBE_RADIUS);
        let arc = build_arc(a, b, GLOBE_RADIUS, ARC_SEGMENTS);
        let s = scene(vec![arc]);
        let viewport = Viewport::new(80, 40, 1.0);

        let mut hidden = Frame::new(80, 40);
        s.render(&viewport, &[ArcAnimation::hidden(0.7)], &mut hidden);

        let drawn_state = ArcAnimation { phase: Phase::FullyDrawn, visible_count: ARC_SEGMENTS + 1, opacity: 0.7 };
        let mut drawn = Frame::new(80, 40);
        s.render(&viewport, &[drawn_state], &mut drawn);

        let changed = (0..40)
            .flat_map(|y| (0..80).map(move |x| (x, y)))
            .filter(|&(x, y)| hidden.get(x, y) != drawn.get(x, y))
            .count();
        assert!(changed > 5, "only {} pixels changed", changed);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn pixel_count_does_not_wrap() {
        assert_eq!(pixel_count(65_536, 65_536), 1 << 32);
        assert_eq!(pixel_count(65_535, 131_070), 8_589_672_450);

        let frame = Frame::new(3, 65_536);
        assert!(frame.get(2, 65_535).is_some());
        assert!(frame.get(3, 0).is_none());
    }

    #[test]
    fn blend_mixes_towards_color() {
        let mut frame = Frame::new(2, 1);
        frame.set(0, 0, Vec3::ZERO, 1.0);
        frame.blend(0, 0, Vec3::ONE, 0.5);
        let (c, a) = frame.get(0, 0).unwrap();
        assert!((c.x - 0.5).abs() < 1e-6);
        assert_eq!(a, 1.0);

        frame.blend(5, 5, Vec3::ONE, 1.0);
        assert!(frame.get(5, 5).is_none());
    }
}
