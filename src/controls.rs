//! Keyboard orbit controls with damping

use crossterm::event::KeyCode;
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

/// Keep the camera off the poles so "up" stays defined
const POLAR_MARGIN: f32 = 0.05;
const ROTATE_IMPULSE: f32 = 0.08;
const ZOOM_FACTOR: f32 = 1.15;

/// Orbits the camera around the origin. Panning is not supported.
#[derive(Clone, Debug)]
pub struct OrbitControls {
    /// Angle around the Y axis, 0 = looking down -Z
    pub azimuth: f32,
    /// Angle from the +Y axis
    pub polar: f32,
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Fraction of pending motion applied each update
    pub damping: f32,
    azimuth_velocity: f32,
    polar_velocity: f32,
    target_distance: f32,
    initial_distance: f32,
}

impl OrbitControls {
    pub fn new(distance: f32, min_distance: f32, max_distance: f32) -> Self {
        let distance = distance.clamp(min_distance, max_distance);
        Self {
            azimuth: 0.0,
            polar: FRAC_PI_2,
            distance,
            min_distance,
            max_distance,
            damping: 0.05,
            azimuth_velocity: 0.0,
            polar_velocity: 0.0,
            target_distance: distance,
            initial_distance: distance,
        }
    }

    /// Camera position on the orbit sphere
    pub fn position(&self) -> Vec3 {
        Vec3::new(
            self.distance * self.polar.sin() * self.azimuth.sin(),
            self.distance * self.polar.cos(),
            self.distance * self.polar.sin() * self.azimuth.cos(),
        )
    }

    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.azimuth_velocity += d_azimuth;
        self.polar_velocity += d_polar;
    }

    /// Scale the target distance; values above 1 move the camera away
    pub fn zoom(&mut self, factor: f32) {
        self.target_distance = (self.target_distance * factor).clamp(self.min_distance, self.max_distance);
    }

    pub fn reset(&mut self) {
        self.azimuth = 0.0;
        self.polar = FRAC_PI_2;
        self.azimuth_velocity = 0.0;
        self.polar_velocity = 0.0;
        self.target_distance = self.initial_distance;
    }

    /// Handle an orbit key. Returns true if the key was used.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left | KeyCode::Char('h') => self.rotate(-ROTATE_IMPULSE, 0.0),
            KeyCode::Right | KeyCode::Char('l') => self.rotate(ROTATE_IMPULSE, 0.0),
            KeyCode::Up | KeyCode::Char('k') => self.rotate(0.0, -ROTATE_IMPULSE),
            KeyCode::Down | KeyCode::Char('j') => self.rotate(0.0, ROTATE_IMPULSE),
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(1.0 / ZOOM_FACTOR),
            KeyCode::Char('-') | KeyCode::Char('_') => self.zoom(ZOOM_FACTOR),
            KeyCode::Char('0') => self.reset(),
            _ => return false,
        }
        true
    }

    /// Apply one step of damped motion
    pub fn update(&mut self) {
        let da = self.azimuth_velocity * self.damping;
        let dp = self.polar_velocity * self.damping;
        self.azimuth_velocity -= da;
        self.polar_velocity -= dp;

        self.azimuth = (self.azimuth + da).rem_euclid(std::f32::consts::TAU);
        self.polar = (self.polar + dp).clamp(POLAR_MARGIN, std::f32::consts::PI - POLAR_MARGIN);
        self.distance += (self.target_distance - self.distance) * self.damping;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);
    }
}
