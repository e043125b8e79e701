//! Rotating textured globe with staggered flight-path arcs

use crate::arc::build_arcs;
use crate::config::GlobeConfig;
use crate::controls::OrbitControls;
use crate::geo::{project_all, LOCATIONS};
use crate::help::render_help_overlay;
use crate::scene::{Frame, Scene, Viewport, FALLBACK_COLOR, GLOBE_RADIUS};
use crate::terminal::{rgb, Terminal};
use crate::texture::{self, TextureEvent, TextureLoader};
use crate::timeline::RevealAnimator;
use crossterm::event::{KeyCode, KeyModifiers};
use crossterm::style::Color;
use log::{debug, info, trace};
use rand::Rng;
use std::io;
use std::time::Instant;

const CAMERA_DISTANCE: f32 = 15.0;
const MIN_DISTANCE: f32 = 7.0;
const MAX_DISTANCE: f32 = 30.0;

/// Help text for the globe view
const HELP: &str = "\
GLOBE
─────────────────
←/h →/l  Orbit
↑/k ↓/j  Tilt
+/-      Zoom in/out
0        Reset view
space    Pause
?        Toggle help
q/Esc    Quit";

/// Runtime state for interactive controls
pub struct ViewState {
    pub paused: bool,
    pub show_help: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self { paused: false, show_help: false }
    }

    /// Handle keypress, returns true if should quit
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('?') => self.show_help = !self.show_help,
            _ => {}
        }
        false
    }
}

/// Everything the render loop owns: the scene, the arc timeline and the output frame
pub struct Globe {
    pub scene: Scene,
    pub animator: RevealAnimator,
    pub viewport: Viewport,
    frame: Frame,
    rotation_speed: f32,
    texture: Option<TextureLoader>,
}

impl Globe {
    /// Build the scene for a terminal of `cols` x `rows` cells. Starts the
    /// texture fetch in the background when a URL is configured.
    pub fn new<R: Rng + ?Sized>(config: &GlobeConfig, rng: &mut R, cols: u16, rows: u16) -> Self {
        let markers = project_all(&LOCATIONS, GLOBE_RADIUS);
        let arcs = build_arcs(rng, &markers, config.arc_count, GLOBE_RADIUS);
        let animator = RevealAnimator::for_arcs(config.timeline, &arcs);
        for (i, arc) in arcs.iter().enumerate() {
            trace!(
                "arc {}: {:?} -> {:?}, lift {:.2}",
                i,
                arc.start,
                arc.end,
                arc.control.length() - GLOBE_RADIUS
            );
        }
        debug!(
            "built {} arcs between {} locations, cycle {:.2}s",
            arcs.len(),
            markers.len(),
            animator.period()
        );

        let viewport = Viewport::from_terminal(cols, rows, config.pixel_ratio);
        let mut scene = Scene::new(GLOBE_RADIUS, 1.0, markers, arcs);
        scene.camera.resize(viewport.width, viewport.height);

        let texture = match &config.texture_url {
            Some(url) => {
                info!("fetching earth texture from {}", url);
                Some(TextureLoader::spawn(url))
            }
            None => {
                scene.material.color = FALLBACK_COLOR;
                None
            }
        };

        Self {
            scene,
            animator,
            viewport,
            frame: Frame::new(viewport.width, viewport.height),
            rotation_speed: config.rotation_speed,
            texture,
        }
    }

    /// Follow a terminal resize
    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.viewport = Viewport::from_terminal(cols, rows, self.viewport.pixel_ratio);
        self.scene.camera.resize(self.viewport.width, self.viewport.height);
    }

    /// Apply the texture once it has arrived. Returns true when the material changed.
    pub fn poll_texture(&mut self) -> bool {
        let Some(loader) = self.texture.as_mut() else {
            return false;
        };
        let Some(event) = loader.poll() else {
            return false;
        };
        let url = loader.url().to_string();
        self.texture = None;
        self.apply_texture(&url, event);
        true
    }

    pub fn texture_pending(&self) -> bool {
        self.texture.as_ref().is_some_and(TextureLoader::is_pending)
    }

    /// Block until the texture fetch finishes
    pub fn wait_for_texture(&mut self) {
        if let Some(loader) = self.texture.take() {
            let url = loader.url().to_string();
            let event = loader.wait();
            self.apply_texture(&url, event);
        }
    }

    fn apply_texture(&mut self, url: &str, event: TextureEvent) {
        texture::log_event(url, &event);
        self.scene.material.apply(event);
    }

    /// One frame of motion: a fixed rotation step plus `dt` seconds of timeline
    pub fn advance(&mut self, dt: f64) {
        self.scene.rotation_y += self.rotation_speed;
        self.animator.tick(dt);
    }

    pub fn render(&mut self) -> &Frame {
        self.scene.render(&self.viewport, self.animator.states(), &mut self.frame);
        &self.frame
    }
}

/// Draw a frame with half blocks: the top pixel is the foreground, the bottom the background
pub fn present_frame(term: &mut Terminal, frame: &Frame) {
    let to_color = |px: Option<(u8, u8, u8)>| -> Option<Color> { px.map(|(r, g, b)| rgb(r, g, b)) };

    for cy in 0..frame.height().div_ceil(2) {
        for cx in 0..frame.width() {
            let top = to_color(frame.rgb8(cx, cy * 2));
            let bottom = to_color(frame.rgb8(cx, cy * 2 + 1));

            let (x, y) = (cx as i32, cy as i32);
            match (top, bottom) {
                (None, None) => term.set(x, y, ' ', None),
                (None, Some(b)) => term.set(x, y, '▄', Some(b)),
                (Some(t), None) => term.set(x, y, '▀', Some(t)),
                (Some(t), Some(b)) => term.set_with_bg(x, y, '▀', Some(t), Some(b)),
            }
        }
    }
}

/// Run the interactive globe until the user quits
pub fn run<R: Rng + ?Sized>(term: &mut Terminal, config: &GlobeConfig, rng: &mut R) -> io::Result<()> {
    let mut state = ViewState::new();
    let (init_w, init_h) = term.size();
    let mut prev_w = init_w;
    let mut prev_h = init_h;

    let mut globe = Globe::new(config, rng, init_w, init_h);
    let mut controls = OrbitControls::new(CAMERA_DISTANCE, MIN_DISTANCE, MAX_DISTANCE);
    let mut last_tick = Instant::now();
    let mut redraw = true;

    loop {
        let (width, height) = term.query_size();

        if width != prev_w || height != prev_h {
            term.resize(width, height);
            term.clear_screen()?;
            globe.resize(width, height);
            prev_w = width;
            prev_h = height;
            redraw = true;
            debug!("resized to {}x{}", width, height);
        }

        while let Some((code, mods)) = term.check_key()? {
            if state.handle_key(code, mods) {
                return Ok(());
            }
            controls.handle_key(code);
            redraw = true;
        }

        if globe.poll_texture() {
            redraw = true;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_tick).as_secs_f64();
        last_tick = now;

        if state.paused && !redraw {
            term.sleep(0.1);
            continue;
        }
        if !state.paused {
            globe.advance(dt);
        }
        redraw = false;

        controls.update();
        globe.scene.camera.position = controls.position();

        term.clear();
        let frame = globe.render();
        present_frame(term, frame);
        if state.paused {
            term.set_str(1, height as i32 - 1, "PAUSED", Some(Color::DarkGrey));
        } else if globe.texture_pending() {
            term.set_str(1, height as i32 - 1, "loading texture...", Some(Color::DarkGrey));
        }
        if state.show_help {
            render_help_overlay(term, HELP);
        }
        term.present()?;
        term.sleep(config.time_step);
    }
}

/// Render one frame at `at` seconds into the timeline and print it
pub fn print<R: Rng + ?Sized>(config: &GlobeConfig, rng: &mut R, width: u16, height: u16, at: f64) -> io::Result<()> {
    let mut term = Terminal::with_size(width, height, false)?;
    let mut globe = Globe::new(config, rng, width, height);
    globe.wait_for_texture();
    globe.animator.seek(at);

    let frame = globe.render();
    present_frame(&mut term, frame);
    term.print_to_stdout()
}
