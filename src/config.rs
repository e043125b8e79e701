use crate::settings::GlobeSettings;
use crate::texture::DEFAULT_TEXTURE_URL;
use crate::timeline::TimelineParams;

/// Number of arcs drawn when nothing else is configured
pub const DEFAULT_ARC_COUNT: usize = 15;
/// Upper bound on arcs from any source
pub const MAX_ARCS: usize = 200;
/// Globe spin per frame in radians, independent of frame rate
pub const DEFAULT_ROTATION_SPEED: f32 = 0.0005;

/// Configuration for the globe animation
#[derive(Clone, Debug)]
pub struct GlobeConfig {
    /// Seconds per frame
    pub time_step: f32,
    pub seed: Option<u64>,
    pub arc_count: usize,
    pub rotation_speed: f32,
    /// `None` skips the fetch and uses the flat fallback fill
    pub texture_url: Option<String>,
    pub pixel_ratio: f32,
    pub timeline: TimelineParams,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            time_step: 0.03,
            seed: None,
            arc_count: DEFAULT_ARC_COUNT,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            texture_url: Some(DEFAULT_TEXTURE_URL.to_string()),
            pixel_ratio: 1.0,
            timeline: TimelineParams::default(),
        }
    }
}

impl GlobeConfig {
    /// Layer settings-file values over the defaults
    pub fn from_settings(settings: &GlobeSettings) -> Self {
        let mut config = Self::default();
        if let Some(url) = &settings.texture_url {
            config.texture_url = Some(url.clone());
        }
        if let Some(count) = settings.arc_count {
            config.arc_count = count.min(MAX_ARCS);
        }
        if let Some(ratio) = settings.pixel_ratio {
            config.pixel_ratio = ratio;
        }
        if let Some(speed) = settings.rotation_speed {
            config.rotation_speed = speed;
        }
        if let Some(ease) = settings.reveal_ease {
            config.timeline.reveal_ease = ease;
        }
        if let Some(ease) = settings.fade_ease {
            config.timeline.fade_ease = ease;
        }
        config.seed = settings.seed;
        config
    }
}

/// Command-line overrides shared by the interactive and print modes
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub arcs: Option<usize>,
    pub texture: Option<String>,
    pub no_texture: bool,
    pub pixel_ratio: Option<f32>,
    pub time_step: Option<f32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut GlobeConfig) {
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(arcs) = self.arcs {
            config.arc_count = arcs.min(MAX_ARCS);
        }
        if let Some(url) = &self.texture {
            config.texture_url = Some(url.clone());
        }
        if self.no_texture {
            config.texture_url = None;
        }
        if let Some(ratio) = self.pixel_ratio {
            config.pixel_ratio = ratio;
        }
        if let Some(step) = self.time_step {
            config.time_step = step.clamp(0.005, 1.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::Ease;

    #[test]
    fn cli_beats_settings_beats_defaults() {
        let settings = GlobeSettings {
            texture_url: Some("earth.png".into()),
            arc_count: Some(4),
            seed: Some(1),
            ..Default::default()
        };
        let mut config = GlobeConfig::from_settings(&settings);
        assert_eq!(config.arc_count, 4);
        assert_eq!(config.rotation_speed, DEFAULT_ROTATION_SPEED);

        let overrides = Overrides { seed: Some(9), arcs: Some(1000), ..Default::default() };
        overrides.apply(&mut config);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.arc_count, 200);
        assert_eq!(config.texture_url.as_deref(), Some("earth.png"));
    }

    #[test]
    fn settings_arc_count_is_capped() {
        let settings = GlobeSettings { arc_count: Some(1_000_000_000), ..Default::default() };
        let config = GlobeConfig::from_settings(&settings);
        assert_eq!(config.arc_count, MAX_ARCS);
    }

    #[test]
    fn settings_choose_timeline_eases() {
        let settings = GlobeSettings {
            reveal_ease: Some(Ease::Power1Out),
            fade_ease: Some(Ease::Power1In),
            ..Default::default()
        };
        let config = GlobeConfig::from_settings(&settings);
        assert_eq!(config.timeline.reveal_ease, Ease::Power1Out);
        assert_eq!(config.timeline.fade_ease, Ease::Power1In);
        assert_eq!(GlobeConfig::default().timeline.reveal_ease, Ease::Power1InOut);
    }

    #[test]
    fn no_texture_wins_over_url() {
        let mut config = GlobeConfig::default();
        let overrides = Overrides { texture: Some("x.png".into()), no_texture: true, ..Default::default() };
        overrides.apply(&mut config);
        assert!(config.texture_url.is_none());
    }
}
