mod arc;
mod config;
mod controls;
mod geo;
mod globe;
mod help;
mod logging;
mod scene;
mod settings;
mod terminal;
mod texture;
mod timeline;
mod tween;

use clap::{Args, Parser, Subcommand};
use config::{GlobeConfig, Overrides};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use settings::Settings;
use std::io;
use terminal::Terminal;

#[derive(Parser)]
#[command(name = "globearc")]
#[command(author = "Terminal Art Generator")]
#[command(version = "0.1.0")]
#[command(about = "Rotating terminal globe with animated flight-path arcs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by both subcommands
#[derive(Args)]
struct SceneArgs {
    /// Random seed for reproducible arcs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of arcs to draw (max 200)
    #[arg(short, long)]
    arcs: Option<usize>,

    /// Earth texture URL, file:// URL or path
    #[arg(long)]
    texture: Option<String>,

    /// Skip the texture and use a flat fill
    #[arg(long)]
    no_texture: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the interactive globe
    Globe {
        #[command(flatten)]
        scene: SceneArgs,

        /// Animation speed (seconds per frame)
        #[arg(short, long)]
        time: Option<f32>,

        /// Supersampling factor (1-2)
        #[arg(short, long)]
        pixel_ratio: Option<f32>,
    },

    /// Print a single frame to stdout
    Print {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output width in columns
        #[arg(short = 'W', long, default_value = "80")]
        width: u16,

        /// Output height in rows
        #[arg(short = 'H', long, default_value = "24")]
        height: u16,

        /// Timeline position in seconds
        #[arg(long, default_value = "2.0")]
        at: f64,
    },
}

impl SceneArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            seed: self.seed,
            arcs: self.arcs,
            texture: self.texture,
            no_texture: self.no_texture,
            ..Overrides::default()
        }
    }
}

fn build_config(overrides: &Overrides) -> GlobeConfig {
    let settings = Settings::load();
    let mut config = GlobeConfig::from_settings(&settings.globe);
    overrides.apply(&mut config);
    config
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Globe { scene, time, pixel_ratio } => {
            logging::init(logging::Target::File(logging::default_log_path()));
            let overrides = Overrides { pixel_ratio, time_step: time, ..scene.overrides() };
            let config = build_config(&overrides);
            info!("starting globe with {} arcs", config.arc_count);

            let mut rng = make_rng(config.seed);
            let mut term = Terminal::new(true)?;
            globe::run(&mut term, &config, &mut rng)?;
        }
        Commands::Print { scene, width, height, at } => {
            logging::init(logging::Target::Stderr);
            let config = build_config(&scene.overrides());

            let mut rng = make_rng(config.seed);
            globe::print(&config, &mut rng, width.max(1), height.max(1), at)?;
        }
    }

    Ok(())
}
