use std::path::PathBuf;

use clap::Parser;
use gesture_runner::{RunnerConfig, Theme};

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config JSON
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Fingertip trace JSON to replay (built-in demo when omitted)
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Obstacle theme: normal, city or forest (overrides config)
    #[arg(long)]
    pub theme: Option<Theme>,

    /// RNG seed for obstacle spawning (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Viewport width in pixels (overrides config)
    #[arg(long)]
    pub width: Option<f32>,

    /// Viewport height in pixels (overrides config)
    #[arg(long)]
    pub height: Option<f32>,

    /// How long to run; defaults to the trace length plus two seconds
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Tick rate of the frame loop
    #[arg(long, default_value_t = 60.0)]
    pub fps: f32,

    /// Pace ticks against the wall clock instead of simulating as fast as possible
    #[arg(long, default_value_t = false)]
    pub realtime: bool,
}

impl Args {
    pub fn apply(&self, config: &mut RunnerConfig) {
        if let Some(theme) = self.theme {
            config.theme = theme;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(width) = self.width {
            config.viewport.0 = width;
        }
        if let Some(height) = self.height {
            config.viewport.1 = height;
        }
    }
}
