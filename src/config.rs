use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::obstacle::Theme;

// Viewport / layout
pub const DEFAULT_VIEWPORT: (f32, f32) = (1280.0, 720.0);
pub const LAYOUT_REFERENCE: f32 = 720.0;
pub const SCALE_MIN: f32 = 0.75;
pub const SCALE_MAX: f32 = 1.65;

// Player dimensions (unscaled)
pub const PLAYER_WIDTH: f32 = 56.0;
pub const PLAYER_HEIGHT_STAND: f32 = 98.0;
pub const PLAYER_HEIGHT_SLIDE: f32 = 58.0;
pub const LANE_SNAP_EPSILON: f32 = 0.5;

// Movement
pub const SPEED_START: f32 = 620.0;
pub const SPEED_MAX: f32 = 1550.0;
pub const SPEED_RAMP: f32 = 26.0;
pub const GRAVITY: f32 = 3200.0;
pub const JUMP_VELOCITY: f32 = 1180.0;
pub const LANE_LERP: f32 = 14.0;
pub const SLIDE_DURATION: f32 = 0.55;
pub const MIN_ACTION_INTERVAL: f32 = 0.18;
pub const MAX_TICK_DT: f32 = 0.034;

// Spawning
pub const SPAWN_MIN: f32 = 0.52;
pub const SPAWN_MAX: f32 = 1.05;
pub const COIN_CHANCE: f64 = 0.55;
pub const COIN_SAME_LANE_CHANCE: f64 = 0.7;
pub const OBSTACLE_SPAWN_OFFSET: f32 = 140.0;
pub const COIN_SPAWN_OFFSET: f32 = 220.0;
pub const OBSTACLE_EXIT_MARGIN: f32 = 220.0;
pub const COIN_EXIT_MARGIN: f32 = 160.0;
pub const COIN_RADIUS: f32 = 14.0;

// Scoring
pub const SCORE_PER_SECOND: f32 = 12.0;
pub const COIN_BONUS: f32 = 55.0;

// Gesture classifier
pub const SMOOTHING_ALPHA: f32 = 0.45;
pub const GESTURE_THRESHOLD: f32 = 0.045;
pub const GESTURE_COOLDOWN: Duration = Duration::from_millis(220);
pub const AXIS_BIAS: f32 = 1.1;
pub const ANCHOR_IDLE: Duration = Duration::from_millis(250);
pub const RECENTER_SLOW: f32 = 0.02;
pub const RECENTER_FAST: f32 = 0.08;
pub const LANDMARK_MAX_FPS: f32 = 20.0;
pub const FINGERTIP_LANDMARK: usize = 8;

/// Gesture classifier tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    pub alpha: f32,
    /// Displacement threshold in normalized frame units (0..1).
    pub threshold: f32,
    pub axis_bias: f32,
    #[serde(with = "millis")]
    pub cooldown: Duration,
    #[serde(with = "millis")]
    pub anchor_idle: Duration,
    pub recenter_slow: f32,
    pub recenter_fast: f32,
    pub max_fps: f32,
    /// Which hand landmark drives the classifier.
    pub landmark_index: usize,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            alpha: SMOOTHING_ALPHA,
            threshold: GESTURE_THRESHOLD,
            axis_bias: AXIS_BIAS,
            cooldown: GESTURE_COOLDOWN,
            anchor_idle: ANCHOR_IDLE,
            recenter_slow: RECENTER_SLOW,
            recenter_fast: RECENTER_FAST,
            max_fps: LANDMARK_MAX_FPS,
            landmark_index: FINGERTIP_LANDMARK,
        }
    }
}

/// Engine tuning. Distances are unscaled and get multiplied by the track scale.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub speed_start: f32,
    pub speed_max: f32,
    pub speed_ramp: f32,
    pub spawn_min: f32,
    pub spawn_max: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub lane_lerp: f32,
    pub slide_duration: f32,
    pub min_action_interval: f32,
    pub coin_chance: f64,
    pub coin_same_lane_chance: f64,
    pub score_per_second: f32,
    pub coin_bonus: f32,
    pub max_dt: f32,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            speed_start: SPEED_START,
            speed_max: SPEED_MAX,
            speed_ramp: SPEED_RAMP,
            spawn_min: SPAWN_MIN,
            spawn_max: SPAWN_MAX,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            lane_lerp: LANE_LERP,
            slide_duration: SLIDE_DURATION,
            min_action_interval: MIN_ACTION_INTERVAL,
            coin_chance: COIN_CHANCE,
            coin_same_lane_chance: COIN_SAME_LANE_CHANCE,
            score_per_second: SCORE_PER_SECOND,
            coin_bonus: COIN_BONUS,
            max_dt: MAX_TICK_DT,
        }
    }
}

/// Everything the host needs to build a session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub theme: Theme,
    pub seed: u64,
    pub viewport: (f32, f32),
    pub classifier: ClassifierSettings,
    pub game: GameTuning,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            seed: 0x5eed,
            viewport: DEFAULT_VIEWPORT,
            classifier: ClassifierSettings::default(),
            game: GameTuning::default(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl RunnerConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine or the loops cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("game.max_dt", self.game.max_dt),
            ("game.spawn_min", self.game.spawn_min),
            ("classifier.max_fps", self.classifier.max_fps),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!("{} must be positive, got {}", name, value)));
            }
        }
        if self.game.spawn_max.is_nan() || self.game.spawn_max < self.game.spawn_min {
            return Err(ConfigError::Invalid(format!(
                "game.spawn_max ({}) is below game.spawn_min ({})",
                self.game.spawn_max, self.game.spawn_min
            )));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let ms = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(ms))
    }
}
