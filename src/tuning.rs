//! Data-driven game balance
//!
//! Every tunable is fixed at startup. Missing JSON fields fall back to the
//! values in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::SpeedLevel;

/// Startup configuration for the estimator, arena and session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Arena ===
    pub arena_width: f32,
    pub arena_height: f32,

    // === Paddle ===
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub paddle_bottom_offset: f32,
    pub paddle_smoothing: f32,
    pub paddle_hit_margin: f32,

    // === Ball ===
    pub ball_radius: f32,
    pub ball_speed_base: f32,
    /// Parked ball height above the arena bottom
    pub ball_rest_offset: f32,
    /// Where a lost ball reappears, above the arena bottom
    pub ball_reset_offset: f32,
    pub launch_spread: f32,
    pub paddle_rebound: f32,
    pub speed_multipliers: [f32; 3],

    // === Blocks ===
    pub block_rows: u32,
    pub block_cols: u32,
    pub block_padding: f32,
    pub block_height: f32,
    pub block_top_offset: f32,
    pub block_score: u32,

    // === Lives & hearts ===
    pub initial_lives: u32,
    pub heart_drop_chance: f64,
    pub heart_fall_speed: f32,
    pub heart_size: f32,
    pub hit_effect_decay: f32,

    // === Motion estimator ===
    pub frame_width: u32,
    pub frame_height: u32,
    pub pixel_diff_threshold: f32,
    pub motion_energy_min: u32,
    pub motion_band: f32,
    pub intensity_saturation: f32,
    /// Mirror x so a front-facing feed moves the paddle the way the body moves
    pub mirror: bool,

    // === Session ===
    pub tick_rate_hz: f32,
    pub relaunch_delay_secs: f32,
    /// Auto-restart after game over (`None` waits for an explicit restart)
    pub retry_delay_secs: Option<f32>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,

            paddle_width: PADDLE_WIDTH,
            paddle_height: PADDLE_HEIGHT,
            paddle_bottom_offset: PADDLE_BOTTOM_OFFSET,
            paddle_smoothing: PADDLE_SMOOTHING,
            paddle_hit_margin: PADDLE_HIT_MARGIN,

            ball_radius: BALL_RADIUS,
            ball_speed_base: BALL_SPEED_BASE,
            ball_rest_offset: BALL_REST_OFFSET,
            ball_reset_offset: BALL_RESET_OFFSET,
            launch_spread: LAUNCH_SPREAD,
            paddle_rebound: PADDLE_REBOUND,
            speed_multipliers: SPEED_MULTIPLIERS,

            block_rows: BLOCK_ROWS,
            block_cols: BLOCK_COLS,
            block_padding: BLOCK_PADDING,
            block_height: BLOCK_HEIGHT,
            block_top_offset: BLOCK_TOP_OFFSET,
            block_score: BLOCK_SCORE,

            initial_lives: INITIAL_LIVES,
            heart_drop_chance: HEART_DROP_CHANCE,
            heart_fall_speed: HEART_FALL_SPEED,
            heart_size: HEART_SIZE,
            hit_effect_decay: HIT_EFFECT_DECAY,

            frame_width: FRAME_WIDTH,
            frame_height: FRAME_HEIGHT,
            pixel_diff_threshold: PIXEL_DIFF_THRESHOLD,
            motion_energy_min: MOTION_ENERGY_MIN,
            motion_band: MOTION_BAND,
            intensity_saturation: INTENSITY_SATURATION,
            mirror: true,

            tick_rate_hz: TICK_RATE_HZ,
            relaunch_delay_secs: RELAUNCH_DELAY_SECS,
            retry_delay_secs: Some(RETRY_DELAY_SECS),
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON, then validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("arena_width", self.arena_width),
            ("arena_height", self.arena_height),
            ("paddle_width", self.paddle_width),
            ("paddle_height", self.paddle_height),
            ("ball_radius", self.ball_radius),
            ("ball_speed_base", self.ball_speed_base),
            ("block_height", self.block_height),
            ("heart_size", self.heart_size),
            ("intensity_saturation", self.intensity_saturation),
            ("tick_rate_hz", self.tick_rate_hz),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(0.0..=self.arena_height).contains(&self.ball_rest_offset)
            || !(0.0..=self.arena_height).contains(&self.ball_reset_offset)
        {
            return Err(invalid("ball offsets must lie inside the arena".into()));
        }
        if self.paddle_width > self.arena_width {
            return Err(invalid("paddle_width exceeds arena_width".into()));
        }
        if !(0.0..=1.0).contains(&self.heart_drop_chance) {
            return Err(invalid(format!(
                "heart_drop_chance must be in [0, 1], got {}",
                self.heart_drop_chance
            )));
        }
        if !(0.0..=1.0).contains(&self.paddle_smoothing) {
            return Err(invalid("paddle_smoothing must be in [0, 1]".into()));
        }
        if !(self.motion_band > 0.0 && self.motion_band <= 1.0) {
            return Err(invalid("motion_band must be in (0, 1]".into()));
        }
        if self.block_rows == 0 || self.block_cols == 0 {
            return Err(invalid("block grid must have at least one block".into()));
        }
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(invalid("frame dimensions must be non-zero".into()));
        }
        if self.speed_multipliers.iter().any(|m| !(*m > 0.0)) {
            return Err(invalid("speed multipliers must be positive".into()));
        }
        if self.relaunch_delay_secs < 0.0 || self.retry_delay_secs.is_some_and(|s| s < 0.0) {
            return Err(invalid("delays must not be negative".into()));
        }
        Ok(())
    }

    /// Velocity multiplier for a speed level
    pub fn speed_multiplier(&self, level: SpeedLevel) -> f32 {
        self.speed_multipliers[level.index()]
    }

    /// Top edge of the paddle band
    pub fn paddle_y(&self) -> f32 {
        self.arena_height - self.paddle_bottom_offset
    }

    /// Fixed simulation step in seconds
    pub fn tick_dt(&self) -> f32 {
        1.0 / self.tick_rate_hz
    }

    /// Convert a delay in seconds to whole simulation ticks
    pub fn secs_to_ticks(&self, secs: f32) -> u32 {
        (secs * self.tick_rate_hz).round().max(0.0) as u32
    }
}

fn invalid(msg: String) -> ConfigError {
    ConfigError::Invalid(msg)
}
