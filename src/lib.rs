//! Motion Breakout - a Breakout arena steered by body motion
//!
//! Core modules:
//! - `motion`: Frame-difference motion estimation (camera frames -> control signal)
//! - `sim`: Deterministic arena simulation (paddle, ball, blocks, hearts, lives)
//! - `session`: Fixed-timestep driver wiring the two together for a presenter
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod motion;
pub mod session;
pub mod sim;
pub mod tuning;

pub use error::{CaptureError, ConfigError, FrameError};
pub use motion::{Direction, MotionEstimator, MotionSignal, PixelBuffer, SignalSlot};
pub use session::Session;
pub use sim::{ArenaSimulation, Phase, RoundState, SpeedLevel};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Simulation rate (one step per display frame)
    pub const TICK_RATE_HZ: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE_HZ;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions
    pub const ARENA_WIDTH: f32 = 400.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 180.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    /// Distance from the arena bottom to the paddle's top edge
    pub const PADDLE_BOTTOM_OFFSET: f32 = 22.0;
    /// Fraction of the remaining distance covered per tick
    pub const PADDLE_SMOOTHING: f32 = 0.5;
    /// Horizontal slack on each side of the paddle for ball hits
    pub const PADDLE_HIT_MARGIN: f32 = 10.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 11.0;
    pub const BALL_SPEED_BASE: f32 = 3.8;
    /// Parked ball rests this far above the arena bottom
    pub const BALL_REST_OFFSET: f32 = 35.0;
    /// Reset position offset from the arena bottom
    pub const BALL_RESET_OFFSET: f32 = 60.0;
    pub const LAUNCH_SPREAD: f32 = 1.2;
    pub const PADDLE_REBOUND: f32 = 0.8;

    /// Speed level multipliers (SLOW, MID, FAST)
    pub const SPEED_MULTIPLIERS: [f32; 3] = [1.0, 1.8, 2.6];

    /// Block grid
    pub const BLOCK_ROWS: u32 = 5;
    pub const BLOCK_COLS: u32 = 6;
    pub const BLOCK_PADDING: f32 = 5.0;
    pub const BLOCK_HEIGHT: f32 = 20.0;
    pub const BLOCK_TOP_OFFSET: f32 = 55.0;
    pub const BLOCK_SCORE: u32 = 10;
    pub const BLOCK_COLOR_TAGS: u8 = 5;

    pub const INITIAL_LIVES: u32 = 5;

    /// Heart pickups
    pub const HEART_DROP_CHANCE: f64 = 0.1;
    pub const HEART_FALL_SPEED: f32 = 2.5;
    pub const HEART_SIZE: f32 = 24.0;

    /// Paddle hit flash decay per tick
    pub const HIT_EFFECT_DECAY: f32 = 0.05;

    /// Estimator frame size
    pub const FRAME_WIDTH: u32 = 64;
    pub const FRAME_HEIGHT: u32 = 48;
    /// Per-pixel luma change (0-255) that counts as motion
    pub const PIXEL_DIFF_THRESHOLD: f32 = 30.0;
    /// Moving pixels required before a frame carries a signal
    pub const MOTION_ENERGY_MIN: u32 = 15;
    /// Bottom fraction of the frame that is scanned
    pub const MOTION_BAND: f32 = 0.2;
    /// Winning-side pixel count that saturates intensity
    pub const INTENSITY_SATURATION: f32 = 50.0;

    /// Deferred actions owned by the session
    pub const RELAUNCH_DELAY_SECS: f32 = 1.0;
    pub const RETRY_DELAY_SECS: f32 = 3.0;
}
