//! Round state and core simulation types
//!
//! Everything a presenter needs to draw a frame lives in [`RoundState`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::BLOCK_COLOR_TAGS;
use crate::tuning::Tuning;

/// Lifecycle of the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Waiting for the camera, nothing simulated
    Loading,
    /// Active gameplay
    Playing,
    /// Out of lives (restart available)
    GameOver,
    /// Board cleared (restart available)
    Victory,
}

impl Phase {
    /// Round finished, waiting for a restart
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::GameOver | Phase::Victory)
    }
}

/// Difficulty level applied to launches and paddle rebounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeedLevel {
    #[default]
    Slow,
    Mid,
    Fast,
}

impl SpeedLevel {
    pub const ALL: [SpeedLevel; 3] = [SpeedLevel::Slow, SpeedLevel::Mid, SpeedLevel::Fast];

    pub fn index(&self) -> usize {
        match self {
            SpeedLevel::Slow => 0,
            SpeedLevel::Mid => 1,
            SpeedLevel::Fast => 2,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedLevel::Slow => "SLOW",
            SpeedLevel::Mid => "MID",
            SpeedLevel::Fast => "FAST",
        }
    }

    /// Next level, wrapping FAST back to SLOW
    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }
}

/// The player's paddle (fixed band near the arena bottom)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Paddle {
    /// Centred paddle for a fresh round
    pub fn centered(tuning: &Tuning) -> Self {
        Self {
            x: (tuning.arena_width - tuning.paddle_width) * 0.5,
            y: tuning.paddle_y(),
            width: tuning.paddle_width,
            height: tuning.paddle_height,
        }
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    /// Move a fraction of the way toward `target_x`, then clamp to the arena
    pub fn move_toward(&mut self, target_x: f32, smoothing: f32, arena_width: f32) {
        self.x += (target_x - self.x) * smoothing;
        self.x = self.x.clamp(0.0, (arena_width - self.width).max(0.0));
    }
}

/// The ball. Inactive means parked on the paddle waiting for launch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl Ball {
    pub fn new(tuning: &Tuning) -> Self {
        let mut ball = Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            radius: tuning.ball_radius,
            active: false,
        };
        ball.reset(tuning);
        ball
    }

    /// Stop and move to the reset spot (re-parked on the paddle next tick)
    pub fn reset(&mut self, tuning: &Tuning) {
        self.pos = Vec2::new(
            tuning.arena_width * 0.5,
            tuning.arena_height - tuning.ball_reset_offset,
        );
        self.vel = Vec2::ZERO;
        self.active = false;
    }

    /// Follow the paddle while parked
    pub fn rest_on(&mut self, paddle: &Paddle, tuning: &Tuning) {
        self.pos = Vec2::new(paddle.center_x(), tuning.arena_height - tuning.ball_rest_offset);
    }
}

/// A destructible block
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub active: bool,
    /// Row colour index for the presenter
    pub color_tag: u8,
}

/// Falling bonus life
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeartItem {
    pub id: u32,
    /// Centre of the heart
    pub pos: Vec2,
    pub active: bool,
}

/// Things that happened during a tick, for sound/visual feedback and scheduling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted,
    Launched,
    PaddleHit,
    BlockDestroyed { id: u32 },
    HeartSpawned { id: u32 },
    HeartCaught { id: u32 },
    HeartMissed { id: u32 },
    /// Ball fell out; a relaunch should be scheduled if lives remain
    BallLost { lives_left: u32 },
    GameOver,
    Victory,
}

/// Complete state of one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    pub phase: Phase,
    pub lives: u32,
    pub score: u32,
    pub speed_level: SpeedLevel,
    pub paddle: Paddle,
    pub ball: Ball,
    /// Grid layout in id order
    pub blocks: Vec<Block>,
    /// Live hearts in spawn order
    pub hearts: Vec<HeartItem>,
    /// Paddle hit flash (1.0 on hit, decays to 0)
    pub hit_effect: f32,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl RoundState {
    /// Fresh round state in the given phase
    pub fn new(tuning: &Tuning, phase: Phase, speed_level: SpeedLevel) -> Self {
        let paddle = Paddle::centered(tuning);
        Self {
            phase,
            lives: tuning.initial_lives,
            score: 0,
            speed_level,
            paddle,
            ball: Ball::new(tuning),
            blocks: layout_blocks(tuning),
            hearts: Vec::new(),
            hit_effect: 0.0,
            events: Vec::new(),
            next_id: 0,
        }
    }

    /// Allocate a heart ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn active_blocks(&self) -> usize {
        self.blocks.iter().filter(|b| b.active).count()
    }

    /// Park the ball and recentre the paddle after a lost ball
    pub fn reset_ball(&mut self, tuning: &Tuning) {
        self.ball.reset(tuning);
        self.paddle = Paddle::centered(tuning);
    }

    /// Take queued events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Compute the block grid: equal-width columns spanning the arena
pub fn layout_blocks(tuning: &Tuning) -> Vec<Block> {
    let cols = tuning.block_cols;
    let pad = tuning.block_padding;
    let total_width = tuning.arena_width - pad * 2.0;
    let block_width = (total_width - pad * (cols as f32 - 1.0)) / cols as f32;
    let start_y = pad + tuning.block_top_offset;

    (0..tuning.block_rows)
        .flat_map(|row| (0..cols).map(move |col| (row, col)))
        .map(|(row, col)| Block {
            id: row * cols + col,
            x: pad + col as f32 * (block_width + pad),
            y: start_y + row as f32 * (tuning.block_height + pad),
            width: block_width,
            height: tuning.block_height,
            active: true,
            color_tag: (row % BLOCK_COLOR_TAGS as u32) as u8,
        })
        .collect()
}
