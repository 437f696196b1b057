//! Collision tests for the rectangular arena
//!
//! Everything is axis-aligned: the ball is treated as its bounding square and
//! tests use strict inequalities, so touching edges do not count as contact.

use glam::Vec2;

use super::state::{Ball, Block, Paddle};

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            max: Vec2::new(x + width, y + height),
        }
    }

    /// Square of half-size `half` around `center`
    pub fn around(center: Vec2, half: f32) -> Self {
        Self {
            min: center - Vec2::splat(half),
            max: center + Vec2::splat(half),
        }
    }

    /// Strict overlap (shared edges do not count)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.max.x > other.min.x
            && self.min.x < other.max.x
            && self.max.y > other.min.y
            && self.min.y < other.max.y
    }
}

impl Block {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

impl Paddle {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.x, self.y, self.width, self.height)
    }
}

impl Ball {
    pub fn bounds(&self) -> Aabb {
        Aabb::around(self.pos, self.radius)
    }
}

/// Which walls the ball is beyond
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallContact {
    pub side: bool,
    pub top: bool,
}

/// Check left/right walls (inclusive of radius) and the ceiling
///
/// Both axes are reported independently, so a corner reflects both.
pub fn ball_wall_contact(ball: &Ball, arena_width: f32) -> WallContact {
    WallContact {
        side: ball.pos.x < ball.radius || ball.pos.x > arena_width - ball.radius,
        top: ball.pos.y < ball.radius,
    }
}

/// Ball overlaps the paddle band vertically and its centre is within the
/// paddle's x-range widened by `margin` on each side
pub fn ball_paddle_contact(ball: &Ball, paddle: &Paddle, margin: f32) -> bool {
    ball.pos.y + ball.radius > paddle.y
        && ball.pos.y - ball.radius < paddle.y + paddle.height
        && ball.pos.x > paddle.x - margin
        && ball.pos.x < paddle.x + paddle.width + margin
}

/// Normalized hit offset across the paddle: -1 at the left edge, 1 at the right
pub fn paddle_hit_offset(ball_x: f32, paddle: &Paddle) -> f32 {
    (ball_x - paddle.center_x()) / (paddle.width * 0.5)
}

/// Index of the first active block the ball overlaps (scan order)
pub fn first_block_hit(ball: &Ball, blocks: &[Block]) -> Option<usize> {
    let ball_box = ball.bounds();
    blocks
        .iter()
        .position(|block| block.active && ball_box.overlaps(&block.bounds()))
}

/// Heart square overlaps the paddle band
pub fn heart_paddle_contact(heart_pos: Vec2, heart_size: f32, paddle: &Paddle) -> bool {
    Aabb::around(heart_pos, heart_size * 0.5).overlaps(&paddle.bounds())
}
