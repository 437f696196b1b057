//! Fixed-step simulation tick
//!
//! One call advances the arena by one display frame. Velocities are in
//! arena units per tick.

use glam::Vec2;
use rand::Rng;

use super::collision::{
    ball_paddle_contact, ball_wall_contact, first_block_hit, heart_paddle_contact,
    paddle_hit_offset,
};
use super::state::{GameEvent, HeartItem, Phase, RoundState};
use crate::motion::MotionSignal;
use crate::tuning::Tuning;

/// Advance the round by one tick using the latest motion signal
///
/// A no-op unless the round is playing.
pub fn tick<R: Rng + ?Sized>(
    state: &mut RoundState,
    signal: &MotionSignal,
    tuning: &Tuning,
    rng: &mut R,
) {
    if state.phase != Phase::Playing {
        return;
    }

    // Paddle eases toward the signal's target
    let target_x = signal.normalized_x.clamp(0.0, 1.0) * tuning.arena_width
        - state.paddle.width * 0.5;
    state
        .paddle
        .move_toward(target_x, tuning.paddle_smoothing, tuning.arena_width);

    state.hit_effect = (state.hit_effect - tuning.hit_effect_decay).max(0.0);

    update_hearts(state, tuning);

    if state.ball.active {
        update_ball(state, tuning, rng);
    } else {
        state.ball.rest_on(&state.paddle, tuning);
    }
}

/// Prune, drop and catch hearts
fn update_hearts(state: &mut RoundState, tuning: &Tuning) {
    state.hearts.retain(|h| h.active);

    let paddle = state.paddle;
    for heart in state.hearts.iter_mut() {
        heart.pos.y += tuning.heart_fall_speed;

        if heart_paddle_contact(heart.pos, tuning.heart_size, &paddle) {
            heart.active = false;
            state.lives += 1;
            state.events.push(GameEvent::HeartCaught { id: heart.id });
        }

        if heart.pos.y > tuning.arena_height + tuning.heart_size && heart.active {
            heart.active = false;
            state.events.push(GameEvent::HeartMissed { id: heart.id });
        }
    }
}

fn update_ball<R: Rng + ?Sized>(state: &mut RoundState, tuning: &Tuning, rng: &mut R) {
    let ball = &mut state.ball;
    ball.pos += ball.vel;

    // Walls: independent per-axis reflection
    let wall = ball_wall_contact(ball, tuning.arena_width);
    if wall.side {
        ball.vel.x = -ball.vel.x;
    }
    if wall.top {
        ball.vel.y = -ball.vel.y;
    }

    if ball.pos.y > tuning.arena_height {
        lose_ball(state, tuning);
        return;
    }

    if ball_paddle_contact(ball, &state.paddle, tuning.paddle_hit_margin) {
        let multiplier = tuning.speed_multiplier(state.speed_level);
        let offset = paddle_hit_offset(ball.pos.x, &state.paddle);
        ball.vel.y = -ball.vel.y.abs();
        ball.vel.x = offset * tuning.ball_speed_base * tuning.paddle_rebound * multiplier;
        state.hit_effect = 1.0;
        state.events.push(GameEvent::PaddleHit);
    }

    // At most one block per tick
    if let Some(index) = first_block_hit(&state.ball, &state.blocks) {
        let block = &mut state.blocks[index];
        block.active = false;
        state.ball.vel.y = -state.ball.vel.y;
        state.score += tuning.block_score;
        state.events.push(GameEvent::BlockDestroyed { id: block.id });

        if rng.random_bool(tuning.heart_drop_chance) {
            let center = Vec2::new(block.x + block.width * 0.5, block.y + block.height * 0.5);
            let id = state.next_entity_id();
            state.hearts.push(HeartItem {
                id,
                pos: center,
                active: true,
            });
            state.events.push(GameEvent::HeartSpawned { id });
        }
    }

    if state.blocks.iter().all(|b| !b.active) {
        state.phase = Phase::Victory;
        state.events.push(GameEvent::Victory);
        log::info!("Board cleared, score {}", state.score);
    }
}

fn lose_ball(state: &mut RoundState, tuning: &Tuning) {
    state.lives = state.lives.saturating_sub(1);
    state.events.push(GameEvent::BallLost {
        lives_left: state.lives,
    });
    log::debug!("Ball lost, {} lives left", state.lives);

    if state.lives == 0 {
        state.ball.active = false;
        state.phase = Phase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("Game over, score {}", state.score);
    } else {
        state.reset_ball(tuning);
    }
}
