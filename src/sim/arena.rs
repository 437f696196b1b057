//! Arena simulation: round lifecycle and presenter-facing operations
//!
//! The random source is injected so launches and heart drops can be replayed
//! from a seed.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{GameEvent, Phase, RoundState, SpeedLevel};
use super::tick::tick;
use crate::error::ConfigError;
use crate::motion::MotionSignal;
use crate::tuning::Tuning;

/// Owns the round state, tuning and RNG
#[derive(Debug, Clone)]
pub struct ArenaSimulation<R = Pcg32> {
    tuning: Tuning,
    state: RoundState,
    rng: R,
}

impl ArenaSimulation<Pcg32> {
    /// Simulation with a seeded PCG random source
    pub fn new(tuning: Tuning, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(tuning, Pcg32::seed_from_u64(seed))
    }
}

impl<R: Rng> ArenaSimulation<R> {
    /// Simulation with a caller-supplied random source, starting at the menu
    pub fn with_rng(tuning: Tuning, rng: R) -> Result<Self, ConfigError> {
        tuning.validate()?;
        let state = RoundState::new(&tuning, Phase::Menu, SpeedLevel::default());
        Ok(Self { tuning, state, rng })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Read-only view for rendering
    pub fn snapshot(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// MENU -> LOADING while the camera comes up. Ignored from other phases.
    pub fn begin_loading(&mut self) -> bool {
        if self.state.phase != Phase::Menu {
            return false;
        }
        self.state.phase = Phase::Loading;
        log::debug!("Phase: Menu -> Loading");
        true
    }

    /// Start a fresh round: new blocks, full lives, zero score, ball parked
    ///
    /// Valid from any phase; this is also the restart after game over or
    /// victory. The speed level carries over.
    pub fn start_round(&mut self) {
        let previous = self.state.phase;
        self.state = RoundState::new(&self.tuning, Phase::Playing, self.state.speed_level);
        self.state.ball.rest_on(&self.state.paddle, &self.tuning);
        self.state.events.push(GameEvent::RoundStarted);
        log::info!(
            "Round started from {:?} ({} blocks, {} lives, speed {})",
            previous,
            self.state.blocks.len(),
            self.state.lives,
            self.state.speed_level.as_str()
        );
    }

    /// Advance one tick with the latest signal (no-op unless playing)
    pub fn update(&mut self, signal: MotionSignal) -> &RoundState {
        let before = self.state.phase;
        tick(&mut self.state, &signal, &self.tuning, &mut self.rng);
        if self.state.phase != before {
            log::debug!("Phase: {:?} -> {:?}", before, self.state.phase);
        }
        &self.state
    }

    /// Launch the parked ball with a randomized upward velocity
    ///
    /// Returns false (and does nothing) unless playing with the ball parked.
    pub fn launch_ball(&mut self) -> bool {
        if self.state.phase != Phase::Playing || self.state.ball.active {
            return false;
        }

        let multiplier = self.tuning.speed_multiplier(self.state.speed_level);
        let base = self.tuning.ball_speed_base;
        let spread: f32 = self.rng.random::<f32>() - 0.5;

        let ball = &mut self.state.ball;
        ball.vel.x = spread * base * self.tuning.launch_spread * multiplier;
        ball.vel.y = -base * multiplier;
        ball.active = true;
        self.state.events.push(GameEvent::Launched);
        true
    }

    /// Takes effect on the next launch or paddle rebound
    pub fn set_speed_level(&mut self, level: SpeedLevel) {
        self.state.speed_level = level;
    }

    /// SLOW -> MID -> FAST -> SLOW
    pub fn cycle_speed_level(&mut self) -> SpeedLevel {
        let next = self.state.speed_level.next();
        self.set_speed_level(next);
        next
    }

    /// Take events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }

    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut RoundState {
        &mut self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn arena(seed: u64) -> ArenaSimulation {
        ArenaSimulation::new(Tuning::default(), seed).unwrap()
    }

    #[test]
    fn test_starts_at_menu_and_is_inert() {
        let mut sim = arena(1);
        assert_eq!(sim.phase(), Phase::Menu);
        let before = sim.snapshot().clone();
        sim.update(MotionSignal::idle(0.0));
        assert!(!sim.launch_ball());
        assert_eq!(sim.snapshot(), &before);
    }

    #[test]
    fn test_loading_only_from_menu() {
        let mut sim = arena(1);
        assert!(sim.begin_loading());
        assert_eq!(sim.phase(), Phase::Loading);
        assert!(!sim.begin_loading());
        sim.start_round();
        assert!(!sim.begin_loading());
        assert_eq!(sim.phase(), Phase::Playing);
    }

    #[test]
    fn test_start_round_resets_everything() {
        let mut sim = arena(3);
        sim.start_round();
        assert!(sim.launch_ball());
        for _ in 0..400 {
            sim.update(MotionSignal::idle(0.3));
        }

        sim.start_round();
        let state = sim.snapshot();
        assert_eq!(state.phase, Phase::Playing);
        assert_eq!(state.lives, sim.tuning().initial_lives);
        assert_eq!(state.score, 0);
        assert!(state.blocks.iter().all(|b| b.active));
        assert!(state.hearts.is_empty());
        assert!(!state.ball.active);
        assert_eq!(state.ball.pos, Vec2::new(200.0, 565.0));
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut sim = arena(4);
        sim.start_round();
        sim.state.lives = 1;
        sim.state.ball.active = true;
        sim.state.ball.pos = Vec2::new(200.0, 599.0);
        sim.state.ball.vel = Vec2::new(0.0, 3.0);
        sim.update(MotionSignal::default());
        assert_eq!(sim.phase(), Phase::GameOver);
        assert!(!sim.launch_ball());

        sim.start_round();
        assert_eq!(sim.phase(), Phase::Playing);
        assert_eq!(sim.snapshot().lives, 5);
    }

    #[test]
    fn test_launch_velocity_range() {
        let mut sim = arena(9);
        sim.set_speed_level(SpeedLevel::Fast);
        for _ in 0..50 {
            sim.start_round();
            assert!(sim.launch_ball());
            let vel = sim.snapshot().ball.vel;
            let limit = 0.5 * 3.8 * 1.2 * 2.6;
            assert!(vel.x.abs() <= limit + 1e-5);
            assert!((vel.y - (-3.8 * 2.6)).abs() < 1e-5);
        }
    }

    #[test]
    fn test_launch_only_once() {
        let mut sim = arena(9);
        sim.start_round();
        assert!(sim.launch_ball());
        let vel = sim.snapshot().ball.vel;
        assert!(!sim.launch_ball());
        assert_eq!(sim.snapshot().ball.vel, vel);
    }

    #[test]
    fn test_speed_change_spares_ball_in_flight() {
        let mut sim = arena(5);
        sim.start_round();
        sim.launch_ball();
        let vel = sim.snapshot().ball.vel;
        sim.set_speed_level(SpeedLevel::Fast);
        sim.update(MotionSignal::idle(0.5));
        assert_eq!(sim.snapshot().ball.vel, vel);
    }

    #[test]
    fn test_cycle_speed_level() {
        let mut sim = arena(1);
        assert_eq!(sim.cycle_speed_level(), SpeedLevel::Mid);
        assert_eq!(sim.cycle_speed_level(), SpeedLevel::Fast);
        assert_eq!(sim.cycle_speed_level(), SpeedLevel::Slow);
    }

    #[test]
    fn test_determinism() {
        // Same seed, same inputs, same outcome
        let mut sim1 = arena(99999);
        let mut sim2 = arena(99999);
        for sim in [&mut sim1, &mut sim2] {
            sim.start_round();
            sim.launch_ball();
        }

        let inputs = [0.2, 0.5, 0.9, 0.4];
        for i in 0..600 {
            let signal = MotionSignal::idle(inputs[i % inputs.len()]);
            sim1.update(signal);
            sim2.update(signal);
            if !sim1.snapshot().ball.active {
                sim1.launch_ball();
                sim2.launch_ball();
            }
        }

        assert_eq!(sim1.snapshot(), sim2.snapshot());
    }

    #[test]
    fn test_invalid_tuning_rejected() {
        let tuning = Tuning {
            block_rows: 0,
            ..Tuning::default()
        };
        assert!(ArenaSimulation::new(tuning, 1).is_err());
    }
}
