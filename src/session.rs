//! Presenter-side driver
//!
//! Runs the arena on a fixed timestep from variable display frame times,
//! samples the latest motion signal once per tick and owns the deferred
//! actions the simulation does not schedule itself (relaunch after a lost
//! ball, automatic restart after game over). Also keeps an in-memory play
//! clock.

use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::MAX_SUBSTEPS;
use crate::motion::{MotionSignal, SignalSlot};
use crate::sim::{ArenaSimulation, GameEvent, Phase, RoundState, SpeedLevel};

/// One game session: arena, signal slot and timers
#[derive(Debug)]
pub struct Session<R = Pcg32> {
    arena: ArenaSimulation<R>,
    slot: SignalSlot,
    accumulator: f32,
    paused: bool,
    /// Ticks until the parked ball launches
    pending_launch: Option<u32>,
    /// Ticks until an automatic restart
    retry_countdown: Option<u32>,
    /// Ticks spent playing (unpaused)
    play_ticks: u64,
    /// Slot generation seen on the last tick, and ticks since it changed
    last_generation: u64,
    stale_ticks: u32,
    events: Vec<GameEvent>,
}

impl<R: Rng> Session<R> {
    pub fn new(arena: ArenaSimulation<R>, slot: SignalSlot) -> Self {
        Self {
            arena,
            slot,
            accumulator: 0.0,
            paused: false,
            pending_launch: None,
            retry_countdown: None,
            play_ticks: 0,
            last_generation: 0,
            stale_ticks: 0,
            events: Vec::new(),
        }
    }

    pub fn snapshot(&self) -> &RoundState {
        self.arena.snapshot()
    }

    /// Camera is being acquired
    pub fn begin_loading(&mut self) -> bool {
        self.arena.begin_loading()
    }

    /// Start (or restart) a round; the ball launches on the next tick
    pub fn start(&mut self) {
        self.arena.start_round();
        self.pending_launch = Some(0);
        self.retry_countdown = None;
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        log::debug!("Paused: {}", self.paused);
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_speed_level(&mut self, level: SpeedLevel) {
        self.arena.set_speed_level(level);
    }

    pub fn cycle_speed_level(&mut self) -> SpeedLevel {
        self.arena.cycle_speed_level()
    }

    /// Whole seconds spent playing this session
    pub fn play_time_secs(&self) -> u64 {
        (self.play_ticks as f32 / self.arena.tuning().tick_rate_hz) as u64
    }

    /// Seconds left before the automatic restart, rounded up
    pub fn retry_countdown_secs(&self) -> Option<u32> {
        let rate = self.arena.tuning().tick_rate_hz;
        self.retry_countdown
            .map(|ticks| (ticks as f32 / rate).ceil() as u32)
    }

    /// Ticks since the motion signal last changed
    pub fn signal_age_ticks(&self) -> u32 {
        self.stale_ticks
    }

    /// Take events gathered since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Feed a display frame's elapsed time; returns the ticks run
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let step = self.arena.tuning().tick_dt();
        // max/min (not clamp) so a NaN frame time counts as zero
        self.accumulator += frame_dt.max(0.0).min(0.25);

        let mut substeps = 0;
        while self.accumulator >= step && substeps < MAX_SUBSTEPS {
            self.step();
            self.accumulator -= step;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= step {
            // Drop the backlog rather than spiral
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Run exactly one simulation tick
    pub fn step(&mut self) {
        if self.paused {
            return;
        }

        if let Some(ticks) = self.retry_countdown {
            if ticks == 0 {
                log::info!("Auto restart");
                self.start();
            } else {
                self.retry_countdown = Some(ticks - 1);
            }
        }

        if let Some(ticks) = self.pending_launch {
            if ticks == 0 {
                self.pending_launch = None;
                self.arena.launch_ball();
            } else {
                self.pending_launch = Some(ticks - 1);
            }
        }

        let signal = self.sample_signal();
        self.arena.update(signal);
        if self.arena.phase() == Phase::Playing {
            self.play_ticks += 1;
        }

        for event in self.arena.drain_events() {
            self.schedule(event);
            self.events.push(event);
        }
    }

    fn sample_signal(&mut self) -> MotionSignal {
        let generation = self.slot.generation();
        if generation == self.last_generation {
            self.stale_ticks = self.stale_ticks.saturating_add(1);
        } else {
            self.last_generation = generation;
            self.stale_ticks = 0;
        }
        self.slot.sample()
    }

    fn schedule(&mut self, event: GameEvent) {
        let tuning = self.arena.tuning();
        match event {
            GameEvent::BallLost { lives_left } if lives_left > 0 => {
                self.pending_launch = Some(tuning.secs_to_ticks(tuning.relaunch_delay_secs));
            }
            GameEvent::GameOver => {
                self.pending_launch = None;
                self.retry_countdown = tuning.retry_delay_secs.map(|s| tuning.secs_to_ticks(s));
            }
            GameEvent::Victory => {
                self.pending_launch = None;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::consts::SIM_DT;
    use glam::Vec2;

    fn session(tuning: Tuning) -> Session {
        let arena = ArenaSimulation::new(tuning, 42).unwrap();
        Session::new(arena, SignalSlot::new())
    }

    fn drop_ball(session: &mut Session) {
        let state = session.arena.state_mut();
        state.ball.active = true;
        state.ball.pos = Vec2::new(200.0, 599.0);
        state.ball.vel = Vec2::new(0.0, 3.0);
    }

    #[test]
    fn test_start_launches_next_tick() {
        let mut s = session(Tuning::default());
        s.start();
        assert!(!s.snapshot().ball.active);
        s.step();
        assert!(s.snapshot().ball.active);
        assert!(s.drain_events().contains(&GameEvent::Launched));
    }

    #[test]
    fn test_relaunch_after_delay() {
        let mut s = session(Tuning::default());
        s.start();
        s.step();
        drop_ball(&mut s);
        s.step();
        assert_eq!(s.snapshot().lives, 4);
        assert!(!s.snapshot().ball.active);

        for _ in 0..60 {
            s.step();
            assert!(!s.snapshot().ball.active);
        }
        s.step();
        assert!(s.snapshot().ball.active);
    }

    #[test]
    fn test_auto_restart_after_game_over() {
        let mut s = session(Tuning::default());
        s.start();
        s.step();
        s.arena.state_mut().lives = 1;
        drop_ball(&mut s);
        s.step();
        assert_eq!(s.snapshot().phase, Phase::GameOver);
        assert_eq!(s.retry_countdown_secs(), Some(3));

        for _ in 0..180 {
            s.step();
        }
        assert_eq!(s.snapshot().phase, Phase::GameOver);
        s.step();
        assert_eq!(s.snapshot().phase, Phase::Playing);
        assert_eq!(s.snapshot().lives, 5);
        assert_eq!(s.retry_countdown_secs(), None);
    }

    #[test]
    fn test_no_auto_restart_when_disabled() {
        let mut s = session(Tuning {
            retry_delay_secs: None,
            ..Tuning::default()
        });
        s.start();
        s.step();
        s.arena.state_mut().lives = 1;
        drop_ball(&mut s);
        for _ in 0..600 {
            s.step();
        }
        assert_eq!(s.snapshot().phase, Phase::GameOver);
    }

    #[test]
    fn test_play_clock_counts_only_playing() {
        let mut s = session(Tuning::default());
        for _ in 0..120 {
            s.step();
        }
        assert_eq!(s.play_time_secs(), 0);

        s.start();
        assert!(s.toggle_pause());
        assert!(s.is_paused());
        for _ in 0..120 {
            s.step();
        }
        assert_eq!(s.play_time_secs(), 0);
        assert!(!s.snapshot().ball.active);

        assert!(!s.toggle_pause());
        assert!(!s.is_paused());
        for _ in 0..120 {
            s.step();
        }
        assert_eq!(s.play_time_secs(), 2);
    }

    #[test]
    fn test_advance_runs_fixed_steps() {
        let mut s = session(Tuning::default());
        s.start();
        assert_eq!(s.advance(SIM_DT * 0.5), 0);
        assert_eq!(s.advance(SIM_DT * 0.6), 1);
        // Large hitches are capped
        assert_eq!(s.advance(5.0), MAX_SUBSTEPS);
        assert_eq!(s.advance(0.0), 0);
    }

    #[test]
    fn test_bad_frame_time_does_not_stall() {
        let mut s = session(Tuning::default());
        s.start();
        assert_eq!(s.advance(SIM_DT * 2.0), 2);
        assert_eq!(s.advance(f32::NAN), 0);
        assert_eq!(s.advance(-1.0), 0);
        let ran: u32 = (0..60).map(|_| s.advance(SIM_DT)).sum();
        assert!(ran >= 59, "only {ran} ticks ran");
        assert_eq!(s.advance(f32::INFINITY), MAX_SUBSTEPS);
    }

    #[test]
    fn test_capped_frame_keeps_partial_step() {
        let mut s = session(Tuning::default());
        s.start();
        // Eight whole steps plus half of one: the half survives the cap
        assert_eq!(s.advance(SIM_DT * 8.5), MAX_SUBSTEPS);
        assert_eq!(s.advance(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_stale_signal_is_reused() {
        let slot = SignalSlot::new();
        let arena = ArenaSimulation::new(Tuning::default(), 1).unwrap();
        let mut s = Session::new(arena, slot.clone());
        s.start();

        slot.publish(MotionSignal::idle(1.0));
        s.step();
        assert_eq!(s.signal_age_ticks(), 0);
        let after_one = s.snapshot().paddle.x;
        s.step();
        s.step();
        assert_eq!(s.signal_age_ticks(), 2);
        // Same target keeps pulling the paddle right
        assert!(s.snapshot().paddle.x > after_one);
    }
}
