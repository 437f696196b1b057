//! Motion Breakout entry point
//!
//! Headless native run: a synthetic sweeping source stands in for the camera,
//! the capture loop runs on its own thread and the session ticks at the
//! display rate, logging what happens.
//!
//! Usage: `motion-breakout [tuning.json] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Motion Breakout (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser presenter drives the library directly
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};

    use motion_breakout::motion::{CaptureHandle, SweepSource};
    use motion_breakout::sim::GameEvent;
    use motion_breakout::{ArenaSimulation, MotionEstimator, Session, SignalSlot, Tuning};

    const DEFAULT_RUN_SECS: f32 = 20.0;

    pub fn run() -> Result<()> {
        let mut args = std::env::args().skip(1);
        let tuning = match args.next() {
            Some(path) => {
                Tuning::load(&path).with_context(|| format!("loading tuning from {path}"))?
            }
            None => Tuning::default(),
        };
        let run_secs: f32 = args
            .next()
            .map(|s| s.parse())
            .transpose()
            .context("run length must be a number of seconds")?
            .unwrap_or(DEFAULT_RUN_SECS);

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        log::info!("Seed {seed}, running for {run_secs}s");

        let slot = SignalSlot::new();
        let arena = ArenaSimulation::new(tuning.clone(), seed).context("invalid tuning")?;
        let mut session = Session::new(arena, slot.clone());
        session.begin_loading();

        // ~30 fps camera, independent of the 60 Hz simulation
        let source = SweepSource::new(tuning.frame_width, tuning.frame_height)
            .with_step(3)
            .with_interval(Duration::from_millis(33));
        let mut capture = CaptureHandle::spawn(source, MotionEstimator::from_tuning(&tuning), slot)
            .context("camera unavailable")?;

        session.start();

        let frame = Duration::from_secs_f32(tuning.tick_dt());
        let started = Instant::now();
        let mut last = started;
        while started.elapsed().as_secs_f32() < run_secs {
            if !capture.is_running() {
                capture.stop().context("capture loop failed")?;
                log::warn!("Frame source ended early");
                break;
            }
            std::thread::sleep(frame);
            let now = Instant::now();
            session.advance((now - last).as_secs_f32());
            last = now;

            for event in session.drain_events() {
                report(event, &session);
            }
        }

        capture.stop().context("capture loop failed")?;

        let state = session.snapshot();
        let summary = serde_json::json!({
            "phase": state.phase,
            "round_over": state.phase.is_terminal(),
            "score": state.score,
            "lives": state.lives,
            "blocks_left": state.active_blocks(),
            "speed": state.speed_level.as_str(),
            "play_time_secs": session.play_time_secs(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

    fn report(event: GameEvent, session: &Session) {
        let state = session.snapshot();
        match event {
            GameEvent::BlockDestroyed { id } => {
                log::info!("Block {id} destroyed, score {}", state.score)
            }
            GameEvent::HeartCaught { .. } => log::info!("Heart caught, lives {}", state.lives),
            GameEvent::BallLost { lives_left } => log::info!("Ball lost, {lives_left} lives left"),
            GameEvent::GameOver => log::info!(
                "Game over, restarting in {}s",
                session.retry_countdown_secs().unwrap_or(0)
            ),
            GameEvent::Victory => log::info!("Victory with score {}", state.score),
            other => log::debug!("{other:?}"),
        }
    }
}
