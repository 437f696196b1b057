//! Capture/estimate loop
//!
//! Runs on its own thread at whatever cadence the frame source delivers and
//! publishes each estimate into a [`SignalSlot`]. The simulation never waits
//! on it: a slow camera only makes the signal stale.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use super::estimator::MotionEstimator;
use super::frame::PixelBuffer;
use super::slot::SignalSlot;
use crate::error::CaptureError;

/// Supplier of fixed-size frames (camera adapter)
pub trait FrameSource: Send {
    /// Acquire the device. Failure means the game cannot start.
    fn open(&mut self) -> Result<(), CaptureError>;

    /// Wait for the next frame. `Ok(None)` ends the stream.
    ///
    /// Implementations must return periodically so a stop request is seen.
    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, CaptureError>;

    /// Release the device. Called exactly once after a successful `open`.
    fn release(&mut self);
}

/// Releases the source when dropped, whichever way the loop exits
struct Opened<S: FrameSource>(S);

impl<S: FrameSource> Drop for Opened<S> {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Handle to a running capture loop
#[derive(Debug)]
pub struct CaptureHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Result<(), CaptureError>>>,
}

impl CaptureHandle {
    /// Open `source` and start estimating on a background thread
    ///
    /// Open failures are returned here and the loop never starts.
    pub fn spawn<S>(
        mut source: S,
        mut estimator: MotionEstimator,
        slot: SignalSlot,
    ) -> Result<Self, CaptureError>
    where
        S: FrameSource + 'static,
    {
        source.open()?;
        let opened = Opened(source);
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let thread = std::thread::Builder::new()
            .name("capture".into())
            .spawn(move || {
                let mut opened = opened;
                let (width, height) = estimator.dimensions();
                log::info!("Capture loop started ({width}x{height})");

                let result = run_loop(&mut opened.0, &mut estimator, &slot, &stop_flag);
                drop(opened);

                match result {
                    Ok(frames) => {
                        log::info!("Capture loop stopped after {frames} frames");
                        Ok(())
                    }
                    Err(e) => {
                        log::error!("Capture loop failed: {e}");
                        Err(e)
                    }
                }
            })
            .map_err(CaptureError::Spawn)?;

        Ok(Self {
            stop,
            thread: Some(thread),
        })
    }

    /// Whether the loop thread is still alive
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the loop and wait for the source to be released
    ///
    /// Returns the error that ended the loop, if any. Only the first call
    /// reports it; later calls return `Ok`.
    pub fn stop(&mut self) -> Result<(), CaptureError> {
        self.stop.store(true, Ordering::Release);
        match self.thread.take() {
            Some(thread) => thread.join().unwrap_or(Err(CaptureError::Panicked)),
            None => Ok(()),
        }
    }
}

/// Pull frames until stopped or the stream ends; returns the frame count
fn run_loop<S: FrameSource>(
    source: &mut S,
    estimator: &mut MotionEstimator,
    slot: &SignalSlot,
    stop: &AtomicBool,
) -> Result<u64, CaptureError> {
    let mut frames = 0u64;
    while !stop.load(Ordering::Acquire) {
        let Some(frame) = source.next_frame()? else {
            log::info!("Frame source ended");
            break;
        };
        slot.publish(estimator.estimate(frame)?);
        frames += 1;
    }
    Ok(frames)
}

impl Drop for CaptureHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Capture loop error on drop: {e}");
        }
    }
}

/// Synthetic source: a bright bar sweeping back and forth across a dark frame
///
/// Stands in for a camera in the demo binary and in tests.
#[derive(Debug, Clone)]
pub struct SweepSource {
    width: u32,
    height: u32,
    bar_width: u32,
    x: i32,
    step: i32,
    remaining: Option<u32>,
    interval: Duration,
}

impl SweepSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bar_width: (width / 8).max(1),
            x: 0,
            step: 2,
            remaining: None,
            interval: Duration::ZERO,
        }
    }

    /// Horizontal pixels moved per frame
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step.max(1) as i32;
        self
    }

    /// End the stream after `frames` frames
    pub fn with_frame_limit(mut self, frames: u32) -> Self {
        self.remaining = Some(frames);
        self
    }

    /// Sleep between frames to mimic a camera's frame rate
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    fn advance(&mut self) {
        let max_x = self.width.saturating_sub(self.bar_width) as i32;
        self.x += self.step;
        if self.x <= 0 || self.x >= max_x {
            self.x = self.x.clamp(0, max_x);
            self.step = -self.step;
        }
    }
}

impl FrameSource for SweepSource {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.width == 0 || self.height == 0 {
            return Err(CaptureError::Unavailable("zero-sized sweep".into()));
        }
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<PixelBuffer>, CaptureError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        if !self.interval.is_zero() {
            std::thread::sleep(self.interval);
        }

        let frame = PixelBuffer::filled(self.width, self.height, [16, 16, 16, 255])?.with_rect(
            self.x as u32,
            0,
            self.bar_width,
            self.height,
            [240, 240, 240, 255],
        );
        self.advance();
        Ok(Some(frame))
    }

    fn release(&mut self) {
        log::debug!("Sweep source released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Tuning;
    use crate::error::FrameError;
    use std::sync::atomic::AtomicU32;

    /// Wraps a source and counts releases
    struct Counted<S> {
        inner: S,
        releases: Arc<AtomicU32>,
    }

    impl<S: FrameSource> FrameSource for Counted<S> {
        fn open(&mut self) -> Result<(), CaptureError> {
            self.inner.open()
        }

        fn next_frame(&mut self) -> Result<Option<PixelBuffer>, CaptureError> {
            self.inner.next_frame()
        }

        fn release(&mut self) {
            self.releases.fetch_add(1, Ordering::SeqCst);
            self.inner.release();
        }
    }

    struct Denied;

    impl FrameSource for Denied {
        fn open(&mut self) -> Result<(), CaptureError> {
            Err(CaptureError::Denied)
        }

        fn next_frame(&mut self) -> Result<Option<PixelBuffer>, CaptureError> {
            Ok(None)
        }

        fn release(&mut self) {
            panic!("released a source that never opened");
        }
    }

    fn estimator() -> MotionEstimator {
        MotionEstimator::from_tuning(&Tuning::default())
    }

    #[test]
    fn test_open_failure_never_starts() {
        let err = CaptureHandle::spawn(Denied, estimator(), SignalSlot::new()).unwrap_err();
        assert!(matches!(err, CaptureError::Denied));
    }

    #[test]
    fn test_finite_stream_publishes_and_releases_once() {
        let releases = Arc::new(AtomicU32::new(0));
        let source = Counted {
            inner: SweepSource::new(64, 48).with_step(4).with_frame_limit(10),
            releases: Arc::clone(&releases),
        };
        let slot = SignalSlot::new();
        let mut handle = CaptureHandle::spawn(source, estimator(), slot.clone()).unwrap();

        while handle.is_running() {
            std::thread::yield_now();
        }
        assert!(handle.stop().is_ok());
        assert!(handle.stop().is_ok());

        assert_eq!(slot.generation(), 10);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent_on_endless_stream() {
        let releases = Arc::new(AtomicU32::new(0));
        let source = Counted {
            inner: SweepSource::new(64, 48).with_interval(Duration::from_millis(1)),
            releases: Arc::clone(&releases),
        };
        let mut handle = CaptureHandle::spawn(source, estimator(), SignalSlot::new()).unwrap();
        assert!(handle.stop().is_ok());
        assert!(!handle.is_running());
        assert!(handle.stop().is_ok());
        drop(handle);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_mismatched_frames_stop_the_loop() {
        let releases = Arc::new(AtomicU32::new(0));
        let source = Counted {
            inner: SweepSource::new(32, 24),
            releases: Arc::clone(&releases),
        };
        let slot = SignalSlot::new();
        let mut handle = CaptureHandle::spawn(source, estimator(), slot.clone()).unwrap();
        while handle.is_running() {
            std::thread::yield_now();
        }
        let err = handle.stop().unwrap_err();
        assert!(matches!(
            err,
            CaptureError::Frame(FrameError::Dimensions {
                width: 64,
                height: 48,
                actual_width: 32,
                actual_height: 24,
            })
        ));
        // Reported once
        assert!(handle.stop().is_ok());
        assert_eq!(slot.generation(), 0);
        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    /// Delivers a few frames, then loses the device
    struct Unplugged {
        inner: SweepSource,
        frames_left: u32,
    }

    impl FrameSource for Unplugged {
        fn open(&mut self) -> Result<(), CaptureError> {
            self.inner.open()
        }

        fn next_frame(&mut self) -> Result<Option<PixelBuffer>, CaptureError> {
            if self.frames_left == 0 {
                return Err(CaptureError::Unavailable("device unplugged".into()));
            }
            self.frames_left -= 1;
            self.inner.next_frame()
        }

        fn release(&mut self) {}
    }

    #[test]
    fn test_source_failure_is_reported_on_stop() {
        let source = Unplugged {
            inner: SweepSource::new(64, 48),
            frames_left: 3,
        };
        let slot = SignalSlot::new();
        let mut handle = CaptureHandle::spawn(source, estimator(), slot.clone()).unwrap();
        while handle.is_running() {
            std::thread::yield_now();
        }
        let err = handle.stop().unwrap_err();
        assert!(matches!(err, CaptureError::Unavailable(msg) if msg == "device unplugged"));
        assert_eq!(slot.generation(), 3);
    }

    #[test]
    fn test_sweep_bounces_inside_frame() {
        let mut source = SweepSource::new(16, 4).with_step(5);
        for _ in 0..20 {
            let frame = source.next_frame().unwrap().unwrap();
            assert_eq!(frame.width(), 16);
            assert!(source.x >= 0 && source.x <= 14);
        }
    }
}
