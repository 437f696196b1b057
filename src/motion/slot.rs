//! Latest-value handoff between the capture loop and the simulation
//!
//! Last write wins: no queue, no back-pressure. Readers copy the current value
//! and may see the same signal on several ticks, or miss intermediate ones.

use std::sync::{Arc, Mutex, PoisonError};

use super::estimator::MotionSignal;

/// Shared cell holding the most recent [`MotionSignal`]
#[derive(Debug, Clone, Default)]
pub struct SignalSlot {
    inner: Arc<Mutex<Published>>,
}

#[derive(Debug, Default)]
struct Published {
    signal: MotionSignal,
    generation: u64,
}

impl SignalSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the current value
    pub fn publish(&self, signal: MotionSignal) {
        let mut published = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        published.signal = signal;
        published.generation += 1;
    }

    /// Copy out the current value without consuming it
    pub fn sample(&self) -> MotionSignal {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .signal
    }

    /// Number of publications so far (lets a reader detect staleness)
    pub fn generation(&self) -> u64 {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Direction;

    #[test]
    fn test_default_is_idle_center() {
        let slot = SignalSlot::new();
        assert_eq!(slot.sample(), MotionSignal::idle(0.5));
        assert_eq!(slot.generation(), 0);
    }

    #[test]
    fn test_last_write_wins() {
        let slot = SignalSlot::new();
        let writer = slot.clone();
        writer.publish(MotionSignal::idle(0.1));
        writer.publish(MotionSignal {
            direction: Direction::Left,
            intensity: 0.4,
            normalized_x: 0.9,
        });
        let seen = slot.sample();
        assert_eq!(seen.direction, Direction::Left);
        assert_eq!(seen.normalized_x, 0.9);
        // Sampling does not consume
        assert_eq!(slot.sample(), seen);
        assert_eq!(slot.generation(), 2);
    }

    #[test]
    fn test_cross_thread_publish() {
        let slot = SignalSlot::new();
        let writer = slot.clone();
        std::thread::spawn(move || writer.publish(MotionSignal::idle(0.25)))
            .join()
            .unwrap();
        assert_eq!(slot.sample().normalized_x, 0.25);
    }
}
