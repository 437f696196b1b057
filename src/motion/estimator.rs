//! Frame-difference motion estimation
//!
//! No pose model: two consecutive low-resolution frames are compared pixel by
//! pixel over the bottom band of the image, where the player's body sits
//! closest to the camera. The moving pixels give a direction (which half of
//! the frame moved more), an intensity and a centroid used as the paddle
//! target.
//!
//! There is no temporal filtering here. Jitter is absorbed by the paddle
//! smoothing in the simulation.

use serde::{Deserialize, Serialize};

use super::frame::{PixelBuffer, luma};
use crate::error::FrameError;
use crate::tuning::Tuning;

/// Dominant horizontal motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    #[default]
    Idle,
}

/// Control input inferred from one pair of frames
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionSignal {
    pub direction: Direction,
    /// Saturating activity level in [0, 1]
    pub intensity: f32,
    /// Paddle target across the arena in [0, 1]
    pub normalized_x: f32,
}

impl Default for MotionSignal {
    fn default() -> Self {
        Self::idle(0.5)
    }
}

impl MotionSignal {
    /// No new evidence: hold the control point where it was
    pub fn idle(normalized_x: f32) -> Self {
        Self {
            direction: Direction::Idle,
            intensity: 0.0,
            normalized_x,
        }
    }
}

/// Estimator thresholds (copied out of [`Tuning`])
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorParams {
    pub pixel_diff_threshold: f32,
    pub motion_energy_min: u32,
    /// Bottom fraction of rows scanned
    pub motion_band: f32,
    pub intensity_saturation: f32,
    pub mirror: bool,
}

impl From<&Tuning> for EstimatorParams {
    fn from(tuning: &Tuning) -> Self {
        Self {
            pixel_diff_threshold: tuning.pixel_diff_threshold,
            motion_energy_min: tuning.motion_energy_min,
            motion_band: tuning.motion_band,
            intensity_saturation: tuning.intensity_saturation,
            mirror: tuning.mirror,
        }
    }
}

/// Raw motion counts over the scanned band
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandMotion {
    pub left: u32,
    pub right: u32,
    /// Sum of x coordinates of moving pixels
    pub sum_x: u64,
}

impl BandMotion {
    pub fn total(&self) -> u32 {
        self.left + self.right
    }
}

/// First row of the bottom band
pub fn band_start_row(height: u32, band: f32) -> u32 {
    ((height as f32 * (1.0 - band)).floor() as u32).min(height)
}

/// Count moving pixels in the bottom band of two same-sized frames
pub fn scan_band(previous: &PixelBuffer, current: &PixelBuffer, params: &EstimatorParams) -> BandMotion {
    let width = current.width();
    let mut motion = BandMotion::default();

    for y in band_start_row(current.height(), params.motion_band)..current.height() {
        let rows = previous.row(y).iter().zip(current.row(y));
        for (x, (prev, curr)) in rows.enumerate() {
            if (luma(*curr) - luma(*prev)).abs() > params.pixel_diff_threshold {
                if (x as u32) * 2 < width {
                    motion.left += 1;
                } else {
                    motion.right += 1;
                }
                motion.sum_x += x as u64;
            }
        }
    }

    motion
}

/// Stateful estimator holding the previous frame and the last control point
#[derive(Debug, Clone)]
pub struct MotionEstimator {
    width: u32,
    height: u32,
    params: EstimatorParams,
    previous: Option<PixelBuffer>,
    last_x: f32,
}

impl MotionEstimator {
    pub fn new(width: u32, height: u32, params: EstimatorParams) -> Self {
        Self {
            width,
            height,
            params,
            previous: None,
            last_x: 0.5,
        }
    }

    pub fn from_tuning(tuning: &Tuning) -> Self {
        Self::new(tuning.frame_width, tuning.frame_height, EstimatorParams::from(tuning))
    }

    /// Frame size fixed at construction
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Last published paddle target
    pub fn last_x(&self) -> f32 {
        self.last_x
    }

    /// Compare `current` with the retained frame, then retain `current`
    ///
    /// The first frame only primes the estimator and yields an idle signal.
    /// A frame of the wrong size is a configuration error.
    pub fn estimate(&mut self, current: PixelBuffer) -> Result<MotionSignal, FrameError> {
        if current.width() != self.width || current.height() != self.height {
            return Err(FrameError::Dimensions {
                width: self.width,
                height: self.height,
                actual_width: current.width(),
                actual_height: current.height(),
            });
        }

        let signal = match self.previous.as_ref() {
            None => MotionSignal::idle(self.last_x),
            Some(previous) => {
                let motion = scan_band(previous, &current, &self.params);
                self.signal_from(motion)
            }
        };

        self.previous = Some(current);
        Ok(signal)
    }

    fn signal_from(&mut self, motion: BandMotion) -> MotionSignal {
        let total = motion.total();
        if total <= self.params.motion_energy_min {
            return MotionSignal::idle(self.last_x);
        }

        let centroid = motion.sum_x as f32 / total as f32;
        let x = (centroid / self.width as f32).clamp(0.0, 1.0);
        self.last_x = if self.params.mirror { 1.0 - x } else { x };

        let (direction, winner) = if motion.left > motion.right {
            (Direction::Left, motion.left)
        } else {
            (Direction::Right, motion.right)
        };

        MotionSignal {
            direction,
            intensity: (winner as f32 / self.params.intensity_saturation).min(1.0),
            normalized_x: self.last_x,
        }
    }
}
