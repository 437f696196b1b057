//! Motion estimation module
//!
//! Turns camera frames into a [`MotionSignal`] without any pose model:
//! - `frame`: fixed-size RGBA buffers
//! - `estimator`: bottom-band frame differencing
//! - `slot`: latest-value handoff to the simulation
//! - `capture`: background loop pulling from a [`FrameSource`]

pub mod capture;
pub mod estimator;
pub mod frame;
pub mod slot;

pub use capture::{CaptureHandle, FrameSource, SweepSource};
pub use estimator::{Direction, EstimatorParams, MotionEstimator, MotionSignal};
pub use frame::PixelBuffer;
pub use slot::SignalSlot;
