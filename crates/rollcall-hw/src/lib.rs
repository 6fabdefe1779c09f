//! rollcall-hw — V4L2 camera capture.
//!
//! Provides camera access as a sequence of owned RGB frames, plus device
//! enumeration for operator diagnostics.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, CameraStream, DeviceInfo};
pub use frame::Frame;
