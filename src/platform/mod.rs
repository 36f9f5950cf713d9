//! Platform abstraction layer
//!
//! Host-facing glue shared by the browser and native builds:
//! - Frame timing (display refresh timestamps to fixed sim steps)

pub mod time;

pub use time::FrameClock;
