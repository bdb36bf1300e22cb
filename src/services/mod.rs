//! Services - agent control loops
//!
//! - `light` - event-driven pulse controller for the output pin
//! - `motion` - rising-edge detector and input polling loop

pub mod light;
pub mod motion;

// Re-export commonly used types
pub use light::LightController;
pub use motion::{EdgeDetector, MotionEvent, MotionMonitor};
