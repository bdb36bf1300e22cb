//! IO modules - external system interfaces
//!
//! - `gpio` - GPIO pin acquisition and digital line access
//! - `mqtt` - MQTT broker connection and motion event publishing

pub mod gpio;
pub mod mqtt;

// Re-export commonly used types
pub use gpio::{Gpio, InputLine, OutputLine};
pub use mqtt::MotionPublisher;
