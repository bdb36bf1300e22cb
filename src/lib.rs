//! Minimal GPIO-to-MQTT edge agents for Raspberry Pi
//!
//! Two binaries share this library:
//! - `light` - subscribes to an MQTT topic and pulses an output pin on each message
//! - `motion` - polls an input pin and publishes on rising-edge detection
//!
//! Module structure:
//! - `infra/` - Infrastructure (Config)
//! - `io/` - External interfaces (GPIO, MQTT)
//! - `services/` - Agent control loops (Light, Motion)

pub mod infra;
pub mod io;
pub mod services;
