//! Infrastructure - configuration
//!
//! - `config` - Agent configuration (JSON loading)

pub mod config;

pub use config::Config;
