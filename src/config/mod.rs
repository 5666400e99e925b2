//! Configuration management
//!
//! Proof-of-work parameters and the process-level settings (database path,
//! difficulty, nonce ceiling, mining workers) read from the environment.

pub mod mining;
pub mod settings;

pub use mining::{PowConfig, DEFAULT_DIFFICULTY_BITS, MAX_NONCE};
pub use settings::{Config, GLOBAL_CONFIG};
