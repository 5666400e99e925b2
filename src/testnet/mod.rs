//! Shared fixtures for unit tests: easy difficulty, a fixed clock,
//! deterministic addresses and throwaway Sled-backed chains.

pub mod test_utils;

pub use test_utils::*;
