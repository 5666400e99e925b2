use crate::error::{BlockchainError, Result};
use num_bigint::BigInt;
use std::ops::ShlAssign;

/// Leading zero bits required of a block hash unless configured otherwise.
pub const DEFAULT_DIFFICULTY_BITS: u32 = 16;

/// Nonce ceiling. The search covers `0..MAX_NONCE`.
pub const MAX_NONCE: i64 = i64::MAX;

const MAX_DIFFICULTY_BITS: u32 = 256;

/// Proof-of-work parameters.
///
/// `difficulty_bits` is hashed into every block header, so a miner and every
/// validator of its blocks must agree on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowConfig {
    difficulty_bits: u32,
    max_nonce: i64,
    workers: usize,
}

impl Default for PowConfig {
    fn default() -> Self {
        PowConfig {
            difficulty_bits: DEFAULT_DIFFICULTY_BITS,
            max_nonce: MAX_NONCE,
            workers: 1,
        }
    }
}

impl PowConfig {
    pub fn new(difficulty_bits: u32) -> Result<PowConfig> {
        if difficulty_bits > MAX_DIFFICULTY_BITS {
            return Err(BlockchainError::Config(format!(
                "Difficulty must be at most {MAX_DIFFICULTY_BITS} bits, got {difficulty_bits}"
            )));
        }
        Ok(PowConfig {
            difficulty_bits,
            ..Default::default()
        })
    }

    pub fn with_max_nonce(mut self, max_nonce: i64) -> Result<PowConfig> {
        if max_nonce <= 0 {
            return Err(BlockchainError::Config(format!(
                "Nonce ceiling must be positive, got {max_nonce}"
            )));
        }
        self.max_nonce = max_nonce;
        Ok(self)
    }

    pub fn with_workers(mut self, workers: usize) -> Result<PowConfig> {
        if workers == 0 {
            return Err(BlockchainError::Config(
                "At least one mining worker is required".to_string(),
            ));
        }
        self.workers = workers;
        Ok(self)
    }

    pub fn get_difficulty_bits(&self) -> u32 {
        self.difficulty_bits
    }

    pub fn get_max_nonce(&self) -> i64 {
        self.max_nonce
    }

    pub fn get_workers(&self) -> usize {
        self.workers
    }

    /// `2^(256 - difficulty_bits)`; a valid hash is strictly below it.
    pub fn target(&self) -> BigInt {
        let mut target = BigInt::from(1);
        target.shl_assign(MAX_DIFFICULTY_BITS - self.difficulty_bits);
        target
    }
}
