use crate::config::PowConfig;
use crate::core::Block;
use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use data_encoding::HEXLOWER;
use log::{debug, info};
use num_bigint::{BigInt, Sign};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;

const PROGRESS_INTERVAL: i64 = 100_000;

/// Nonce search over one block header.
///
/// The hashed bytes are, in this order:
/// `prev_block_hash ‖ merkle_root ‖ be64(timestamp) ‖ be64(difficulty_bits) ‖ be64(nonce)`.
/// Changing the order or widths changes every block hash.
pub struct ProofOfWork {
    header_prefix: Vec<u8>,
    target: BigInt,
    config: PowConfig,
}

impl ProofOfWork {
    pub fn new_proof_of_work(block: &Block, config: &PowConfig) -> Result<ProofOfWork> {
        let merkle_root = block.hash_transactions()?;
        let prev_block_hash = block.get_prev_block_hash();

        let mut header_prefix = Vec::with_capacity(prev_block_hash.len() + merkle_root.len() + 16);
        header_prefix.extend(prev_block_hash);
        header_prefix.extend(merkle_root);
        header_prefix.extend(block.get_timestamp().to_be_bytes());
        header_prefix.extend(i64::from(config.get_difficulty_bits()).to_be_bytes());

        Ok(ProofOfWork {
            header_prefix,
            target: config.target(),
            config: *config,
        })
    }

    pub fn get_target(&self) -> &BigInt {
        &self.target
    }

    pub fn prepare_data(&self, nonce: i64) -> Vec<u8> {
        let mut data_bytes = Vec::with_capacity(self.header_prefix.len() + 8);
        data_bytes.extend_from_slice(&self.header_prefix);
        data_bytes.extend(nonce.to_be_bytes());
        data_bytes
    }

    fn meets_target(&self, hash: &[u8]) -> bool {
        BigInt::from_bytes_be(Sign::Plus, hash) < self.target
    }

    /// Search for the first qualifying nonce below the configured ceiling.
    ///
    /// With more than one worker the nonce space is split between threads and
    /// the first thread to succeed wins, so the nonce found is not necessarily
    /// the smallest one.
    pub fn run(&self) -> Result<(i64, Vec<u8>)> {
        let workers = self.config.get_workers();
        info!(
            "Mining the block (difficulty: {} bits, workers: {workers})",
            self.config.get_difficulty_bits()
        );

        let found = if workers > 1 {
            self.run_parallel(workers)
        } else {
            self.search(0, 1, None)
        };

        match found {
            Some((nonce, hash)) => {
                info!("Found nonce {nonce}: {}", HEXLOWER.encode(hash.as_slice()));
                Ok((nonce, hash))
            }
            None => Err(BlockchainError::MiningExhausted {
                max_nonce: self.config.get_max_nonce(),
            }),
        }
    }

    // Tries start, start + step, start + 2 * step, ... below the ceiling.
    fn search(&self, start: i64, step: i64, stop: Option<&AtomicBool>) -> Option<(i64, Vec<u8>)> {
        let max_nonce = self.config.get_max_nonce();
        let mut nonce = start;

        while nonce < max_nonce {
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return None;
            }

            let hash = sha256_digest(self.prepare_data(nonce).as_slice());
            if self.meets_target(&hash) {
                return Some((nonce, hash));
            }
            if nonce % PROGRESS_INTERVAL == 0 {
                debug!("nonce {nonce}: {}", HEXLOWER.encode(hash.as_slice()));
            }

            nonce = nonce.checked_add(step)?;
        }
        None
    }

    fn run_parallel(&self, workers: usize) -> Option<(i64, Vec<u8>)> {
        let found = AtomicBool::new(false);
        let winner: Mutex<Option<(i64, Vec<u8>)>> = Mutex::new(None);
        let step = workers as i64;

        thread::scope(|scope| {
            for worker in 0..workers {
                let found = &found;
                let winner = &winner;
                scope.spawn(move || {
                    if let Some(result) = self.search(worker as i64, step, Some(found)) {
                        if !found.swap(true, Ordering::SeqCst) {
                            if let Ok(mut slot) = winner.lock() {
                                *slot = Some(result);
                            }
                        }
                    }
                });
            }
        });

        winner.into_inner().ok().flatten()
    }

    /// Recompute the digest for `nonce` and check it against the target.
    pub fn validate(&self, nonce: i64) -> bool {
        if nonce < 0 {
            return false;
        }
        let hash = sha256_digest(self.prepare_data(nonce).as_slice());
        self.meets_target(&hash)
    }

    /// Full proof-of-work check for a stored or received block: the recomputed
    /// digest must equal the block's hash and fall below the target.
    pub fn validate_block(block: &Block, config: &PowConfig) -> Result<bool> {
        let pow = ProofOfWork::new_proof_of_work(block, config)?;
        if block.get_nonce() < 0 {
            return Ok(false);
        }
        let hash = sha256_digest(pow.prepare_data(block.get_nonce()).as_slice());
        Ok(hash.as_slice() == block.get_hash() && pow.meets_target(&hash))
    }
}
