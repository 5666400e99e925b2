//! Test utilities for blockchain testing

use crate::config::PowConfig;
use crate::core::{Block, Blockchain};
use crate::error::{BlockchainError, Result};
use crate::storage::SledBlockStore;
use crate::utils::FixedClock;
use crate::wallet::{convert_address, hash_pub_key};
use tempfile::TempDir;

/// Timestamp used by every deterministic test block
pub const TEST_TIMESTAMP: i64 = 1_700_000_000;

/// 8 leading zero bits: about 256 hashes per block
pub fn easy_pow_config() -> PowConfig {
    PowConfig::new(8).expect("8 bits is a valid difficulty")
}

pub fn test_clock() -> FixedClock {
    FixedClock(TEST_TIMESTAMP)
}

/// A valid address derived from an arbitrary "public key"
pub fn test_address(owner: &str) -> String {
    convert_address(&hash_pub_key(owner.as_bytes()))
}

/// Create a temporary directory for testing
pub fn create_temp_dir() -> Result<TempDir> {
    tempfile::tempdir().map_err(|e| BlockchainError::Io(e.to_string()))
}

/// Create a test blockchain with temporary Sled storage
pub fn create_test_blockchain() -> Result<(Blockchain<SledBlockStore>, TempDir)> {
    let temp_dir = create_temp_dir()?;
    let store = SledBlockStore::open(temp_dir.path().join("test_blockchain"))?;
    let blockchain =
        Blockchain::create_blockchain(store, b"test genesis", easy_pow_config(), &test_clock())?;

    Ok((blockchain, temp_dir))
}

/// Mine `count` blocks on top of the current tip, one transaction each
pub fn mine_test_blocks(
    blockchain: &Blockchain<SledBlockStore>,
    count: usize,
) -> Result<Vec<Block>> {
    let mut blocks = Vec::with_capacity(count);
    for i in 0..count {
        let payload = format!("test transaction {i}").into_bytes();
        blocks.push(blockchain.mine_block(&[payload], &test_clock())?);
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::validate_address;

    #[test]
    fn test_create_test_blockchain() {
        let (blockchain, _temp_dir) = create_test_blockchain().unwrap();
        assert_eq!(blockchain.get_best_height().unwrap(), 0);
    }

    #[test]
    fn test_mine_test_blocks() {
        let (blockchain, _temp_dir) = create_test_blockchain().unwrap();
        let blocks = mine_test_blocks(&blockchain, 3).unwrap();

        assert_eq!(blocks.len(), 3);
        assert_eq!(blockchain.get_best_height().unwrap(), 3);
        assert_eq!(blockchain.verify_chain().unwrap(), 4);
    }

    #[test]
    fn test_addresses_are_valid_and_distinct() {
        let alice = test_address("alice");
        let bob = test_address("bob");
        assert!(validate_address(&alice));
        assert!(validate_address(&bob));
        assert_ne!(alice, bob);
    }
}
