use crate::config::PowConfig;
use crate::core::{MerkleProof, MerkleTree, ProofOfWork};
use crate::error::{BlockchainError, Result};
use crate::utils::{deserialize, serialize, TimeSource};
use data_encoding::HEXLOWER;
use log::info;
use serde::{Deserialize, Serialize};

/// Width of every block hash (raw SHA-256).
pub const HASH_LEN: usize = 32;

/// A mined ledger entry.
///
/// Transactions are opaque serialized blobs; the block only commits to their
/// exact bytes through the Merkle root. A block is mined inside its
/// constructor and is never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct Block {
    timestamp: i64,
    transactions: Vec<Vec<u8>>,
    prev_block_hash: Vec<u8>, // Empty for the genesis block only
    hash: Vec<u8>,
    nonce: i64,
    height: usize,
}

impl Block {
    /// Assemble a block and run proof-of-work on it. Blocks the caller until a
    /// nonce is found or the nonce ceiling is exhausted.
    pub fn new_block(
        transactions: &[Vec<u8>],
        prev_block_hash: &[u8],
        height: usize,
        config: &PowConfig,
        clock: &dyn TimeSource,
    ) -> Result<Block> {
        Self::check_header(transactions.len(), prev_block_hash, height)?;

        let mut block = Block {
            timestamp: clock.unix_timestamp()?,
            transactions: transactions.to_vec(),
            prev_block_hash: prev_block_hash.to_vec(),
            hash: vec![],
            nonce: 0,
            height,
        };

        info!(
            "Starting proof-of-work for block at height {height} with {} transactions",
            block.transactions.len()
        );
        let pow = ProofOfWork::new_proof_of_work(&block, config)?;
        let (nonce, hash) = pow.run()?;
        block.nonce = nonce;
        block.hash = hash;
        info!("Proof-of-work completed for block: {}", block.get_hash_hex());

        Ok(block)
    }

    pub fn generate_genesis_block(
        coinbase: &[u8],
        config: &PowConfig,
        clock: &dyn TimeSource,
    ) -> Result<Block> {
        Block::new_block(&[coinbase.to_vec()], &[], 0, config, clock)
    }

    /// Create an unmined block with a fixed timestamp (for testing only)
    #[cfg(test)]
    pub fn new_test_block(
        timestamp: i64,
        transactions: Vec<Vec<u8>>,
        prev_block_hash: Vec<u8>,
        height: usize,
    ) -> Block {
        Block {
            timestamp,
            transactions,
            prev_block_hash,
            hash: vec![0u8; HASH_LEN],
            nonce: 0,
            height,
        }
    }

    fn check_header(transaction_count: usize, prev_block_hash: &[u8], height: usize) -> Result<()> {
        if transaction_count == 0 {
            return Err(BlockchainError::InvalidBlock(
                "Block must contain at least one transaction".to_string(),
            ));
        }
        if !prev_block_hash.is_empty() && prev_block_hash.len() != HASH_LEN {
            return Err(BlockchainError::InvalidBlock(format!(
                "Previous block hash must be {HASH_LEN} bytes, got {}",
                prev_block_hash.len()
            )));
        }
        match (height, prev_block_hash.is_empty()) {
            (0, false) => Err(BlockchainError::InvalidBlock(
                "Genesis block cannot reference a previous block".to_string(),
            )),
            (h, true) if h > 0 => Err(BlockchainError::InvalidBlock(format!(
                "Block at height {h} is missing its previous block hash"
            ))),
            _ => Ok(()),
        }
    }

    /// Decode a block, failing on truncated, trailing or structurally invalid
    /// input.
    pub fn deserialize(bytes: &[u8]) -> Result<Block> {
        let block = deserialize::<Block>(bytes)?;

        let malformed = |reason: String| {
            BlockchainError::Serialization(format!("Malformed block: {reason}"))
        };
        Self::check_header(block.transactions.len(), &block.prev_block_hash, block.height)
            .map_err(|e| malformed(e.to_string()))?;
        if block.hash.len() != HASH_LEN {
            return Err(malformed(format!(
                "hash must be {HASH_LEN} bytes, got {}",
                block.hash.len()
            )));
        }
        if block.nonce < 0 {
            return Err(malformed(format!("negative nonce {}", block.nonce)));
        }

        Ok(block)
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn get_transactions(&self) -> &[Vec<u8>] {
        self.transactions.as_slice()
    }

    pub fn get_prev_block_hash(&self) -> &[u8] {
        self.prev_block_hash.as_slice()
    }

    pub fn get_hash(&self) -> &[u8] {
        self.hash.as_slice()
    }

    pub fn get_hash_hex(&self) -> String {
        HEXLOWER.encode(self.hash.as_slice())
    }

    pub fn get_timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn get_height(&self) -> usize {
        self.height
    }

    pub fn get_nonce(&self) -> i64 {
        self.nonce
    }

    pub fn is_genesis(&self) -> bool {
        self.prev_block_hash.is_empty()
    }

    /// Merkle root over the transaction bytes exactly as stored.
    pub fn hash_transactions(&self) -> Result<Vec<u8>> {
        MerkleTree::calculate_merkle_root(&self.transactions)
    }

    /// Generate a Merkle proof for a transaction in this block
    pub fn generate_merkle_proof(&self, transaction_index: usize) -> Result<MerkleProof> {
        let merkle_tree = MerkleTree::new(&self.transactions)?;
        merkle_tree.generate_proof(transaction_index)
    }

    /// Verify a Merkle proof against this block's transactions
    pub fn verify_merkle_proof(&self, proof: &MerkleProof) -> Result<bool> {
        if proof.merkle_root != self.hash_transactions()? {
            return Ok(false);
        }

        Ok(MerkleTree::verify_proof(proof))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testnet::{easy_pow_config as easy_config, TEST_TIMESTAMP as TIMESTAMP};
    use crate::utils::{sha256_digest, FixedClock};

    fn genesis() -> Block {
        Block::generate_genesis_block(b"coinbase", &easy_config(), &FixedClock(TIMESTAMP)).unwrap()
    }

    #[test]
    fn test_genesis_block() {
        let block = genesis();

        assert_eq!(block.get_height(), 0);
        assert!(block.get_prev_block_hash().is_empty());
        assert!(block.is_genesis());
        assert_eq!(block.get_timestamp(), TIMESTAMP);
        assert_eq!(block.get_hash().len(), HASH_LEN);
        // 8 difficulty bits: the whole first byte is zero
        assert_eq!(block.get_hash()[0], 0);
        assert_eq!(block.get_transactions(), &[b"coinbase".to_vec()]);
    }

    #[test]
    fn test_block_hash_matches_header_invariant() {
        let block = genesis();

        let mut header = block.hash_transactions().unwrap();
        header.extend(TIMESTAMP.to_be_bytes());
        header.extend(8i64.to_be_bytes());
        header.extend(block.get_nonce().to_be_bytes());

        assert_eq!(block.get_hash(), sha256_digest(&header).as_slice());
    }

    #[test]
    fn test_child_block() {
        let parent = genesis();
        let child = Block::new_block(
            &[b"tx-1".to_vec(), b"tx-2".to_vec()],
            parent.get_hash(),
            1,
            &easy_config(),
            &FixedClock(TIMESTAMP + 10),
        )
        .unwrap();

        assert_eq!(child.get_height(), 1);
        assert_eq!(child.get_prev_block_hash(), parent.get_hash());
        assert!(!child.is_genesis());
        assert!(ProofOfWork::validate_block(&child, &easy_config()).unwrap());
    }

    #[test]
    fn test_rejects_empty_transactions() {
        let result = Block::new_block(&[], &[], 0, &easy_config(), &FixedClock(TIMESTAMP));
        assert!(matches!(result, Err(BlockchainError::InvalidBlock(_))));
    }

    #[test]
    fn test_rejects_inconsistent_linkage() {
        let clock = FixedClock(TIMESTAMP);
        let tx = [b"tx".to_vec()];

        assert!(Block::new_block(&tx, &[1u8; HASH_LEN], 0, &easy_config(), &clock).is_err());
        assert!(Block::new_block(&tx, &[], 3, &easy_config(), &clock).is_err());
        assert!(Block::new_block(&tx, &[1u8; 5], 1, &easy_config(), &clock).is_err());
    }

    #[test]
    fn test_mining_exhaustion_propagates() {
        let config = PowConfig::new(256).unwrap().with_max_nonce(16).unwrap();
        let result = Block::generate_genesis_block(b"coinbase", &config, &FixedClock(TIMESTAMP));
        assert_eq!(
            result,
            Err(BlockchainError::MiningExhausted { max_nonce: 16 })
        );
    }

    #[test]
    fn test_serialize_round_trip() {
        let block = genesis();
        let bytes = block.serialize().unwrap();
        let decoded = Block::deserialize(&bytes).unwrap();

        assert_eq!(decoded, block);
        assert_eq!(decoded.get_nonce(), block.get_nonce());
        assert_eq!(decoded.get_timestamp(), block.get_timestamp());
    }

    #[test]
    fn test_round_trip_with_binary_transactions() {
        let block = Block::new_block(
            &[vec![0u8, 255, 1, 254], vec![], vec![42u8; 300]],
            &[9u8; HASH_LEN],
            5,
            &easy_config(),
            &FixedClock(-1),
        )
        .unwrap();

        assert_eq!(Block::deserialize(&block.serialize().unwrap()).unwrap(), block);
    }

    #[test]
    fn test_deserialize_rejects_truncated_bytes() {
        let bytes = genesis().serialize().unwrap();
        for cut in [0, 1, bytes.len() / 2, bytes.len() - 1] {
            assert!(
                matches!(
                    Block::deserialize(&bytes[..cut]),
                    Err(BlockchainError::Serialization(_))
                ),
                "truncation at {cut} was accepted"
            );
        }
    }

    #[test]
    fn test_deserialize_rejects_bad_structure() {
        let mut block = genesis();
        block.hash = vec![1, 2, 3];
        let bytes = serialize(&block).unwrap();
        assert!(matches!(
            Block::deserialize(&bytes),
            Err(BlockchainError::Serialization(_))
        ));

        let mut block = genesis();
        block.transactions.clear();
        let bytes = serialize(&block).unwrap();
        assert!(Block::deserialize(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_rejects_forged_lengths() {
        // timestamp 0, then a transaction count of 2^60
        let mut huge_count = vec![0u8, 253];
        huge_count.extend((1u64 << 60).to_le_bytes());

        // timestamp 0, one transaction claiming 2^40 bytes
        let mut huge_transaction = vec![0u8, 1, 253];
        huge_transaction.extend((1u64 << 40).to_le_bytes());

        for bytes in [huge_count, huge_transaction] {
            assert!(matches!(
                Block::deserialize(&bytes),
                Err(BlockchainError::Serialization(_))
            ));
        }
    }

    #[test]
    fn test_merkle_proof_for_block_transaction() {
        let parent = genesis();
        let block = Block::new_block(
            &[b"a".to_vec(), b"b".to_vec(), b"c".to_vec()],
            parent.get_hash(),
            1,
            &easy_config(),
            &FixedClock(TIMESTAMP),
        )
        .unwrap();

        let proof = block.generate_merkle_proof(2).unwrap();
        assert!(block.verify_merkle_proof(&proof).unwrap());
        assert!(!parent.verify_merkle_proof(&proof).unwrap());
        assert!(block.generate_merkle_proof(3).is_err());
    }
}
