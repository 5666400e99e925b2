// This is the chain itself - mined blocks linked backwards by their previous hash
// Blocks live in a content-addressed BlockStore keyed by their own hash,
// and the store's tip pointer names the most recent block

use crate::config::PowConfig;
use crate::core::{Block, ProofOfWork};
use crate::error::{BlockchainError, Result};
use crate::storage::BlockStore;
use crate::utils::TimeSource;
use data_encoding::HEXLOWER;
use log::{info, warn};

// This is my main blockchain structure: the store plus the mining parameters
// every block in it was (and must be) validated against
#[derive(Clone)]
pub struct Blockchain<S: BlockStore> {
    store: S,
    pow_config: PowConfig,
}

impl<S: BlockStore> Blockchain<S> {
    // When I want a chain in this store, mining the genesis block only if there isn't one yet
    pub fn create_blockchain(
        store: S,
        genesis_coinbase: &[u8],
        pow_config: PowConfig,
        clock: &dyn TimeSource,
    ) -> Result<Blockchain<S>> {
        if let Some(tip) = store.get_tip()? {
            info!(
                "Blockchain already exists with tip {}",
                HEXLOWER.encode(tip.as_slice())
            );
        } else {
            info!("Creating genesis block");
            let block = Block::generate_genesis_block(genesis_coinbase, &pow_config, clock)?;
            store.commit_block(block.get_hash(), block.serialize()?.as_slice())?;
            info!("Genesis block committed: {}", block.get_hash_hex());
        }

        Ok(Blockchain { store, pow_config })
    }

    // When I want to open a chain that must already exist
    pub fn open(store: S, pow_config: PowConfig) -> Result<Blockchain<S>> {
        if store.get_tip()?.is_none() {
            return Err(BlockchainError::Database(
                "No existing blockchain found. Create one first.".to_string(),
            ));
        }
        Ok(Blockchain { store, pow_config })
    }

    pub fn get_store(&self) -> &S {
        &self.store
    }

    pub fn get_pow_config(&self) -> &PowConfig {
        &self.pow_config
    }

    pub fn get_tip_hash(&self) -> Result<Vec<u8>> {
        self.store
            .get_tip()?
            .ok_or_else(|| BlockchainError::Database("Tip hash not found".to_string()))
    }

    pub fn get_block(&self, block_hash: &[u8]) -> Result<Option<Block>> {
        match self.store.get_block(block_hash)? {
            Some(bytes) => Ok(Some(Block::deserialize(bytes.as_slice())?)),
            None => Ok(None),
        }
    }

    fn require_block(&self, block_hash: &[u8]) -> Result<Block> {
        self.get_block(block_hash)?
            .ok_or_else(|| BlockchainError::BlockNotFound(HEXLOWER.encode(block_hash)))
    }

    pub fn get_best_height(&self) -> Result<usize> {
        let tip_hash = self.get_tip_hash()?;
        Ok(self.require_block(&tip_hash)?.get_height())
    }

    // This is the mining path: build on the current tip, run proof-of-work, commit
    pub fn mine_block(&self, transactions: &[Vec<u8>], clock: &dyn TimeSource) -> Result<Block> {
        let tip_hash = self.get_tip_hash()?;
        let next_height = self.require_block(&tip_hash)?.get_height() + 1;

        info!(
            "Mining block at height {} with {} transactions",
            next_height,
            transactions.len()
        );

        let block = Block::new_block(
            transactions,
            &tip_hash,
            next_height,
            &self.pow_config,
            clock,
        )?;
        self.store
            .commit_block(block.get_hash(), block.serialize()?.as_slice())?;

        info!(
            "Successfully mined block: {} (height: {next_height})",
            block.get_hash_hex()
        );
        Ok(block)
    }

    // When a block was mined somewhere else, I only store it if it checks out.
    // A block that fails proof-of-work or doesn't extend a known block is rejected.
    pub fn add_block(&self, block: &Block) -> Result<()> {
        if self.store.contains_block(block.get_hash())? {
            return Ok(()); // Block already exists
        }

        if let Err(e) = self.check_block(block) {
            warn!("Rejected block {}: {e}", block.get_hash_hex());
            return Err(e);
        }

        let block_data = block.serialize()?;
        let extends_tip = match self.store.get_tip()? {
            Some(tip_hash) => block.get_height() > self.require_block(&tip_hash)?.get_height(),
            None => true,
        };

        if extends_tip {
            self.store.commit_block(block.get_hash(), block_data.as_slice())?;
            info!("Added block {} as new tip", block.get_hash_hex());
        } else {
            self.store.put_block(block.get_hash(), block_data.as_slice())?;
            info!("Stored block {} without moving the tip", block.get_hash_hex());
        }
        Ok(())
    }

    fn check_block(&self, block: &Block) -> Result<()> {
        if !ProofOfWork::validate_block(block, &self.pow_config)? {
            return Err(BlockchainError::InvalidBlock(
                "proof-of-work does not validate".to_string(),
            ));
        }

        if block.is_genesis() {
            if self.store.get_tip()?.is_some() {
                return Err(BlockchainError::InvalidBlock(
                    "chain already has a genesis block".to_string(),
                ));
            }
            return Ok(());
        }

        let parent = self.get_block(block.get_prev_block_hash())?.ok_or_else(|| {
            BlockchainError::InvalidBlock(format!(
                "previous block {} not found",
                HEXLOWER.encode(block.get_prev_block_hash())
            ))
        })?;
        if block.get_height() != parent.get_height() + 1 {
            return Err(BlockchainError::InvalidBlock(format!(
                "height {} does not follow parent height {}",
                block.get_height(),
                parent.get_height()
            )));
        }
        Ok(())
    }

    pub fn iterator(&self) -> Result<BlockchainIterator<'_, S>> {
        BlockchainIterator::new(&self.store)
    }

    /// Hashes of every block from the tip back to genesis
    pub fn get_block_hashes(&self) -> Result<Vec<Vec<u8>>> {
        let mut hashes = vec![];
        for block in self.iterator()? {
            hashes.push(block?.get_hash().to_vec());
        }
        Ok(hashes)
    }

    /// Walk the whole chain and re-check proof-of-work, linkage and heights.
    /// Returns the number of blocks checked.
    pub fn verify_chain(&self) -> Result<usize> {
        let mut iterator = self.iterator()?;
        let mut expected_height: Option<usize> = None;
        let mut count = 0;

        loop {
            let wanted = iterator.get_current_hash().to_vec();
            let block = iterator
                .next_block()?
                .ok_or_else(|| BlockchainError::BlockNotFound(HEXLOWER.encode(&wanted)))?;
            count += 1;

            if !ProofOfWork::validate_block(&block, &self.pow_config)? {
                return Err(BlockchainError::InvalidBlock(format!(
                    "block {} fails proof-of-work",
                    block.get_hash_hex()
                )));
            }
            if let Some(height) = expected_height {
                if block.get_height() != height {
                    return Err(BlockchainError::InvalidBlock(format!(
                        "block {} has height {}, expected {height}",
                        block.get_hash_hex(),
                        block.get_height()
                    )));
                }
            }

            if block.is_genesis() {
                return Ok(count);
            }
            expected_height = Some(block.get_height() - 1);
        }
    }
}

/// Walks the chain from a starting hash (normally the tip) towards genesis.
///
/// Each step is one read of the store. The walk ends when a lookup misses,
/// which happens right after genesis since its previous hash is empty. There
/// is no cycle detection.
pub struct BlockchainIterator<'a, S: BlockStore + ?Sized> {
    store: &'a S,
    current_hash: Vec<u8>,
    failed: bool,
}

impl<'a, S: BlockStore + ?Sized> BlockchainIterator<'a, S> {
    /// Start at the store's tip; an empty store yields nothing.
    pub fn new(store: &'a S) -> Result<BlockchainIterator<'a, S>> {
        let current_hash = store.get_tip()?.unwrap_or_default();
        Ok(BlockchainIterator {
            store,
            current_hash,
            failed: false,
        })
    }

    pub fn from_hash(store: &'a S, hash: &[u8]) -> BlockchainIterator<'a, S> {
        BlockchainIterator {
            store,
            current_hash: hash.to_vec(),
            failed: false,
        }
    }

    pub fn get_current_hash(&self) -> &[u8] {
        self.current_hash.as_slice()
    }

    /// `Ok(None)` when the current hash is not in the store; storage and
    /// decoding failures are errors.
    pub fn next_block(&mut self) -> Result<Option<Block>> {
        let data = match self.store.get_block(&self.current_hash)? {
            Some(data) => data,
            None => return Ok(None),
        };
        let block = Block::deserialize(data.as_slice())?;
        self.current_hash = block.get_prev_block_hash().to_vec();
        Ok(Some(block))
    }
}

impl<S: BlockStore + ?Sized> Iterator for BlockchainIterator<'_, S> {
    type Item = Result<Block>;

    // Stops for good after the first error
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let next = self.next_block().transpose();
        if let Some(Err(_)) = next {
            self.failed = true;
        }
        next
    }
}
