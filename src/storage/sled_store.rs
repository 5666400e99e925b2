// On-disk block store backed by Sled
// Blocks and the tip pointer share one tree so a commit is a single sled transaction

use crate::error::{BlockchainError, Result};
use crate::storage::BlockStore;
use sled::{Db, Tree};
use std::path::{Path, PathBuf};

const TIP_BLOCK_HASH_KEY: &str = "tip_block_hash"; // Key to store the hash of the latest block
const BLOCKS_TREE: &str = "blocks"; // Tree name for storing all blocks

#[derive(Clone)]
pub struct SledBlockStore {
    db: Db,
    blocks: Tree,
    db_path: PathBuf,
}

impl SledBlockStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<SledBlockStore> {
        let db_path = path.as_ref().to_path_buf();
        let db = sled::open(&db_path)
            .map_err(|e| BlockchainError::Database(format!("Failed to open database: {e}")))?;
        let blocks = db
            .open_tree(BLOCKS_TREE)
            .map_err(|e| BlockchainError::Database(format!("Failed to open blocks tree: {e}")))?;

        Ok(SledBlockStore {
            db,
            blocks,
            db_path,
        })
    }

    pub fn get_db_path(&self) -> &Path {
        self.db_path.as_path()
    }

    pub fn flush(&self) -> Result<()> {
        self.db
            .flush()
            .map_err(|e| BlockchainError::Database(format!("Failed to flush database: {e}")))?;
        Ok(())
    }
}

impl BlockStore for SledBlockStore {
    fn get_block(&self, hash: &[u8]) -> Result<Option<Vec<u8>>> {
        let data = self
            .blocks
            .get(hash)
            .map_err(|e| BlockchainError::Database(format!("Failed to get block: {e}")))?;
        Ok(data.map(|ivec| ivec.to_vec()))
    }

    fn put_block(&self, hash: &[u8], data: &[u8]) -> Result<()> {
        self.blocks
            .insert(hash, data)
            .map_err(|e| BlockchainError::Database(format!("Failed to insert block: {e}")))?;
        Ok(())
    }

    fn get_tip(&self) -> Result<Option<Vec<u8>>> {
        let tip = self
            .blocks
            .get(TIP_BLOCK_HASH_KEY)
            .map_err(|e| BlockchainError::Database(format!("Failed to get tip hash: {e}")))?;
        Ok(tip.map(|ivec| ivec.to_vec()))
    }

    fn set_tip(&self, hash: &[u8]) -> Result<()> {
        self.blocks
            .insert(TIP_BLOCK_HASH_KEY, hash)
            .map_err(|e| BlockchainError::Database(format!("Failed to update tip: {e}")))?;
        Ok(())
    }

    fn commit_block(&self, hash: &[u8], data: &[u8]) -> Result<()> {
        self.blocks
            .transaction(|tx_db| {
                tx_db.insert(hash, data)?;
                tx_db.insert(TIP_BLOCK_HASH_KEY, hash)?;
                Ok(())
            })
            .map_err(|e: sled::transaction::TransactionError| {
                BlockchainError::Database(format!("Failed to update blocks tree: {e}"))
            })?;

        Ok(())
    }
}
