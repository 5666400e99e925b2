use crate::error::{BlockchainError, Result};
use crate::storage::BlockStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-process block store. Clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryBlockStore {
    blocks: Arc<RwLock<HashMap<Vec<u8>, Vec<u8>>>>,
    tip: Arc<RwLock<Option<Vec<u8>>>>,
}

fn poisoned(what: &str) -> BlockchainError {
    BlockchainError::Database(format!("Failed to acquire lock on {what}"))
}

impl MemoryBlockStore {
    pub fn new() -> MemoryBlockStore {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blocks.read().map(|blocks| blocks.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlockStore for MemoryBlockStore {
    fn get_block(&self, hash: &[u8]) -> Result<Option<Vec<u8>>> {
        let blocks = self.blocks.read().map_err(|_| poisoned("blocks"))?;
        Ok(blocks.get(hash).cloned())
    }

    fn put_block(&self, hash: &[u8], data: &[u8]) -> Result<()> {
        let mut blocks = self.blocks.write().map_err(|_| poisoned("blocks"))?;
        blocks.insert(hash.to_vec(), data.to_vec());
        Ok(())
    }

    fn get_tip(&self) -> Result<Option<Vec<u8>>> {
        let tip = self.tip.read().map_err(|_| poisoned("tip"))?;
        Ok(tip.clone())
    }

    fn set_tip(&self, hash: &[u8]) -> Result<()> {
        let mut tip = self.tip.write().map_err(|_| poisoned("tip"))?;
        *tip = Some(hash.to_vec());
        Ok(())
    }

    fn commit_block(&self, hash: &[u8], data: &[u8]) -> Result<()> {
        // Both locks held so readers never see the tip ahead of its block
        let mut blocks = self.blocks.write().map_err(|_| poisoned("blocks"))?;
        let mut tip = self.tip.write().map_err(|_| poisoned("tip"))?;
        blocks.insert(hash.to_vec(), data.to_vec());
        *tip = Some(hash.to_vec());
        Ok(())
    }
}
