use crate::error::Result;

/// Content-addressed block storage: serialized blocks keyed by their own
/// hash, plus a pointer to the chain tip.
///
/// A missing key is `Ok(None)`; `Err` is reserved for the store itself
/// failing, so callers can tell the end of a chain apart from a broken
/// database.
pub trait BlockStore {
    fn get_block(&self, hash: &[u8]) -> Result<Option<Vec<u8>>>;

    fn put_block(&self, hash: &[u8], data: &[u8]) -> Result<()>;

    fn get_tip(&self) -> Result<Option<Vec<u8>>>;

    fn set_tip(&self, hash: &[u8]) -> Result<()>;

    /// Store a block and make it the tip. Backends that can do both in one
    /// transaction should override this.
    fn commit_block(&self, hash: &[u8], data: &[u8]) -> Result<()> {
        self.put_block(hash, data)?;
        self.set_tip(hash)
    }

    fn contains_block(&self, hash: &[u8]) -> Result<bool> {
        Ok(self.get_block(hash)?.is_some())
    }
}
