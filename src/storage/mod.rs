//! Block persistence
//!
//! The chain only needs get/put by hash and a tip pointer from its storage.
//! [`BlockStore`] captures that contract; Sled backs it on disk and a
//! `HashMap` backs it in memory.

pub mod memory_store;
pub mod sled_store;
pub mod store;

pub use memory_store::MemoryBlockStore;
pub use sled_store::SledBlockStore;
pub use store::BlockStore;
