//! # minichain - a single-node proof-of-work ledger core
//!
//! An append-only chain of blocks, each linked to its parent by hash, each
//! admitted only after a proof-of-work search, each committing to its
//! transactions through a Merkle root. Value is held in outputs locked to a
//! public-key-hash (the UTXO model).
//!
//! ## How the code is organized
//! - `core/`: blocks, Merkle tree, proof-of-work, the chain and its iterator, outputs
//! - `storage/`: the `BlockStore` contract with Sled and in-memory backends
//! - `wallet/`: Bitcoin-style address encoding and validation
//! - `config/`: proof-of-work parameters and environment-driven settings
//! - `utils/`: hashing, base58, bincode wrappers, time sources
//! - `cli/`: command-line interface for the `minichain` binary
//!
//! ## Things to keep in mind
//! - Hashes are raw 32-byte SHA-256 digests everywhere; hex is for display only
//! - The difficulty is part of the hashed header, so miners and validators
//!   must share the same `PowConfig`
//! - Mining blocks the caller; running out of nonces is an error, never a
//!   silently invalid block
//! - Timestamps come from an injected `TimeSource` so mining is reproducible

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod utils;
pub mod wallet;

#[cfg(test)]
pub mod testnet;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::{Config, PowConfig, GLOBAL_CONFIG};
pub use core::{
    decode_coinbase_payload, new_coinbase_payload, Block, Blockchain, BlockchainIterator,
    MerkleProof, MerkleTree, ProofOfWork, TXOutput, TXOutputs, SUBSIDY,
};
pub use error::{BlockchainError, Result};
pub use storage::{BlockStore, MemoryBlockStore, SledBlockStore};
pub use utils::{
    base58_decode, base58_encode, current_timestamp, ripemd160_digest, sha256_digest,
    FixedClock, SystemClock, TimeSource,
};
pub use wallet::{
    convert_address, hash_pub_key, pub_key_hash_from_address, validate_address,
    ADDRESS_CHECK_SUM_LEN,
};
