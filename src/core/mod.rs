//! Core ledger functionality
//!
//! Blocks, the Merkle commitment over their transactions, proof-of-work
//! mining and validation, the chain and its backward iterator, and
//! transaction outputs.

pub mod block;
pub mod blockchain;
pub mod merkle;
pub mod proof_of_work;
pub mod transaction;

pub use block::{Block, HASH_LEN};
pub use blockchain::{Blockchain, BlockchainIterator};
pub use merkle::{MerkleProof, MerkleTree, ProofElement};
pub use proof_of_work::ProofOfWork;
pub use transaction::{
    decode_coinbase_payload, new_coinbase_payload, TXOutput, TXOutputs, SUBSIDY,
};
