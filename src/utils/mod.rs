//! Utility functions and helpers
//!
//! Hashing and encoding primitives, the bincode wrappers, and the time
//! sources used for block timestamps.

pub mod clock;
pub mod crypto;
pub mod serialization;

pub use clock::{FixedClock, SystemClock, TimeSource};
pub use crypto::{
    base58_decode, base58_encode, current_timestamp, ripemd160_digest, sha256_digest,
};

pub use serialization::{deserialize, serialize, MAX_ENCODED_SIZE};
