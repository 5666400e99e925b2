//! Address handling
//!
//! Bitcoin-style addresses: base58(version ‖ RIPEMD160(SHA256(pub_key)) ‖
//! checksum). Key-pair generation lives outside this crate; only the address
//! encoding that outputs are locked against is implemented here.

pub mod address;

pub use address::{
    convert_address, hash_pub_key, pub_key_hash_from_address, validate_address,
    ADDRESS_CHECK_SUM_LEN, PUB_KEY_HASH_LEN, VERSION,
};
