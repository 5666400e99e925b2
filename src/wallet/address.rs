use crate::error::{BlockchainError, Result};
use crate::utils::{base58_decode, base58_encode, ripemd160_digest, sha256_digest};

pub const VERSION: u8 = 0x00;
pub const ADDRESS_CHECK_SUM_LEN: usize = 4;
pub const PUB_KEY_HASH_LEN: usize = 20;

// version + pub_key_hash + checksum
const ADDRESS_PAYLOAD_LEN: usize = 1 + PUB_KEY_HASH_LEN + ADDRESS_CHECK_SUM_LEN;

/// RIPEMD160(SHA256(pub_key))
pub fn hash_pub_key(pub_key: &[u8]) -> Vec<u8> {
    let pub_key_sha256 = sha256_digest(pub_key);
    ripemd160_digest(pub_key_sha256.as_slice())
}

fn checksum(payload: &[u8]) -> Vec<u8> {
    let first_sha = sha256_digest(payload);
    let second_sha = sha256_digest(first_sha.as_slice());
    second_sha[0..ADDRESS_CHECK_SUM_LEN].to_vec()
}

/// Base58 address for a public-key-hash.
pub fn convert_address(pub_key_hash: &[u8]) -> String {
    let mut payload: Vec<u8> = vec![];
    payload.push(VERSION);
    payload.extend(pub_key_hash);
    let checksum = checksum(payload.as_slice());
    payload.extend(checksum.as_slice());
    base58_encode(payload.as_slice())
}

/// Checks the decoded payload width and the embedded checksum.
///
/// Rejection is an ordinary outcome here, so this reports `false` rather than
/// an error.
pub fn validate_address(address: &str) -> bool {
    match base58_decode(address) {
        Ok(payload) => validate_payload(&payload),
        Err(_) => false,
    }
}

fn validate_payload(payload: &[u8]) -> bool {
    if payload.len() != ADDRESS_PAYLOAD_LEN {
        return false;
    }

    let actual_checksum = &payload[payload.len() - ADDRESS_CHECK_SUM_LEN..];
    let target_checksum = checksum(&payload[..payload.len() - ADDRESS_CHECK_SUM_LEN]);
    actual_checksum.eq(target_checksum.as_slice())
}

/// Extracts `payload[1..len - 4]` from a valid address.
pub fn pub_key_hash_from_address(address: &str) -> Result<Vec<u8>> {
    let payload = base58_decode(address)?;
    if !validate_payload(&payload) {
        return Err(BlockchainError::InvalidAddress(address.to_string()));
    }
    Ok(payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN].to_vec())
}
