// Thin wrappers over bincode 2 with the standard configuration
use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};

/// Largest encoded value (a block, in practice) accepted in either direction.
/// Decoding claims container sizes against this before allocating, so a
/// forged length prefix fails instead of exhausting memory.
pub const MAX_ENCODED_SIZE: usize = 32 * 1024 * 1024;

/// Serialize data using bincode 2.0 with standard configuration
pub fn serialize<T: Serialize + bincode::Encode>(data: &T) -> Result<Vec<u8>> {
    let config = bincode::config::standard();
    let bytes = bincode::encode_to_vec(data, config)
        .map_err(|e| BlockchainError::Serialization(format!("Serialization failed: {e}")))?;
    if bytes.len() > MAX_ENCODED_SIZE {
        return Err(BlockchainError::Serialization(format!(
            "Serialization failed: {} bytes exceeds the {MAX_ENCODED_SIZE} byte limit",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Deserialize data using bincode 2.0 with standard configuration and a
/// [`MAX_ENCODED_SIZE`] limit.
///
/// The whole input must be consumed; trailing bytes are treated as malformed.
pub fn deserialize<T>(bytes: &[u8]) -> Result<T>
where
    T: for<'de> Deserialize<'de> + bincode::Decode<()>,
{
    if bytes.len() > MAX_ENCODED_SIZE {
        return Err(BlockchainError::Serialization(format!(
            "Deserialization failed: {} bytes exceeds the {MAX_ENCODED_SIZE} byte limit",
            bytes.len()
        )));
    }

    let config = bincode::config::standard().with_limit::<MAX_ENCODED_SIZE>();
    let (data, read) = bincode::decode_from_slice(bytes, config)
        .map_err(|e| BlockchainError::Serialization(format!("Deserialization failed: {e}")))?;
    if read != bytes.len() {
        return Err(BlockchainError::Serialization(format!(
            "Deserialization failed: {} trailing bytes",
            bytes.len() - read
        )));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
    struct TestData {
        id: u64,
        name: String,
        values: Vec<i32>,
    }

    #[test]
    fn test_serialize_deserialize() {
        let original = TestData {
            id: 42,
            name: "test".to_string(),
            values: vec![1, 2, 3, 4, 5],
        };

        let serialized = serialize(&original).expect("Serialization should work");
        let deserialized: TestData = deserialize(&serialized).expect("Deserialization should work");

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_deserialize_invalid_data() {
        let invalid_bytes = vec![0xFF, 0xFF, 0xFF, 0xFF];
        let result: Result<TestData> = deserialize(&invalid_bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = serialize(&7u64).unwrap();
        bytes.push(0);
        let result: Result<u64> = deserialize(&bytes);
        assert!(matches!(result, Err(BlockchainError::Serialization(_))));
    }

    #[test]
    fn test_deserialize_truncated_data() {
        let original = TestData {
            id: 1,
            name: "truncate me".to_string(),
            values: vec![10, 20, 30],
        };
        let bytes = serialize(&original).unwrap();
        let result: Result<TestData> = deserialize(&bytes[..bytes.len() - 2]);
        assert!(result.is_err());
    }

    // 253 marks a u64 varint; the claimed length is far beyond the input
    fn huge_length_prefix(len: u64) -> Vec<u8> {
        let mut bytes = vec![253u8];
        bytes.extend(len.to_le_bytes());
        bytes
    }

    #[test]
    fn test_deserialize_rejects_oversized_length_prefix() {
        for len in [1u64 << 60, 1u64 << 40, (MAX_ENCODED_SIZE as u64) + 1] {
            let result: Result<Vec<u8>> = deserialize(&huge_length_prefix(len));
            assert!(matches!(result, Err(BlockchainError::Serialization(_))));

            let result: Result<Vec<Vec<u8>>> = deserialize(&huge_length_prefix(len));
            assert!(matches!(result, Err(BlockchainError::Serialization(_))));
        }
    }

    #[test]
    fn test_size_limit_applies_to_input_and_output() {
        let too_big = vec![0u8; MAX_ENCODED_SIZE + 1];
        let result: Result<Vec<u8>> = deserialize(&too_big);
        assert!(matches!(result, Err(BlockchainError::Serialization(_))));

        assert!(matches!(
            serialize(&too_big),
            Err(BlockchainError::Serialization(_))
        ));
    }
}
