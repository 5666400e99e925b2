//! Error handling for the ledger core
//!
//! Every fallible operation returns a typed [`BlockchainError`]; nothing in the
//! library terminates the process.

use std::fmt;

/// Result type alias for blockchain operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for blockchain operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockchainError {
    /// Underlying storage failure (not a missing key)
    Database(String),
    /// A block that had to be present in the store was not found
    BlockNotFound(String),
    /// Serialization/deserialization errors, including malformed block bytes
    Serialization(String),
    /// Invalid address format or checksum
    InvalidAddress(String),
    /// Block validation errors and rejected blocks
    InvalidBlock(String),
    /// The nonce search reached its ceiling without meeting the target
    MiningExhausted { max_nonce: i64 },
    /// Configuration errors
    Config(String),
    /// System clock errors
    Clock(String),
    /// File I/O errors
    Io(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::Database(msg) => write!(f, "Database error: {msg}"),
            BlockchainError::BlockNotFound(hash) => write!(f, "Block not found: {hash}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::InvalidBlock(msg) => write!(f, "Invalid block: {msg}"),
            BlockchainError::MiningExhausted { max_nonce } => {
                write!(
                    f,
                    "Mining exhausted: no nonce below {max_nonce} satisfies the target"
                )
            }
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Clock(msg) => write!(f, "Clock error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<sled::Error> for BlockchainError {
    fn from(err: sled::Error) -> Self {
        BlockchainError::Database(err.to_string())
    }
}

impl From<bincode::error::EncodeError> for BlockchainError {
    fn from(err: bincode::error::EncodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<bincode::error::DecodeError> for BlockchainError {
    fn from(err: bincode::error::DecodeError) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mining_exhausted_display() {
        let err = BlockchainError::MiningExhausted { max_nonce: 64 };
        assert_eq!(
            err.to_string(),
            "Mining exhausted: no nonce below 64 satisfies the target"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BlockchainError = io.into();
        assert!(matches!(err, BlockchainError::Io(_)));
    }
}
