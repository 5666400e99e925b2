// Transaction outputs - the value-bearing half of the UTXO model
// An output says "this much value belongs to whoever owns this public-key-hash"
// Building transactions and tracking which outputs are spent happens outside
// this crate; what lives here is the lock and the output encoding

use crate::error::{BlockchainError, Result};
use crate::utils::{base58_decode, deserialize, serialize};
use crate::wallet::{validate_address, ADDRESS_CHECK_SUM_LEN, PUB_KEY_HASH_LEN};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// I use this constant for the block reward paid by a coinbase payload
pub const SUBSIDY: u64 = 10;

// Random tag prepended to every coinbase payload so two rewards to the same
// address never produce identical transaction bytes
const COINBASE_TAG_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode)]
pub struct TXOutput {
    value: u64,            // Opaque units
    pub_key_hash: Vec<u8>, // The hash of the public key that can spend this output
}

impl TXOutput {
    pub fn new(value: u64, address: &str) -> Result<TXOutput> {
        let mut output = TXOutput {
            value,
            pub_key_hash: vec![],
        };
        output.lock(address)?;
        Ok(output)
    }

    pub fn get_value(&self) -> u64 {
        self.value
    }

    pub fn get_pub_key_hash(&self) -> &[u8] {
        self.pub_key_hash.as_slice()
    }

    /// Locks the output to the public-key-hash embedded in `address`.
    pub fn lock(&mut self, address: &str) -> Result<()> {
        if !validate_address(address) {
            return Err(BlockchainError::InvalidAddress(address.to_string()));
        }

        // version (1) + pub_key_hash (20) + checksum (4)
        let payload = base58_decode(address)?;
        self.pub_key_hash = payload[1..payload.len() - ADDRESS_CHECK_SUM_LEN].to_vec();
        Ok(())
    }

    pub fn is_locked_with_key(&self, pub_key_hash: &[u8]) -> bool {
        self.pub_key_hash.eq(pub_key_hash)
    }
}

/// The outputs of one transaction. Position in `outputs` is the output index
/// that inputs refer to, so order is preserved exactly through encoding.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, bincode::Encode, bincode::Decode,
)]
pub struct TXOutputs {
    outputs: Vec<TXOutput>,
}

impl TXOutputs {
    pub fn new(outputs: Vec<TXOutput>) -> TXOutputs {
        TXOutputs { outputs }
    }

    pub fn get_outputs(&self) -> &[TXOutput] {
        self.outputs.as_slice()
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    /// Decode outputs, failing on truncated or trailing input and on any
    /// output whose public-key-hash is not exactly 20 bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<TXOutputs> {
        let outputs = deserialize::<TXOutputs>(bytes)?;
        if let Some((index, output)) = outputs
            .outputs
            .iter()
            .enumerate()
            .find(|(_, output)| output.pub_key_hash.len() != PUB_KEY_HASH_LEN)
        {
            return Err(BlockchainError::Serialization(format!(
                "Malformed outputs: output {index} has a {}-byte public key hash, expected {PUB_KEY_HASH_LEN}",
                output.pub_key_hash.len()
            )));
        }
        Ok(outputs)
    }
}

// When I need a reward transaction: a fresh uuid tag followed by the encoded
// outputs paying `reward` to `to`
pub fn new_coinbase_payload(to: &str, reward: u64) -> Result<Vec<u8>> {
    let outputs = TXOutputs::new(vec![TXOutput::new(reward, to)?]);
    let mut payload = Uuid::new_v4().as_bytes().to_vec();
    payload.extend(outputs.serialize()?);
    Ok(payload)
}

/// Outputs carried by a payload built with [`new_coinbase_payload`], or
/// `None` if the bytes are something else.
pub fn decode_coinbase_payload(payload: &[u8]) -> Option<TXOutputs> {
    if payload.len() <= COINBASE_TAG_LEN {
        return None;
    }
    TXOutputs::deserialize(&payload[COINBASE_TAG_LEN..]).ok()
}

impl From<Vec<TXOutput>> for TXOutputs {
    fn from(outputs: Vec<TXOutput>) -> Self {
        TXOutputs::new(outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testnet::test_address as address_for;
    use crate::wallet::pub_key_hash_from_address;

    #[test]
    fn test_new_output_is_locked_to_address() {
        let alice = address_for("alice");
        let output = TXOutput::new(10, &alice).unwrap();

        assert_eq!(output.get_value(), 10);
        assert_eq!(output.get_pub_key_hash().len(), 20);
        assert!(output.is_locked_with_key(&pub_key_hash_from_address(&alice).unwrap()));
    }

    #[test]
    fn test_output_is_not_locked_with_other_key() {
        let alice = address_for("alice");
        let bob = address_for("bob");
        let output = TXOutput::new(10, &alice).unwrap();

        assert!(!output.is_locked_with_key(&pub_key_hash_from_address(&bob).unwrap()));
        assert!(!output.is_locked_with_key(&[]));
    }

    #[test]
    fn test_zero_value_output_is_allowed() {
        let output = TXOutput::new(0, &address_for("carol")).unwrap();
        assert_eq!(output.get_value(), 0);
    }

    #[test]
    fn test_lock_rejects_invalid_address() {
        let result = TXOutput::new(5, "1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNb");
        assert!(matches!(result, Err(BlockchainError::InvalidAddress(_))));
    }

    #[test]
    fn test_relock_replaces_owner() {
        let bob = address_for("bob");
        let mut output = TXOutput::new(3, &address_for("alice")).unwrap();
        output.lock(&bob).unwrap();
        assert!(output.is_locked_with_key(&pub_key_hash_from_address(&bob).unwrap()));
    }

    #[test]
    fn test_outputs_round_trip_preserves_order() {
        let outputs = TXOutputs::new(vec![
            TXOutput::new(7, &address_for("alice")).unwrap(),
            TXOutput::new(0, &address_for("bob")).unwrap(),
            TXOutput::new(u64::MAX, &address_for("carol")).unwrap(),
        ]);

        let bytes = outputs.serialize().unwrap();
        let decoded = TXOutputs::deserialize(&bytes).unwrap();

        assert_eq!(decoded, outputs);
        assert_eq!(decoded.get_outputs()[2].get_value(), u64::MAX);
    }

    #[test]
    fn test_empty_outputs_round_trip() {
        let outputs = TXOutputs::default();
        let decoded = TXOutputs::deserialize(&outputs.serialize().unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn test_deserialize_outputs_rejects_truncated_input() {
        let outputs = TXOutputs::from(vec![TXOutput::new(42, &address_for("dave")).unwrap()]);
        let bytes = outputs.serialize().unwrap();

        let result = TXOutputs::deserialize(&bytes[..bytes.len() - 1]);
        assert!(matches!(result, Err(BlockchainError::Serialization(_))));
    }

    #[test]
    fn test_deserialize_outputs_rejects_bad_key_hash_width() {
        for width in [0, 3, 21] {
            let outputs = TXOutputs::new(vec![TXOutput {
                value: 1,
                pub_key_hash: vec![1u8; width],
            }]);
            let bytes = serialize(&outputs).unwrap();

            assert!(
                matches!(
                    TXOutputs::deserialize(&bytes),
                    Err(BlockchainError::Serialization(_))
                ),
                "{width}-byte key hash was accepted"
            );
        }
    }

    #[test]
    fn test_deserialize_outputs_rejects_forged_length() {
        // An output count of 2^60
        let mut bytes = vec![253u8];
        bytes.extend((1u64 << 60).to_le_bytes());
        assert!(matches!(
            TXOutputs::deserialize(&bytes),
            Err(BlockchainError::Serialization(_))
        ));
    }

    #[test]
    fn test_coinbase_payload() {
        let alice = address_for("alice");
        let payload = new_coinbase_payload(&alice, SUBSIDY).unwrap();

        let outputs = decode_coinbase_payload(&payload).unwrap();
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs.get_outputs()[0].get_value(), SUBSIDY);
        assert!(outputs.get_outputs()[0]
            .is_locked_with_key(&pub_key_hash_from_address(&alice).unwrap()));
    }

    #[test]
    fn test_coinbase_payloads_are_unique() {
        let alice = address_for("alice");
        let first = new_coinbase_payload(&alice, SUBSIDY).unwrap();
        let second = new_coinbase_payload(&alice, SUBSIDY).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_decode_coinbase_payload_rejects_other_bytes() {
        assert!(decode_coinbase_payload(b"short").is_none());
        // Tag followed by a length prefix of 5 outputs and nothing else
        let mut truncated = vec![0u8; 16];
        truncated.push(5);
        assert!(decode_coinbase_payload(&truncated).is_none());
        assert!(new_coinbase_payload("not-an-address", SUBSIDY).is_err());
    }
}
