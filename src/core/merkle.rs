use crate::error::{BlockchainError, Result};
use crate::utils::sha256_digest;
use serde::{Deserialize, Serialize};

/// Merkle tree over an ordered list of opaque leaves (serialized transactions).
///
/// Leaf digests are `SHA256(leaf)` and parents are `SHA256(left ‖ right)`.
/// Whenever a level has an odd number of nodes its last node is duplicated
/// before pairing, including the leaf level, so a single leaf `A` yields
/// `SHA256(SHA256(A) ‖ SHA256(A))`. Every leaf ends up at the same depth.
///
/// The tree only lives long enough to extract a root or a proof; it is never
/// persisted.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    root: MerkleNode,
    leaf_count: usize,
    depth: usize,
}

#[derive(Debug, Clone)]
struct MerkleNode {
    hash: Vec<u8>,
    left: Option<Box<MerkleNode>>,
    right: Option<Box<MerkleNode>>,
}

impl MerkleNode {
    fn leaf(data: &[u8]) -> MerkleNode {
        MerkleNode {
            hash: sha256_digest(data),
            left: None,
            right: None,
        }
    }

    fn branch(left: MerkleNode, right: MerkleNode) -> MerkleNode {
        MerkleNode {
            hash: MerkleTree::hash_pair(&left.hash, &right.hash),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }
}

/// Merkle proof that a leaf is included under a root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleProof {
    /// `SHA256(leaf)` of the leaf being proven
    pub leaf_hash: Vec<u8>,
    /// Merkle root hash
    pub merkle_root: Vec<u8>,
    /// Sibling hashes from the leaf level up to the root
    pub proof_path: Vec<ProofElement>,
    /// Index of the leaf in the original sequence
    pub leaf_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofElement {
    /// Sibling hash
    pub hash: Vec<u8>,
    /// Direction: true if sibling is on the right, false if on the left
    pub is_right: bool,
}

impl MerkleTree {
    /// Build a tree from at least one leaf.
    pub fn new<T: AsRef<[u8]>>(leaves: &[T]) -> Result<Self> {
        if leaves.is_empty() {
            return Err(BlockchainError::InvalidBlock(
                "Cannot create Merkle tree from empty leaf list".to_string(),
            ));
        }

        let mut level: Vec<MerkleNode> = leaves
            .iter()
            .map(|leaf| MerkleNode::leaf(leaf.as_ref()))
            .collect();
        let mut depth = 0;

        // Runs at least once: a lone leaf is still paired with its copy
        loop {
            if level.len() % 2 != 0 {
                if let Some(last) = level.last().cloned() {
                    level.push(last);
                }
            }

            let mut next_level = Vec::with_capacity(level.len() / 2);
            let mut nodes = level.into_iter();
            while let (Some(left), Some(right)) = (nodes.next(), nodes.next()) {
                next_level.push(MerkleNode::branch(left, right));
            }

            level = next_level;
            depth += 1;
            if level.len() == 1 {
                break;
            }
        }

        let root = level
            .pop()
            .ok_or_else(|| BlockchainError::InvalidBlock("Failed to build Merkle tree".to_string()))?;

        Ok(MerkleTree {
            root,
            leaf_count: leaves.len(),
            depth,
        })
    }

    /// Root digest of `leaves` without keeping the tree around.
    pub fn calculate_merkle_root<T: AsRef<[u8]>>(leaves: &[T]) -> Result<Vec<u8>> {
        Ok(Self::new(leaves)?.root.hash)
    }

    pub fn get_root_hash(&self) -> &[u8] {
        self.root.hash.as_slice()
    }

    /// Number of leaves before any padding
    pub fn leaf_count(&self) -> usize {
        self.leaf_count
    }

    /// Number of pairing rounds between the leaves and the root
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Generate a Merkle proof for the leaf at the given index
    pub fn generate_proof(&self, leaf_index: usize) -> Result<MerkleProof> {
        if leaf_index >= self.leaf_count {
            return Err(BlockchainError::InvalidBlock(format!(
                "Leaf index {} out of bounds (max: {})",
                leaf_index,
                self.leaf_count - 1
            )));
        }

        // Level k node j has children 2j and 2j+1 on level k-1, so the bits
        // of the leaf index, most significant first, spell out the path.
        let mut proof_path = Vec::with_capacity(self.depth);
        let mut node = &self.root;
        for bit in (0..self.depth).rev() {
            let (left, right) = match (&node.left, &node.right) {
                (Some(left), Some(right)) => (left, right),
                _ => {
                    return Err(BlockchainError::InvalidBlock(
                        "Merkle tree is shallower than its recorded depth".to_string(),
                    ))
                }
            };

            if (leaf_index >> bit) & 1 == 0 {
                proof_path.push(ProofElement {
                    hash: right.hash.clone(),
                    is_right: true,
                });
                node = left;
            } else {
                proof_path.push(ProofElement {
                    hash: left.hash.clone(),
                    is_right: false,
                });
                node = right;
            }
        }
        proof_path.reverse();

        Ok(MerkleProof {
            leaf_hash: node.hash.clone(),
            merkle_root: self.root.hash.clone(),
            proof_path,
            leaf_index,
        })
    }

    /// Verify a Merkle proof against the root it carries
    pub fn verify_proof(proof: &MerkleProof) -> bool {
        let mut current_hash = proof.leaf_hash.clone();

        for element in &proof.proof_path {
            current_hash = if element.is_right {
                Self::hash_pair(&current_hash, &element.hash)
            } else {
                Self::hash_pair(&element.hash, &current_hash)
            };
        }

        current_hash == proof.merkle_root
    }

    fn hash_pair(left: &[u8], right: &[u8]) -> Vec<u8> {
        let mut combined = Vec::with_capacity(left.len() + right.len());
        combined.extend_from_slice(left);
        combined.extend_from_slice(right);
        sha256_digest(&combined)
    }
}
