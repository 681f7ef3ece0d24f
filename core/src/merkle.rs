use sha3::{Digest, Keccak256};

use crate::errors::MerkleError;

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(left);
    hasher.update(right);
    hasher.finalize().into()
}

/// Binary Keccak-256 Merkle tree over pre-hashed leaves.
///
/// Parents are `keccak(left ‖ right)`; a node without a sibling is promoted
/// to the next level unchanged. The layout must match the on-chain verifier
/// byte for byte, so leaves are exactly the 32-byte hashes handed in — the
/// tree never re-hashes them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleTree {
    /// layers[0] holds the leaves; the last layer holds the root alone.
    layers: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn new(leaves: Vec<[u8; 32]>) -> Result<Self, MerkleError> {
        if leaves.is_empty() {
            return Err(MerkleError::NoLeaves);
        }
        let mut layers = vec![leaves];
        while layers[layers.len() - 1].len() > 1 {
            let previous = &layers[layers.len() - 1];
            let next: Vec<[u8; 32]> = previous
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    [promoted] => *promoted,
                    _ => unreachable!("chunks(2) yields one or two entries"),
                })
                .collect();
            layers.push(next);
        }
        Ok(MerkleTree { layers })
    }

    pub fn root(&self) -> [u8; 32] {
        self.layers[self.layers.len() - 1][0]
    }

    pub fn num_leaves(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling path for the leaf at `index`, bottom-up. Levels where the
    /// node was promoted without a sibling contribute no path element.
    pub fn proof(&self, index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.num_leaves() {
            return None;
        }
        let mut proof = Vec::new();
        let mut position = index;
        for layer in &self.layers[..self.layers.len() - 1] {
            let sibling = position ^ 1;
            if sibling < layer.len() {
                proof.push(layer[sibling]);
            }
            position /= 2;
        }
        Some(proof)
    }

    /// Replays a sibling path against a root. `num_leaves` is needed to
    /// know at which levels the node was promoted without a sibling.
    pub fn verify_proof(
        root: &[u8; 32],
        leaf: &[u8; 32],
        index: usize,
        num_leaves: usize,
        proof: &[[u8; 32]],
    ) -> bool {
        if index >= num_leaves || num_leaves == 0 {
            return false;
        }
        let mut hash = *leaf;
        let mut position = index;
        let mut width = num_leaves;
        let mut path = proof.iter();
        while width > 1 {
            let last_without_sibling = position % 2 == 0 && position + 1 == width;
            if !last_without_sibling {
                let Some(sibling) = path.next() else {
                    return false;
                };
                hash = if position % 2 == 0 {
                    hash_pair(&hash, sibling)
                } else {
                    hash_pair(sibling, &hash)
                };
            }
            position /= 2;
            width = width.div_ceil(2);
        }
        path.next().is_none() && hash == *root
    }
}
