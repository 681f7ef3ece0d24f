use ark_serialize::CanonicalSerialize;
use serde::{Deserialize, Serialize};

use crate::data::{BlobCommitments, SecurityParam};
use crate::errors::HeaderError;
use crate::merkle::{keccak256, MerkleTree};

/// Security parameters of one quorum as they were actually encoded, carried
/// in the blob header for on-chain verification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobQuorumInfo {
    pub security_param: SecurityParam,
    pub quantization_factor: u64,
    /// Total evaluations held across the quorum:
    /// `chunk_length × quantization_factor × num_operators`.
    pub encoded_blob_length: u64,
}

/// Commitments plus per-quorum parameters for one blob in a batch. Its
/// canonical serialization is the leaf preimage of the batch Merkle tree.
#[derive(Clone, Debug, PartialEq)]
pub struct BlobHeader {
    pub commitments: BlobCommitments,
    pub quorum_infos: Vec<BlobQuorumInfo>,
}

impl BlobHeader {
    /// Canonical big-endian serialization; must stay byte-for-byte stable,
    /// the on-chain verifier recomputes leaf hashes from this layout.
    pub fn encode(&self) -> Result<Vec<u8>, HeaderError> {
        let mut out = Vec::new();
        serialize_point(&self.commitments.commitment, &mut out)?;
        serialize_point(&self.commitments.length_proof, &mut out)?;
        out.extend_from_slice(&self.commitments.length.to_be_bytes());
        out.extend_from_slice(&(self.quorum_infos.len() as u32).to_be_bytes());
        for info in &self.quorum_infos {
            out.push(info.security_param.quorum_id);
            out.push(info.security_param.adversary_threshold);
            out.push(info.security_param.quorum_threshold);
            out.extend_from_slice(&info.security_param.quorum_rate.to_be_bytes());
            out.extend_from_slice(&info.quantization_factor.to_be_bytes());
            out.extend_from_slice(&info.encoded_blob_length.to_be_bytes());
        }
        Ok(out)
    }

    /// Keccak-256 of the canonical serialization: the Merkle leaf.
    pub fn hash(&self) -> Result<[u8; 32], HeaderError> {
        Ok(keccak256(&self.encode()?))
    }
}

fn serialize_point(
    point: &ark_bn254::G1Affine,
    out: &mut Vec<u8>,
) -> Result<(), HeaderError> {
    point
        .serialize_compressed(&mut *out)
        .map_err(|err| HeaderError::Serialization(err.to_string()))
}

/// Header of an assembled batch: the operator-set snapshot block and the
/// Merkle root over the batch's blob headers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchHeader {
    pub reference_block_number: u64,
    pub batch_root: [u8; 32],
}

impl BatchHeader {
    pub fn new(reference_block_number: u64) -> Self {
        BatchHeader {
            reference_block_number,
            batch_root: [0u8; 32],
        }
    }

    /// Builds the Merkle tree over the blob headers, stores its root, and
    /// returns the tree so callers can extract inclusion proofs.
    pub fn set_batch_root(
        &mut self,
        blob_headers: &[BlobHeader],
    ) -> Result<MerkleTree, HeaderError> {
        let leaves: Vec<[u8; 32]> = blob_headers
            .iter()
            .map(|header| header.hash())
            .collect::<Result<_, _>>()?;
        let tree = MerkleTree::new(leaves)?;
        self.batch_root = tree.root();
        Ok(tree)
    }

    pub fn encode(&self) -> [u8; 40] {
        let mut out = [0u8; 40];
        out[..8].copy_from_slice(&self.reference_block_number.to_be_bytes());
        out[8..].copy_from_slice(&self.batch_root);
        out
    }
}
