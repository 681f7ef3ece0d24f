use std::fmt;

use ark_bn254::{Fr, G1Affine};
use serde::{Deserialize, Serialize};

use eigenda_primitives::consts::BYTES_PER_FIELD_ELEMENT;

use crate::merkle::keccak256;

/// Identifier of a quorum of operators. A blob may be dispersed to several
/// quorums with independent security parameters.
pub type QuorumID = u8;

/// Content-addressed identifier of a blob, total-ordered so that batch
/// slices can be materialized deterministically.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BlobKey([u8; 32]);

impl BlobKey {
    pub fn new(bytes: [u8; 32]) -> Self {
        BlobKey(bytes)
    }

    /// Derives the key from the blob payload and its request time, so that
    /// the same payload submitted twice yields distinct keys.
    pub fn from_blob_data(data: &[u8], requested_at: u64) -> Self {
        let mut preimage = Vec::with_capacity(data.len() + 8);
        preimage.extend_from_slice(data);
        preimage.extend_from_slice(&requested_at.to_be_bytes());
        BlobKey(keccak256(&preimage))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// On-chain identity of an operator.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct OperatorID([u8; 32]);

impl OperatorID {
    pub fn new(bytes: [u8; 32]) -> Self {
        OperatorID(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for OperatorID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Per-quorum security requirements attached to a blob by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityParam {
    pub quorum_id: QuorumID,
    /// Largest stake percentage that may be adversarial.
    pub adversary_threshold: u8,
    /// Stake percentage that must attest for the blob to be confirmed.
    pub quorum_threshold: u8,
    pub quorum_rate: u32,
}

/// Dispersal lifecycle of a blob. The streamer only pulls blobs in
/// [BlobStatus::Processing].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlobStatus {
    Processing,
    Confirmed,
    Failed,
    Finalized,
}

/// Store-side description of a pending blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub blob_key: BlobKey,
    /// Payload size in bytes, before symbol padding.
    pub blob_size: u64,
    /// Unix timestamp of the dispersal request.
    pub requested_at: u64,
    pub security_params: Vec<SecurityParam>,
}

/// A client-submitted payload together with its security requirements.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
    pub security_params: Vec<SecurityParam>,
}

/// One erasure-coded piece of a blob: a run of evaluations plus the KZG
/// opening proving they match the committed polynomial.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    pub coeffs: Vec<Fr>,
    pub proof: G1Affine,
}

impl Chunk {
    /// Serialized footprint: 32 bytes per evaluation plus the affine proof
    /// point.
    pub fn size_bytes(&self) -> u64 {
        (self.coeffs.len() * BYTES_PER_FIELD_ELEMENT + 64) as u64
    }
}

/// KZG commitments attached to a blob header: the data commitment, the
/// low-degree proof, and the claimed symbol length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlobCommitments {
    pub commitment: G1Affine,
    pub length_proof: G1Affine,
    pub length: u64,
}
