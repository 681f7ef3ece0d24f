use std::collections::BTreeMap;

use eigenda_core::assignment::{Assignment, AssignmentInfo};
use eigenda_core::chain::OperatorState;
use eigenda_core::data::{BlobMetadata, Chunk, OperatorID, QuorumID};
use eigenda_core::header::{BatchHeader, BlobHeader};
use eigenda_core::merkle::MerkleTree;

/// Chunk assignment of one quorum, derived once per reference block and
/// shared by every blob in the tick.
#[derive(Clone, Debug)]
pub struct QuorumInfo {
    pub assignments: BTreeMap<OperatorID, Assignment>,
    pub info: AssignmentInfo,
    pub quantization_factor: u64,
}

/// Operator-set snapshot and per-quorum assignments backing a batch.
#[derive(Clone, Debug)]
pub struct BatchMetadata {
    pub quorum_infos: BTreeMap<QuorumID, QuorumInfo>,
    pub operator_state: OperatorState,
}

/// What one operator receives for one blob: the header and its chunk
/// bundles keyed by quorum.
#[derive(Clone, Debug)]
pub struct BlobMessage {
    pub blob_header: BlobHeader,
    pub bundles: BTreeMap<QuorumID, Vec<Chunk>>,
}

/// Per-operator dispersal view of one blob.
pub type EncodedBlob = BTreeMap<OperatorID, BlobMessage>;

/// An assembled batch. The blob, header, and metadata slices are index
/// aligned, ordered by blob key.
pub struct Batch {
    pub encoded_blobs: Vec<EncodedBlob>,
    pub blob_headers: Vec<BlobHeader>,
    pub blob_metadata: Vec<BlobMetadata>,
    pub batch_header: BatchHeader,
    pub batch_metadata: BatchMetadata,
    pub merkle_tree: MerkleTree,
}
