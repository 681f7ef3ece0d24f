use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use tracing::debug;

use eigenda_core::assignment::Assignment;
use eigenda_core::data::{BlobCommitments, BlobKey, BlobMetadata, Chunk, OperatorID, QuorumID};
use eigenda_core::errors::EncodeError;
use eigenda_core::header::BlobQuorumInfo;

/// One completed encode of a (blob, quorum) pair against a reference block.
/// Owned by the [EncodedBlobStore] once inserted and read-only thereafter.
#[derive(Clone, Debug)]
pub struct EncodingResult {
    pub metadata: BlobMetadata,
    pub reference_block_number: u64,
    pub blob_quorum_info: BlobQuorumInfo,
    pub commitments: BlobCommitments,
    pub chunks: Vec<Chunk>,
    pub assignments: BTreeMap<OperatorID, Assignment>,
}

impl EncodingResult {
    pub fn blob_key(&self) -> BlobKey {
        self.metadata.blob_key
    }

    pub fn quorum_id(&self) -> QuorumID {
        self.blob_quorum_info.security_param.quorum_id
    }

    /// Serialized size of the chunk payload, the quantity the size notifier
    /// thresholds on.
    pub fn size_bytes(&self) -> u64 {
        self.chunks.iter().map(Chunk::size_bytes).sum()
    }
}

/// Outcome of one encode job, delivered to the ingester over the result
/// channel.
#[derive(Clone, Debug)]
pub enum EncodingResultOrStatus {
    Success(EncodingResult),
    Failure {
        blob_key: BlobKey,
        quorum_id: QuorumID,
        error: EncodeError,
    },
}

type RequestKey = (BlobKey, QuorumID);

#[derive(Default)]
struct StoreInner {
    /// In-flight encode requests, keyed by (blob, quorum) with the
    /// reference block they were issued against.
    requested: HashMap<RequestKey, u64>,
    /// Completed results. One slot per (blob, quorum): a result issued
    /// against a newer reference block replaces its predecessor.
    encoded: HashMap<RequestKey, Arc<EncodingResult>>,
    encoded_result_size: u64,
}

/// Concurrent index of outstanding encode requests and completed results.
///
/// A passive, lock-guarded container: every public operation is one
/// critical section on the inner maps, and no locks are held across
/// external calls.
#[derive(Default)]
pub struct EncodedBlobStore {
    inner: Mutex<StoreInner>,
}

impl EncodedBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that an encode for (blob, quorum) is in flight against the
    /// given reference block. Must happen before the encode job can
    /// complete, so dedup stays tight under bursts.
    pub fn put_encoding_request(
        &self,
        blob_key: BlobKey,
        quorum_id: QuorumID,
        reference_block_number: u64,
    ) {
        let mut inner = self.inner.lock().unwrap();
        inner
            .requested
            .insert((blob_key, quorum_id), reference_block_number);
    }

    /// Whether (blob, quorum) already has an outstanding request or a
    /// completed result at this reference block.
    pub fn has_encoding_requested(
        &self,
        blob_key: BlobKey,
        quorum_id: QuorumID,
        reference_block_number: u64,
    ) -> bool {
        let inner = self.inner.lock().unwrap();
        let key = (blob_key, quorum_id);
        if inner.requested.get(&key) == Some(&reference_block_number) {
            return true;
        }
        matches!(
            inner.encoded.get(&key),
            Some(result) if result.reference_block_number == reference_block_number
        )
    }

    /// Drops the in-flight marker; called when an encode job fails so the
    /// next tick can retry the pair.
    pub fn delete_encoding_request(&self, blob_key: BlobKey, quorum_id: QuorumID) {
        let mut inner = self.inner.lock().unwrap();
        inner.requested.remove(&(blob_key, quorum_id));
    }

    /// Stores a completed result and clears the matching in-flight marker.
    /// Idempotent on (blob, quorum, reference block): a replacement adjusts
    /// the running size total.
    pub fn put_encoding_result(&self, result: EncodingResult) {
        let key = (result.blob_key(), result.quorum_id());
        let size = result.size_bytes();
        let mut inner = self.inner.lock().unwrap();
        inner.requested.remove(&key);
        if let Some(previous) = inner.encoded.insert(key, Arc::new(result)) {
            inner.encoded_result_size -= previous.size_bytes();
        }
        inner.encoded_result_size += size;
    }

    /// Cumulative serialized size of the stored results.
    pub fn get_encoded_result_size(&self) -> u64 {
        self.inner.lock().unwrap().encoded_result_size
    }

    /// Returns every result issued against `reference_block_number` and
    /// evicts all others. Iteration order is unspecified; callers impose
    /// their own ordering.
    pub fn get_new_and_delete_stale_encoding_results(
        &self,
        reference_block_number: u64,
    ) -> Vec<Arc<EncodingResult>> {
        let mut inner = self.inner.lock().unwrap();
        let mut fresh = Vec::new();
        let mut stale_size = 0u64;
        let mut stale_count = 0usize;

        inner.encoded.retain(|_, result| {
            if result.reference_block_number == reference_block_number {
                fresh.push(Arc::clone(result));
                true
            } else {
                stale_size += result.size_bytes();
                stale_count += 1;
                false
            }
        });
        inner.encoded_result_size -= stale_size;

        if stale_count > 0 {
            debug!(
                stale_count,
                reference_block_number, "evicted stale encoding results"
            );
        }
        fresh
    }

    /// Number of completed results currently held.
    pub fn num_encoded_results(&self) -> usize {
        self.inner.lock().unwrap().encoded.len()
    }
}
